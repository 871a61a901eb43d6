use crate::error::{ApiError, Error, INTERNAL_SERVER_ERROR};
use anyhow::Chain;
use serde::Serialize;
use tracing::error;

/// The causes of an unhandled error as they appear in the `error` log field.
#[derive(Debug, Serialize)]
struct CauseChain {
    /// The innermost cause
    root: String,
    /// The errors wrapping the root, outermost first
    wrap: Vec<String>,
}

/// Normalizes a handler error into the shape returned to the caller.
///
/// An [`ApiError`] passes through unchanged. Any other error becomes
/// [`INTERNAL_SERVER_ERROR`] and its real cause is logged once, never returned.
pub fn classify(err: &Error) -> ApiError {
    if let Some(api_err) = ApiError::from_boxed(err) {
        return api_err.clone();
    }

    log_unhandled(err);

    INTERNAL_SERVER_ERROR
}

/// Logs the message of an error without a source.
/// Errors with a `source()` chain, e.g. `anyhow` errors with context, are logged with the whole
/// chain and their `Debug` output, which includes the backtrace if one was captured.
fn log_unhandled(err: &Error) {
    let head: &(dyn std::error::Error + 'static) = &**err;
    let mut wrap: Vec<String> = Chain::new(head).map(|cause| cause.to_string()).collect();

    let root = match wrap.pop() {
        Some(v) if !wrap.is_empty() => v,
        _ => {
            error!(error = %err, "Unhandled error");
            return;
        }
    };

    match serde_json::to_string(&CauseChain { root, wrap }) {
        Ok(chain) => error!(error = %chain, details = ?err, "Unhandled error"),
        Err(e) => error!(error = %err, details = ?err, "Unhandled error, the cause chain is not serializable: {e}"),
    }
}
