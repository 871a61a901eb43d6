//! The error shape returned to API consumers.
//!
//! Handlers return [`Error`], which is the boxed error type used by `lambda_runtime`.
//! An [`ApiError`] inside that box is treated as already classified and is passed to the
//! caller as is. Anything else is collapsed into [`INTERNAL_SERVER_ERROR`] by the classifier.

use serde::Serialize;
use serde_json::Value;
use std::borrow::Cow;
use thiserror::Error;

/// The error type handlers return. Same as `lambda_runtime::Error`.
pub type Error = lambda_runtime::Error;

/// A standard error to represent server failures.
pub const INTERNAL_SERVER_ERROR: ApiError = ApiError {
    status: 500,
    code: Cow::Borrowed("INTERNAL_SERVER_ERROR"),
    detail: Cow::Borrowed("Internal server error"),
    params: None,
};

/// A standard error to represent a request body that could not be decoded.
pub const INVALID_BODY: ApiError = ApiError {
    status: 400,
    code: Cow::Borrowed("INVALID_REQUEST_BODY"),
    detail: Cow::Borrowed("Invalid request body"),
    params: None,
};

/// The error returned to consumers of the API.
///
/// Only `code`, `detail` and `params` make it into the response body.
/// The status is carried by the response envelope.
///
/// ```
/// use lamb::ApiError;
/// use serde_json::json;
///
/// let err = ApiError::new(400, "INVALID_QUERY_PARAM", "Invalid query param")
///     .with_params(json!({ "param": "limit" }));
/// assert_eq!(err.status, 400);
/// ```
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[error("Code: {code}; Status: {status}; Detail: {detail}")]
pub struct ApiError {
    #[serde(skip)]
    pub status: u16,
    pub code: Cow<'static, str>,
    pub detail: Cow<'static, str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl ApiError {
    pub fn new(status: u16, code: impl Into<Cow<'static, str>>, detail: impl Into<Cow<'static, str>>) -> Self {
        Self {
            status,
            code: code.into(),
            detail: detail.into(),
            params: None,
        }
    }

    /// Attaches structured details, e.g. the names of invalid fields.
    /// `Value::Null` means no params, so nothing is added to the body.
    pub fn with_params(mut self, params: Value) -> Self {
        self.params = match params {
            Value::Null => None,
            v => Some(v),
        };
        self
    }

    /// Returns `Some` if the boxed error is an `ApiError`.
    pub fn from_boxed(err: &Error) -> Option<&ApiError> {
        err.downcast_ref::<ApiError>()
    }
}
