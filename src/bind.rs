//! Decoding of trigger payloads into handler types.
//!
//! Any decoding failure is reported as [`INVALID_BODY`], the underlying parse error is only
//! logged at debug level. Types implementing [`Validate`] can be checked right after decoding
//! with `bind_valid`, in which case the validation error is returned to the handler as is.

use crate::error::{ApiError, Error, INVALID_BODY};
use serde::de::DeserializeOwned;
use serde_dynamo::Item;
use serde_json::Value;
use std::borrow::Cow;
use tracing::debug;

/// Where the data to bind comes from. Produced by [`TriggerRecord::bind_payload`](crate::TriggerRecord::bind_payload).
#[derive(Debug, Clone, PartialEq)]
pub enum BindPayload<'a> {
    /// Raw JSON text, e.g. an HTTP request body
    Json(Cow<'a, [u8]>),
    /// A DynamoDB item or key set
    Attributes(&'a Item),
    /// An already parsed JSON document
    Document(Value),
    /// The record has nothing to bind from, e.g. a stream record without the new image
    Unavailable,
}

/// A check run on a value after it was decoded.
///
/// ```
/// use lamb::{Error, Validate};
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Body {
///     name: String,
///     status: String,
/// }
///
/// impl Validate for Body {
///     fn validate(&self) -> Result<(), Error> {
///         if self.status.is_empty() {
///             return Err(Error::from("status empty"));
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Validate {
    fn validate(&self) -> Result<(), Error>;
}

/// Decodes the payload into `T` without validation.
pub fn bind<T: DeserializeOwned>(payload: BindPayload<'_>) -> Result<T, Error> {
    Ok(decode(payload)?)
}

/// Decodes the payload into `T` and runs `T::validate` on it.
pub fn bind_valid<T: DeserializeOwned + Validate>(payload: BindPayload<'_>) -> Result<T, Error> {
    let value: T = decode(payload)?;
    value.validate()?;
    Ok(value)
}

fn decode<T: DeserializeOwned>(payload: BindPayload<'_>) -> Result<T, ApiError> {
    let decoded = match payload {
        BindPayload::Json(bytes) => serde_json::from_slice::<T>(&bytes).map_err(|e| e.to_string()),
        // numbers are parsed straight into the target type, so wide integers keep their precision
        BindPayload::Attributes(item) => {
            serde_dynamo::from_item(item.clone()).map_err(|e: serde_dynamo::Error| e.to_string())
        }
        BindPayload::Document(v) => serde_json::from_value::<T>(v).map_err(|e| e.to_string()),
        BindPayload::Unavailable => Err("no payload to bind from".to_owned()),
    };

    decoded.map_err(|e| {
        debug!("Failed to bind payload: {e}");
        INVALID_BODY
    })
}
