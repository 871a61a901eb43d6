//! Building the API Gateway proxy response.
//!
//! The response type is `ApiGatewayProxyResponse` from `aws_lambda_events`. The functions here
//! make sure its body is always valid JSON or empty.

use crate::error::INTERNAL_SERVER_ERROR;
use aws_lambda_events::encodings::Body;
use http::header::{HeaderName, HeaderValue};
use serde::Serialize;
use tracing::warn;

pub use aws_lambda_events::apigw::ApiGatewayProxyResponse as Response;

/// Used if even the canned internal error cannot be serialized, which should never happen.
const INTERNAL_SERVER_ERROR_BODY: &str = r#"{"code":"INTERNAL_SERVER_ERROR","detail":"Internal server error"}"#;

/// Builds a response with `body` encoded as JSON.
///
/// A body that serializes into JSON `null`, e.g. `()` or `None`, produces an empty body.
/// If the body cannot be serialized the status is forced to 500 and the body is replaced
/// with the internal server error.
pub fn json<B: Serialize + ?Sized>(status: u16, body: &B) -> Response {
    let mut response = Response::default();
    write_json(&mut response, status, body);
    response
}

/// 200 with `body`.
pub fn ok<B: Serialize + ?Sized>(body: &B) -> Response {
    json(200, body)
}

/// 201 with an empty body and the `Location` header pointing at the new resource.
pub fn created(location: &str) -> Response {
    let mut response = json(201, &());
    set_header(&mut response, "Location", location);
    response
}

/// Inserts a header, overwriting any previous value for the same name.
/// Names are case-insensitive. A name or value HTTP cannot carry is logged and skipped.
pub fn set_header(response: &mut Response, name: &str, value: &str) {
    let name = match HeaderName::from_bytes(name.as_bytes()) {
        Ok(v) => v,
        Err(e) => {
            warn!("Invalid response header name {name:?}, skipping it: {e}");
            return;
        }
    };

    match HeaderValue::from_str(value) {
        Ok(value) => {
            response.headers.insert(name, value);
        }
        Err(e) => warn!("Invalid value for response header {name}, skipping it: {e}"),
    }
}

/// A response header as text. Names are case-insensitive.
pub fn header<'a>(response: &'a Response, name: &str) -> Option<&'a str> {
    response.headers.get(name).and_then(|v| v.to_str().ok())
}

/// The response body as text, empty for no content.
pub fn body(response: &Response) -> &str {
    match &response.body {
        Some(Body::Text(text)) => text,
        _ => "",
    }
}

/// Writes the status and the encoded body, leaving the headers as they are.
pub(crate) fn write_json<B: Serialize + ?Sized>(response: &mut Response, status: u16, body: &B) {
    let (status, body) = encode_body(status, body);
    response.status_code = i64::from(status);
    response.body = if body.is_empty() { None } else { Some(Body::Text(body)) };
}

/// Returns the status and the encoded body, falling back onto the internal server error.
pub(crate) fn encode_body<B: Serialize + ?Sized>(status: u16, body: &B) -> (u16, String) {
    match serde_json::to_string(body) {
        Ok(v) if v == "null" => (status, String::new()),
        Ok(v) => (status, v),
        Err(e) => {
            warn!("Failed to serialize response body, replying with {}: {e}", INTERNAL_SERVER_ERROR.status);
            let body = serde_json::to_string(&INTERNAL_SERVER_ERROR)
                .unwrap_or_else(|_| INTERNAL_SERVER_ERROR_BODY.to_owned());
            (INTERNAL_SERVER_ERROR.status, body)
        }
    }
}
