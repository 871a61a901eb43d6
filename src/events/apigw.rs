use super::TriggerRecord;
use crate::bind::BindPayload;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use std::borrow::Cow;
use tracing::debug;

pub use aws_lambda_events::apigw::{ApiGatewayProxyRequest, ApiGatewayProxyResponse};

impl TriggerRecord for ApiGatewayProxyRequest {
    const TRIGGER: &'static str = "api_gateway";
    const RESPONDS: bool = true;

    fn bind_payload(&self) -> BindPayload<'_> {
        let body = self.body.as_deref().unwrap_or_default();

        if !self.is_base64_encoded {
            return BindPayload::Json(Cow::Borrowed(body.as_bytes()));
        }

        // binary media types arrive base64 encoded
        match BASE64.decode(body) {
            Ok(v) => BindPayload::Json(Cow::Owned(v)),
            Err(e) => {
                debug!("Invalid base64 request body: {e}");
                BindPayload::Unavailable
            }
        }
    }

    fn describe_operation(&self) -> String {
        format!("{} {}", self.http_method, self.path.as_deref().unwrap_or_default())
    }
}
