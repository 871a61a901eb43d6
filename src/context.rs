use crate::bind::{self, Validate};
use crate::error::Error;
use crate::events::{ApiGatewayProxyRequest, DynamoDbStreamRecord, EventType, S3EventRecord, TriggerRecord};
use crate::response::{self, Response};
use lambda_runtime::Context as LambdaContext;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, Span};

/// Per-invocation handle passed to handlers.
///
/// One is created for every API Gateway request and for every record of a DynamoDB or S3 batch.
/// Handlers take it by value, so it can be held across `.await` points.
///
/// The response methods exist for all triggers, but only the API Gateway dispatcher
/// sends the response anywhere. For DynamoDB and S3 records the response is dropped
/// and the handler signals failure by returning an error.
#[derive(Debug)]
pub struct Context<R> {
    record: R,
    lambda: LambdaContext,
    response: ResponseSlot,
    span: Span,
}

/// Context of an API Gateway proxy request.
pub type ApiGatewayContext = Context<ApiGatewayProxyRequest>;
/// Context of a single DynamoDB stream record.
pub type DynamoDbContext = Context<DynamoDbStreamRecord>;
/// Context of a single S3 notification record.
pub type S3Context = Context<S3EventRecord>;

/// The response of one invocation, shared by the context and the dispatcher
/// that reads it once the handler future has completed.
#[derive(Debug, Clone, Default)]
pub(crate) struct ResponseSlot(Arc<Mutex<Response>>);

impl ResponseSlot {
    fn update<T>(&self, f: impl FnOnce(&mut Response) -> T) -> T {
        // a handler that panicked mid-write leaves a response that is still well formed
        let mut response = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut response)
    }

    pub(crate) fn take(&self) -> Response {
        self.update(std::mem::take)
    }
}

impl<R: TriggerRecord> Context<R> {
    pub(crate) fn new(record: R, lambda: LambdaContext, span: Span) -> Self {
        Self {
            record,
            lambda,
            response: ResponseSlot::default(),
            span,
        }
    }

    /// Decodes the record payload into `T`.
    /// Returns [`INVALID_BODY`](crate::INVALID_BODY) if the payload does not decode into `T`.
    pub fn bind<T: DeserializeOwned>(&self) -> Result<T, Error> {
        bind::bind(self.record.bind_payload())
    }

    /// Same as [`bind`](Self::bind), but also runs [`Validate::validate`] on the decoded value
    /// and returns its error unchanged if validation fails.
    pub fn bind_valid<T: DeserializeOwned + Validate>(&self) -> Result<T, Error> {
        bind::bind_valid(self.record.bind_payload())
    }

    /// Writes the status and the JSON encoded body into the response, keeping headers already set.
    /// Bodies that serialize into `null`, e.g. `()`, produce an empty response body.
    ///
    /// Only API Gateway sends the response back. DynamoDB and S3 records ignore it.
    pub fn json<B: Serialize + ?Sized>(&mut self, status: u16, body: &B) -> Result<(), Error> {
        self.note_ignored_response();
        self.response.update(|r| response::write_json(r, status, body));
        Ok(())
    }

    /// Sets a response header. A later call with the same name overwrites the value.
    /// Names or values HTTP cannot carry are logged and skipped.
    ///
    /// Only API Gateway sends the response back. DynamoDB and S3 records ignore it.
    pub fn header(&mut self, name: &str, value: &str) {
        self.note_ignored_response();
        self.response.update(|r| response::set_header(r, name, value));
    }

    /// 200 with `body`. Ignored by DynamoDB and S3 records.
    pub fn ok<B: Serialize + ?Sized>(&mut self, body: &B) -> Result<(), Error> {
        self.json(200, body)
    }

    /// 201 with an empty body and the `Location` header set to `location`.
    /// Use `json(201, &())` if the header is not wanted. Ignored by DynamoDB and S3 records.
    pub fn created(&mut self, location: impl AsRef<str>) -> Result<(), Error> {
        self.header("Location", location.as_ref());
        self.json(201, &())
    }

    /// The trigger record this context wraps.
    pub fn record(&self) -> &R {
        &self.record
    }

    /// Invocation metadata from the Lambda runtime: request ID, deadline, function ARN.
    pub fn lambda_context(&self) -> &LambdaContext {
        &self.lambda
    }

    pub fn request_id(&self) -> &str {
        &self.lambda.request_id
    }

    /// The invocation span. Events logged by the handler are recorded inside it.
    pub fn span(&self) -> &Span {
        &self.span
    }

    /// A copy of the response written so far.
    pub fn response(&self) -> Response {
        self.response.update(|r| r.clone())
    }

    pub(crate) fn response_slot(&self) -> ResponseSlot {
        self.response.clone()
    }

    fn note_ignored_response(&self) {
        if !R::RESPONDS {
            debug!("{} records do not send a response, it is ignored", R::TRIGGER);
        }
    }
}

impl Context<ApiGatewayProxyRequest> {
    pub fn request(&self) -> &ApiGatewayProxyRequest {
        &self.record
    }

    /// Request header lookup ignoring the case of the name.
    pub fn request_header(&self, name: &str) -> Option<&str> {
        self.record.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn path_parameter(&self, name: &str) -> Option<&str> {
        self.record.path_parameters.get(name).map(String::as_str)
    }

    /// The first value of a query string parameter.
    pub fn query_parameter(&self, name: &str) -> Option<&str> {
        self.record.query_string_parameters.first(name)
    }
}

impl Context<DynamoDbStreamRecord> {
    /// The operation that produced the record. Fixed for the lifetime of the context.
    /// `None` if the stream sent an event name this crate does not know.
    pub fn event_type(&self) -> Option<EventType> {
        self.record.event_name.parse().ok()
    }
}
