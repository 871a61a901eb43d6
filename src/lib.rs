//! One handler style for AWS Lambdas triggered by API Gateway, DynamoDB Streams and S3.
//!
//! A handler is an async function that takes a [`Context`] and returns `Result<(), Error>`.
//! The context decodes the trigger payload with [`Context::bind`] and writes responses with
//! [`Context::ok`], [`Context::created`] and [`Context::json`]. The context is taken by
//! value, so it can be used across `.await` points. Wrap errors with [`anyhow::Context`]
//! to get the whole cause chain in the logs.
//!
//! ```
//! use lamb::{ApiGatewayContext, ApiGatewayProxyRequest, Error, LambdaEvent};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct NewArtist {
//!     name: String,
//! }
//!
//! async fn create_artist(mut c: ApiGatewayContext) -> Result<(), Error> {
//!     let artist: NewArtist = c.bind()?;
//!     c.created(format!("/artists/{}", artist.name))
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let dispatcher = lamb::api_gateway(create_artist);
//!
//! let request: ApiGatewayProxyRequest = serde_json::from_value(serde_json::json!({
//!     "httpMethod": "POST",
//!     "path": "/artists",
//!     "requestContext": { "httpMethod": "POST", "identity": {}, "authorizer": {} },
//!     "body": r#"{"name": "Mei"}"#,
//! }))
//! .unwrap();
//! let response = dispatcher.handle(LambdaEvent::new(request, Default::default())).await;
//!
//! assert_eq!(response.status_code, 201);
//! assert_eq!(lamb::response::header(&response, "Location"), Some("/artists/Mei"));
//! # }
//! ```
//!
//! Errors other than [`ApiError`] never reach the caller: they are logged and replaced with
//! [`INTERNAL_SERVER_ERROR`]. Batch triggers stop at the first failed record and return the
//! error to the runtime so the batch is redelivered.

pub mod bind;
pub mod classify;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod logging;
pub mod response;

pub use bind::{BindPayload, Validate};
pub use classify::classify;
pub use config::{Config, ConfigError, LogFormat};
pub use context::{ApiGatewayContext, Context, DynamoDbContext, S3Context};
pub use dispatch::{BatchDispatcher, RequestDispatcher};
pub use error::{ApiError, Error, INTERNAL_SERVER_ERROR, INVALID_BODY};
pub use events::{
    ApiGatewayProxyRequest, BatchEvent, DynamoDbEvent, DynamoDbStreamRecord, EventType, S3Event, S3EventRecord,
    TriggerRecord,
};
pub use lambda_runtime::LambdaEvent;
pub use logging::init_tracing;
pub use response::Response;
pub use anyhow;
pub use aws_lambda_events;

use std::future::Future;

pub type ApiGatewayDispatcher<H> = RequestDispatcher<ApiGatewayProxyRequest, H>;
pub type DynamoDbDispatcher<H> = BatchDispatcher<DynamoDbEvent, H>;
pub type S3Dispatcher<H> = BatchDispatcher<S3Event, H>;

/// Adapts `handler` to API Gateway proxy requests.
pub fn api_gateway<H, Fut>(handler: H) -> ApiGatewayDispatcher<H>
where
    H: Fn(ApiGatewayContext) -> Fut,
    Fut: Future<Output = Result<(), Error>>,
{
    RequestDispatcher::new(handler)
}

/// Adapts `handler` to DynamoDB stream batches. The handler is called once per record.
pub fn dynamodb<H, Fut>(handler: H) -> DynamoDbDispatcher<H>
where
    H: Fn(DynamoDbContext) -> Fut,
    Fut: Future<Output = Result<(), Error>>,
{
    BatchDispatcher::new(handler)
}

/// Adapts `handler` to S3 notification batches. The handler is called once per record.
pub fn s3<H, Fut>(handler: H) -> S3Dispatcher<H>
where
    H: Fn(S3Context) -> Fut,
    Fut: Future<Output = Result<(), Error>>,
{
    BatchDispatcher::new(handler)
}
