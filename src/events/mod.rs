//! The records delivered by the three supported triggers.
//!
//! The wire types come from `aws_lambda_events` and are decoded by `lambda_runtime`.
//! This module only tells the binder where each record keeps its payload.

use crate::bind::BindPayload;

pub mod apigw;
pub mod dynamodb;
pub mod s3;

pub use apigw::{ApiGatewayProxyRequest, ApiGatewayProxyResponse};
pub use dynamodb::{DynamoDbEvent, DynamoDbStreamRecord, EventType};
pub use s3::{S3Event, S3EventRecord};

/// What a [`Context`](crate::Context) needs to know about the record it wraps.
pub trait TriggerRecord {
    /// Short trigger name used in the invocation span, e.g. `dynamodb`.
    const TRIGGER: &'static str;

    /// `true` if the trigger sends the response written by the handler back to the caller.
    /// Batch triggers only look at the returned error.
    const RESPONDS: bool = false;

    /// The part of the record `Context::bind` decodes.
    fn bind_payload(&self) -> BindPayload<'_>;

    /// A one-line description of the operation for logging, e.g. `POST /items`.
    fn describe_operation(&self) -> String;
}

/// An event that carries an ordered batch of records.
pub trait BatchEvent {
    type Record: TriggerRecord;

    /// Records in delivery order.
    fn into_records(self) -> Vec<Self::Record>;
}
