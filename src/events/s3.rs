use super::{BatchEvent, TriggerRecord};
use crate::bind::BindPayload;
use tracing::debug;

pub use aws_lambda_events::s3::{S3Event, S3EventRecord};

impl BatchEvent for S3Event {
    type Record = S3EventRecord;

    fn into_records(self) -> Vec<Self::Record> {
        self.records
    }
}

impl TriggerRecord for S3EventRecord {
    const TRIGGER: &'static str = "s3";

    /// Object records bind from the `s3` entity: bucket and object descriptors.
    fn bind_payload(&self) -> BindPayload<'_> {
        match serde_json::to_value(&self.s3) {
            Ok(v) => BindPayload::Document(v),
            Err(e) => {
                debug!("Cannot convert S3 entity to JSON: {e}");
                BindPayload::Unavailable
            }
        }
    }

    fn describe_operation(&self) -> String {
        format!(
            "{} {}/{}",
            self.event_name.as_deref().unwrap_or_default(),
            self.s3.bucket.name.as_deref().unwrap_or_default(),
            self.s3.object.key.as_deref().unwrap_or_default(),
        )
    }
}
