use super::{BatchEvent, TriggerRecord};
use crate::bind::BindPayload;
use std::fmt;
use std::str::FromStr;

pub use aws_lambda_events::dynamodb::{Event as DynamoDbEvent, EventRecord as DynamoDbStreamRecord, StreamRecord};

impl BatchEvent for DynamoDbEvent {
    type Record = DynamoDbStreamRecord;

    fn into_records(self) -> Vec<Self::Record> {
        self.records
    }
}

/// The operation that produced the stream record, from its `eventName`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    Insert,
    Modify,
    Remove,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Insert => "INSERT",
            Self::Modify => "MODIFY",
            Self::Remove => "REMOVE",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INSERT" => Ok(Self::Insert),
            "MODIFY" => Ok(Self::Modify),
            "REMOVE" => Ok(Self::Remove),
            _ => Err(format!("unknown DynamoDB event name {s:?}")),
        }
    }
}

impl TriggerRecord for DynamoDbStreamRecord {
    const TRIGGER: &'static str = "dynamodb";

    /// Removals carry no new image, only the keys of the deleted item.
    /// An INSERT or MODIFY from a KEYS_ONLY stream binds from an empty image.
    fn bind_payload(&self) -> BindPayload<'_> {
        if self.event_name == EventType::Remove.as_str() {
            return BindPayload::Attributes(&self.change.keys);
        }

        BindPayload::Attributes(&self.change.new_image)
    }

    fn describe_operation(&self) -> String {
        match &self.change.sequence_number {
            Some(seq) => format!("{} #{seq}", self.event_name),
            None => self.event_name.clone(),
        }
    }
}
