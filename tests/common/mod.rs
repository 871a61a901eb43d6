#![allow(dead_code)]

use serde_json::{json, Value};
use std::io;
use std::sync::{Arc, Mutex};
use tracing::{Dispatch, Level};

/// Collects JSON log lines written by a dispatcher in memory.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("log capture lock is poisoned").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl LogCapture {
    /// A JSON subscriber writing into this capture, to be passed to `with_logger`.
    pub fn dispatch(&self) -> Dispatch {
        self.dispatch_at(Level::INFO)
    }

    /// Same as [`dispatch`](Self::dispatch), recording events down to `level`.
    pub fn dispatch_at(&self, level: Level) -> Dispatch {
        let writer = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .json()
            .with_max_level(level)
            .with_writer(move || writer.clone())
            .finish();
        Dispatch::new(subscriber)
    }

    /// All captured log records, one per line.
    pub fn records(&self) -> Vec<Value> {
        let bytes = self.0.lock().expect("log capture lock is poisoned").clone();
        String::from_utf8(bytes)
            .expect("logs are not UTF-8")
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).expect("log line is not JSON"))
            .collect()
    }

    /// Captured records of the given level, e.g. `ERROR`.
    pub fn records_at(&self, level: &str) -> Vec<Value> {
        self.records()
            .into_iter()
            .filter(|record| record["level"] == level)
            .collect()
    }
}

/// An API Gateway proxy event as Lambda delivers it, without a body.
pub fn proxy_event(method: &str, path: &str) -> Value {
    json!({
        "resource": path,
        "path": path,
        "httpMethod": method,
        "headers": {},
        "multiValueHeaders": {},
        "queryStringParameters": {},
        "multiValueQueryStringParameters": {},
        "pathParameters": {},
        "stageVariables": {},
        "requestContext": {
            "accountId": "123456789012",
            "resourcePath": path,
            "httpMethod": method,
            "requestId": "c6af9ac6-7b61-11e6-9a41-93e8deadbeef",
            "stage": "test",
            "identity": {"sourceIp": "127.0.0.1"},
            "authorizer": {},
            "requestTimeEpoch": 1428582896000i64
        },
        "body": null,
        "isBase64Encoded": false
    })
}
