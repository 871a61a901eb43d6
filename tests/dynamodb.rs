mod common;

use common::LogCapture;
use lamb::{
    ApiError, DynamoDbContext, DynamoDbEvent, DynamoDbStreamRecord, Error, EventType, LambdaEvent, INVALID_BODY,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::cell::{Cell, RefCell};
use tracing::Level;

#[derive(Debug, Default, Deserialize, PartialEq)]
struct Record {
    #[serde(rename = "pk")]
    artist_id: String,
    #[serde(rename = "sk")]
    profile_key: String,
    #[serde(default)]
    image_url: String,
}

fn keys() -> Value {
    json!({ "pk": { "S": "ARTIST#1234567" }, "sk": { "S": "PROFILE#" } })
}

fn image() -> Value {
    let mut image = keys();
    image["image_url"] = json!({ "S": "https://site.com/image.jpg" });
    image
}

/// A stream record of a NEW_AND_OLD_IMAGES stream, with the images the event name implies.
fn change(event_name: EventType, sequence_number: &str) -> Value {
    let mut change = json!({
        "ApproximateCreationDateTime": 1479499740,
        "Keys": keys(),
        "SequenceNumber": sequence_number,
        "SizeBytes": 26,
        "StreamViewType": "NEW_AND_OLD_IMAGES"
    });
    if event_name != EventType::Insert {
        change["OldImage"] = image();
    }
    if event_name != EventType::Remove {
        change["NewImage"] = image();
    }

    json!({
        "eventID": format!("event-{sequence_number}"),
        "eventName": event_name.as_str(),
        "eventVersion": "1.1",
        "eventSource": "aws:dynamodb",
        "awsRegion": "us-east-1",
        "dynamodb": change,
        "eventSourceARN": "arn:aws:dynamodb:us-east-1:123456789012:table/Artists/stream/2015-06-27T00:48:05.899"
    })
}

fn event(records: Vec<Value>) -> LambdaEvent<DynamoDbEvent> {
    let stream_event = serde_json::from_value(json!({ "Records": records })).expect("not a valid stream event");
    LambdaEvent::new(stream_event, Default::default())
}

#[tokio::test]
async fn dynamodb_handler() {
    let dispatcher = lamb::dynamodb(|c: DynamoDbContext| async move {
        let rec: Record = c.bind()?;

        assert_eq!(
            rec,
            Record {
                artist_id: "ARTIST#1234567".to_owned(),
                profile_key: "PROFILE#".to_owned(),
                image_url: "https://site.com/image.jpg".to_owned(),
            }
        );
        assert_eq!(c.event_type(), Some(EventType::Insert));

        Ok::<_, Error>(())
    });

    let result = dispatcher.handle(event(vec![change(EventType::Insert, "1")])).await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn dynamodb_handler_remove() {
    let dispatcher = lamb::dynamodb(|c: DynamoDbContext| async move {
        let rec: Record = c.bind()?;

        assert_eq!(
            rec,
            Record {
                artist_id: "ARTIST#1234567".to_owned(),
                profile_key: "PROFILE#".to_owned(),
                image_url: String::new(),
            }
        );
        assert_eq!(c.event_type(), Some(EventType::Remove));

        Ok::<_, Error>(())
    });

    assert!(dispatcher.handle(event(vec![change(EventType::Remove, "1")])).await.is_ok());
}

#[tokio::test]
async fn modify_binds_from_new_image() {
    let dispatcher = lamb::dynamodb(|c: DynamoDbContext| async move {
        let rec: Record = c.bind()?;
        assert_eq!(c.event_type(), Some(EventType::Modify));
        assert_eq!(rec.image_url, "https://site.com/image.jpg");
        Ok::<_, Error>(())
    });

    assert!(dispatcher.handle(event(vec![change(EventType::Modify, "1")])).await.is_ok());
}

#[tokio::test]
async fn binds_counters_wider_than_u64() {
    #[derive(Deserialize)]
    struct Counter {
        pk: String,
        total: u128,
    }

    let totals = RefCell::new(Vec::new());
    let dispatcher = lamb::dynamodb(|c: DynamoDbContext| {
        let totals = &totals;
        async move {
            let counter: Counter = c.bind()?;
            totals.borrow_mut().push((counter.pk, counter.total));
            Ok::<_, Error>(())
        }
    });

    let mut record = change(EventType::Insert, "1");
    record["dynamodb"]["NewImage"]["total"] = json!({ "N": "18446744073709551616" });

    dispatcher.handle(event(vec![record])).await.unwrap();

    assert_eq!(*totals.borrow(), vec![("ARTIST#1234567".to_owned(), u128::from(u64::MAX) + 1)]);
}

#[tokio::test]
async fn records_are_processed_in_order() {
    let seen = RefCell::new(Vec::new());
    let dispatcher = lamb::dynamodb(|c: DynamoDbContext| {
        let seen = &seen;
        async move {
            seen.borrow_mut()
                .push(c.record().change.sequence_number.clone().unwrap_or_default());
            Ok::<_, Error>(())
        }
    });

    let result = dispatcher
        .handle(event(vec![
            change(EventType::Insert, "100"),
            change(EventType::Modify, "200"),
            change(EventType::Remove, "300"),
        ]))
        .await;

    assert!(result.is_ok());
    assert_eq!(*seen.borrow(), vec!["100", "200", "300"]);
}

#[tokio::test]
async fn failure_aborts_the_batch() {
    let logs = LogCapture::default();
    let calls = Cell::new(0);
    let dispatcher = lamb::dynamodb(|_: DynamoDbContext| {
        let calls = &calls;
        async move {
            calls.set(calls.get() + 1);
            if calls.get() == 2 {
                return Err(Error::from(ApiError::new(409, "STALE_RECORD", "Record is out of date")));
            }
            Ok::<_, Error>(())
        }
    })
    .with_logger(logs.dispatch());

    let err = dispatcher
        .handle(event(vec![
            change(EventType::Insert, "1"),
            change(EventType::Insert, "2"),
            change(EventType::Insert, "3"),
            change(EventType::Insert, "4"),
        ]))
        .await
        .unwrap_err();

    assert_eq!(calls.get(), 2);
    assert_eq!(ApiError::from_boxed(&err).map(|e| &*e.code), Some("STALE_RECORD"));

    // structured errors are not unhandled, only the abort is logged
    assert!(logs.records_at("ERROR").is_empty());
    let warnings = logs.records_at("WARN");
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0]["fields"]["code"], "STALE_RECORD");
    assert_eq!(warnings[0]["span"]["index"], 1);
}

#[tokio::test]
async fn bind_failure_is_returned_to_the_runtime() {
    let dispatcher = lamb::dynamodb(|c: DynamoDbContext| async move {
        let _: Record = c.bind()?;
        Ok::<_, Error>(())
    });

    // a KEYS_ONLY stream has no new image to bind from
    let mut keys_only = change(EventType::Insert, "1");
    keys_only["dynamodb"]["StreamViewType"] = json!("KEYS_ONLY");
    keys_only["dynamodb"].as_object_mut().unwrap().remove("NewImage");

    let err = dispatcher.handle(event(vec![keys_only])).await.unwrap_err();

    assert_eq!(ApiError::from_boxed(&err), Some(&INVALID_BODY));
}

#[tokio::test]
async fn response_writes_are_ignored_for_streams() {
    let logs = LogCapture::default();
    let dispatcher = lamb::dynamodb(|mut c: DynamoDbContext| async move {
        c.header("Custom", "54321");
        c.ok(&json!({ "ignored": true }))
    })
    .with_logger(logs.dispatch_at(Level::DEBUG));

    let result = dispatcher.handle(event(vec![change(EventType::Insert, "1")])).await;

    assert!(result.is_ok());
    assert!(logs.records_at("ERROR").is_empty());
    assert!(logs.records_at("WARN").is_empty());

    let ignored: Vec<_> = logs
        .records_at("DEBUG")
        .into_iter()
        .filter(|r| r["fields"]["message"] == "dynamodb records do not send a response, it is ignored")
        .collect();
    assert_eq!(ignored.len(), 2);
    assert_eq!(ignored[0]["span"]["trigger"], "dynamodb");
}

#[tokio::test]
async fn unknown_error_is_logged_once_and_returned() {
    let logs = LogCapture::default();
    let dispatcher = lamb::dynamodb(|_: DynamoDbContext| async { Err::<(), _>(Error::from("throttled")) })
        .with_logger(logs.dispatch());

    let err = dispatcher
        .handle(event(vec![change(EventType::Insert, "1"), change(EventType::Insert, "2")]))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "throttled");

    let errors = logs.records_at("ERROR");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["fields"]["message"], "Unhandled error");
    assert_eq!(errors[0]["fields"]["error"], "throttled");
    assert_eq!(errors[0]["span"]["trigger"], "dynamodb");
}

#[tokio::test]
async fn empty_batch_succeeds() {
    let calls = Cell::new(0);
    let dispatcher = lamb::dynamodb(|_: DynamoDbContext| {
        calls.set(calls.get() + 1);
        async { Ok::<_, Error>(()) }
    });

    assert!(dispatcher.handle(event(Vec::new())).await.is_ok());
    assert_eq!(calls.get(), 0);
}

#[tokio::test]
async fn decodes_event_from_the_wire() {
    let stream_event: DynamoDbEvent = serde_json::from_str(
        r#"{"Records": [{
            "eventID": "1",
            "eventName": "REMOVE",
            "eventVersion": "1.0",
            "eventSource": "aws:dynamodb",
            "awsRegion": "us-east-1",
            "dynamodb": {
                "ApproximateCreationDateTime": 1479499740,
                "Keys": {"pk": {"S": "ARTIST#1234567"}, "sk": {"S": "PROFILE#"}},
                "OldImage": {"pk": {"S": "ARTIST#1234567"}, "sk": {"S": "PROFILE#"}, "image_url": {"S": "x"}},
                "SequenceNumber": "222",
                "SizeBytes": 59,
                "StreamViewType": "NEW_AND_OLD_IMAGES"
            },
            "eventSourceARN": "stream-ARN"
        }]}"#,
    )
    .unwrap();

    let dispatcher = lamb::dynamodb(|c: DynamoDbContext| async move {
        let rec: Record = c.bind()?;
        assert_eq!(rec.image_url, "");
        Ok::<_, Error>(())
    });

    let record: &DynamoDbStreamRecord = &stream_event.records[0];
    assert_eq!(record.event_name, "REMOVE");
    assert!(dispatcher.handle(LambdaEvent::new(stream_event, Default::default())).await.is_ok());
}
