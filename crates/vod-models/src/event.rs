//! Upload-completion event notifications.
//!
//! The storage system publishes a notification onto the work queue when a
//! client finishes a direct upload. The body is the standard S3 event
//! shape; the poller only needs `Records[0].s3.object.key`.

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur while parsing an upload event body.
#[derive(Debug, Error)]
pub enum EventError {
    #[error("Event body is empty")]
    EmptyBody,

    #[error("Event body is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Event carries no object key")]
    MissingKey,
}

#[derive(Debug, Deserialize)]
struct Notification {
    #[serde(rename = "Records", default)]
    records: Vec<Record>,
}

#[derive(Debug, Deserialize)]
struct Record {
    s3: S3Entity,
}

#[derive(Debug, Deserialize)]
struct S3Entity {
    object: ObjectRef,
}

#[derive(Debug, Deserialize)]
struct ObjectRef {
    key: String,
}

/// A parsed upload-completion notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadEvent {
    /// Key of the uploaded source object
    pub object_key: String,
}

impl UploadEvent {
    /// Parse a raw queue message body.
    ///
    /// Any shape other than a JSON body carrying
    /// `Records[0].s3.object.key` is treated as malformed.
    pub fn parse(body: &str) -> Result<Self, EventError> {
        if body.trim().is_empty() {
            return Err(EventError::EmptyBody);
        }

        let notification: Notification = serde_json::from_str(body)?;
        let record = notification.records.into_iter().next().ok_or(EventError::MissingKey)?;

        if record.s3.object.key.is_empty() {
            return Err(EventError::MissingKey);
        }

        Ok(Self {
            object_key: record.s3.object.key,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event_body(key: &str) -> String {
        format!(r#"{{"Records":[{{"s3":{{"object":{{"key":"{key}"}}}}}}]}}"#)
    }

    #[test]
    fn test_parse_well_formed_event() {
        let event = UploadEvent::parse(&event_body("uploads/video-abc123.mp4")).unwrap();
        assert_eq!(event.object_key, "uploads/video-abc123.mp4");
    }

    #[test]
    fn test_parse_empty_body() {
        assert!(matches!(UploadEvent::parse(""), Err(EventError::EmptyBody)));
        assert!(matches!(UploadEvent::parse("   "), Err(EventError::EmptyBody)));
    }

    #[test]
    fn test_parse_invalid_json() {
        assert!(matches!(
            UploadEvent::parse("not json"),
            Err(EventError::Malformed(_))
        ));
    }

    #[test]
    fn test_parse_no_records() {
        assert!(matches!(
            UploadEvent::parse(r#"{"Records":[]}"#),
            Err(EventError::MissingKey)
        ));
        assert!(matches!(
            UploadEvent::parse(r#"{"Event":"s3:TestEvent"}"#),
            Err(EventError::MissingKey)
        ));
    }

    #[test]
    fn test_parse_empty_key() {
        assert!(matches!(
            UploadEvent::parse(&event_body("")),
            Err(EventError::MissingKey)
        ));
    }

    #[test]
    fn test_parse_wrong_nesting() {
        // `s3.object` missing entirely
        assert!(matches!(
            UploadEvent::parse(r#"{"Records":[{"s3":{}}]}"#),
            Err(EventError::Malformed(_))
        ));
    }
}
