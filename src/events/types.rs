/// Event value and its wire representation
///
/// On the wire an event is one flat JSON object per frame:
/// `{"id": "...", "type": "...", "message": "...", "timestamp": "<RFC 3339>"}`
use crate::errors::DecodeError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A producer-stamped event
///
/// `id` is the only identity: two events with the same id are the same event,
/// whatever their other fields say.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,

    /// Category label; an open set, see `EventKind` for the ones the clock emits
    #[serde(rename = "type")]
    pub kind: String,

    pub message: String,

    pub timestamp: DateTime<Utc>,
}

impl Event {
    pub fn new(
        id: impl Into<String>,
        kind: impl Into<String>,
        message: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            message: message.into(),
            timestamp,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(payload: &[u8]) -> Result<Self, DecodeError> {
        Ok(serde_json::from_slice(payload)?)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} [{}] {} @ {}",
            self.id,
            self.kind,
            self.message,
            self.timestamp.to_rfc3339()
        )
    }
}

/// Kinds produced by the built-in event clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Info,
    Warning,
    Error,
}

impl EventKind {
    pub const ALL: [EventKind; 3] = [EventKind::Info, EventKind::Warning, EventKind::Error];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Info => "info",
            EventKind::Warning => "warning",
            EventKind::Error => "error",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_wire_field_names() {
        let event = Event::new(
            "42",
            EventKind::Warning.as_str(),
            "disk almost full",
            Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        );

        let value: serde_json::Value = serde_json::from_str(&event.to_json().unwrap()).unwrap();
        assert_eq!(value["id"], "42");
        assert_eq!(value["type"], "warning");
        assert_eq!(value["message"], "disk almost full");
        assert_eq!(value["timestamp"], "2024-03-01T12:00:00Z");
        assert!(value.get("kind").is_none());
    }

    #[test]
    fn test_decode_accepts_offset_timestamps() {
        let payload =
            br#"{"id":"7","type":"custom","message":"hi","timestamp":"2024-03-01T15:00:00+03:00"}"#;
        let event = Event::from_json(payload).unwrap();
        assert_eq!(event.kind, "custom");
        assert_eq!(
            event.timestamp,
            Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_decode_rejects_malformed_payloads() {
        assert!(Event::from_json(b"not json").is_err());
        assert!(Event::from_json(br#"{"id":"1","type":"info","message":"x"}"#).is_err());
        assert!(Event::from_json(
            br#"{"id":"1","type":"info","message":"x","timestamp":"yesterday"}"#
        )
        .is_err());
    }
}
