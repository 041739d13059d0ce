use std::sync::OnceLock;

use bytes::Bytes;
use regex::Regex;
use serde::Serialize;

use crate::errors::ConfabError;

/// Topic names: 1-36 characters of alphanumerics, dash, underscore.
const TOPIC_PATTERN: &str = "^[A-Za-z0-9_-]{1,36}$";

/// Payloads larger than this are rejected before reaching the transport.
pub const MAX_DATA_MESSAGE_BYTES: usize = 2048;

fn topic_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(TOPIC_PATTERN).unwrap())
}

/// An application data message bound for the meeting data channel.
///
/// Construction validates topic and payload size, so a value of this
/// type is always transmittable; invalid messages never reach the
/// transport. `lifetime_ms` is how long the server retains the message
/// for late joiners (zero means no retention).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataMessage {
    topic: String,
    data: Bytes,
    lifetime_ms: u32,
}

impl DataMessage {
    /// Build a message from raw bytes.
    pub fn new(
        topic: impl Into<String>,
        data: impl Into<Bytes>,
        lifetime_ms: u32,
    ) -> Result<Self, ConfabError> {
        let topic = topic.into();
        if !topic_regex().is_match(&topic) {
            return Err(ConfabError::InvalidParameter(format!(
                "invalid data message topic: '{topic}'"
            )));
        }
        let data = data.into();
        if data.len() > MAX_DATA_MESSAGE_BYTES {
            return Err(ConfabError::InvalidParameter(format!(
                "data message payload is {} bytes, limit is {MAX_DATA_MESSAGE_BYTES}",
                data.len()
            )));
        }
        Ok(Self {
            topic,
            data,
            lifetime_ms,
        })
    }

    /// Serialize `payload` as JSON and build a message from the result.
    ///
    /// The size limit applies to the serialized bytes.
    pub fn json<T: Serialize>(
        topic: impl Into<String>,
        payload: &T,
        lifetime_ms: u32,
    ) -> Result<Self, ConfabError> {
        let data = serde_json::to_vec(payload)
            .map_err(|e| ConfabError::InvalidParameter(format!("unserializable payload: {e}")))?;
        Self::new(topic, data, lifetime_ms)
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn lifetime_ms(&self) -> u32 {
        self.lifetime_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_message_is_accepted() {
        let msg = DataMessage::new("chat-room_1", b"hello".to_vec(), 1000).unwrap();
        assert_eq!(msg.topic(), "chat-room_1");
        assert_eq!(msg.data().as_ref(), b"hello");
        assert_eq!(msg.lifetime_ms(), 1000);
    }

    #[test]
    fn topic_with_space_and_punctuation_is_rejected() {
        let err = DataMessage::new("bad topic!", b"x".to_vec(), 0).unwrap_err();
        assert!(matches!(err, ConfabError::InvalidParameter(_)));
    }

    #[test]
    fn empty_topic_is_rejected() {
        assert!(DataMessage::new("", b"x".to_vec(), 0).is_err());
    }

    #[test]
    fn overlong_topic_is_rejected() {
        let topic = "a".repeat(37);
        assert!(DataMessage::new(topic, b"x".to_vec(), 0).is_err());
    }

    #[test]
    fn topic_at_length_limit_is_accepted() {
        let topic = "a".repeat(36);
        assert!(DataMessage::new(topic, b"x".to_vec(), 0).is_ok());
    }

    #[test]
    fn payload_over_limit_is_rejected() {
        let err = DataMessage::new("topic", vec![0u8; MAX_DATA_MESSAGE_BYTES + 1], 1000).unwrap_err();
        assert!(matches!(err, ConfabError::InvalidParameter(_)));
    }

    #[test]
    fn payload_at_limit_is_accepted() {
        assert!(DataMessage::new("topic", vec![0u8; MAX_DATA_MESSAGE_BYTES], 1000).is_ok());
    }

    #[test]
    fn json_size_check_counts_serialized_bytes() {
        #[derive(Serialize)]
        struct Payload {
            text: String,
        }

        // The struct itself is small; the serialized form is what counts.
        let payload = Payload {
            text: "x".repeat(MAX_DATA_MESSAGE_BYTES),
        };
        assert!(DataMessage::json("topic", &payload, 0).is_err());

        let payload = Payload {
            text: "short".to_string(),
        };
        let msg = DataMessage::json("topic", &payload, 0).unwrap();
        assert_eq!(msg.data().as_ref(), br#"{"text":"short"}"#);
    }
}
