//! Stored conversation records as read back from the document store.

use chrono::DateTime;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Customer identifier (`contact_id` in the store).
pub type CustomerId = i64;

/// Display format used for conversation timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Opaque conversation identifier.
///
/// The store holds numeric ids for some datasets and string ids for others;
/// both decode into the same string form so results can be keyed uniformly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConversationId(String);

impl ConversationId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConversationId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<i64> for ConversationId {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl Serialize for ConversationId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ConversationId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct IdVisitor;

        impl Visitor<'_> for IdVisitor {
            type Value = ConversationId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a string or integer conversation id")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
                Ok(ConversationId(value.to_string()))
            }

            fn visit_string<E: de::Error>(self, value: String) -> Result<Self::Value, E> {
                Ok(ConversationId(value))
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
                Ok(ConversationId(value.to_string()))
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
                Ok(ConversationId(value.to_string()))
            }

            fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
                if value.fract() == 0.0 && value.is_finite() {
                    Ok(ConversationId((value as i64).to_string()))
                } else {
                    Err(E::custom(format!("non-integral conversation id {value}")))
                }
            }
        }

        deserializer.deserialize_any(IdVisitor)
    }
}

/// A single message inside a stored conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    /// Speaker role as recorded by the support platform.
    pub role: String,
    /// Message text.
    #[serde(default)]
    pub content: String,
    /// UI-only quick reply buttons; messages carrying them are not content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quick_replies: Option<Vec<serde_json::Value>>,
}

impl Message {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
            quick_replies: None,
        }
    }

    /// True when the message only renders quick-reply buttons.
    pub fn is_quick_reply(&self) -> bool {
        self.quick_replies
            .as_ref()
            .is_some_and(|replies| !replies.is_empty())
    }
}

/// Historical support conversation for one customer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConversationRecord {
    pub conversation_id: ConversationId,
    #[serde(rename = "contact_id", deserialize_with = "deserialize_customer_id")]
    pub customer_id: CustomerId,
    /// Start time in epoch milliseconds.
    #[serde(deserialize_with = "deserialize_epoch_millis")]
    pub start_time: i64,
    /// End time in epoch milliseconds.
    #[serde(deserialize_with = "deserialize_epoch_millis")]
    pub end_time: i64,
    #[serde(default)]
    pub messages: Vec<Message>,
    /// Precomputed embedding; search projections leave it out.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub embedding: Vec<f32>,
    /// Flattened transcript used for embedding and keyword search.
    #[serde(default)]
    pub text_for_embedding: String,
}

impl ConversationRecord {
    /// Formatted start timestamp.
    pub fn started_at(&self) -> String {
        format_epoch_millis(self.start_time)
    }

    /// Formatted end timestamp.
    pub fn ended_at(&self) -> String {
        format_epoch_millis(self.end_time)
    }
}

/// Format epoch milliseconds as `YYYY-MM-DD HH:MM:SS` (UTC).
///
/// Out-of-range values render as an empty string.
pub fn format_epoch_millis(millis: i64) -> String {
    DateTime::from_timestamp_millis(millis)
        .map(|ts| ts.format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_default()
}

struct NumberVisitor(&'static str);

impl Visitor<'_> for NumberVisitor {
    type Value = i64;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<i64, E> {
        Ok(value)
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<i64, E> {
        i64::try_from(value).map_err(|_| E::custom(format!("{value} out of range")))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<i64, E> {
        if value.is_finite() {
            Ok(value.trunc() as i64)
        } else {
            Err(E::custom(format!("{value} is not a finite number")))
        }
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<i64, E> {
        value
            .trim()
            .parse()
            .map_err(|_| E::custom(format!("invalid integer {value:?}")))
    }
}

fn deserialize_epoch_millis<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    deserializer.deserialize_any(NumberVisitor("epoch milliseconds"))
}

fn deserialize_customer_id<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<CustomerId, D::Error> {
    deserializer.deserialize_any(NumberVisitor("an integer customer id"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn decodes_numeric_and_string_ids() {
        let numeric: ConversationRecord = serde_json::from_value(json!({
            "conversation_id": 1234,
            "contact_id": 7,
            "start_time": 1_700_000_000_000i64,
            "end_time": 1_700_000_360_000.0,
            "messages": []
        }))
        .expect("numeric record");
        assert_eq!(numeric.conversation_id, ConversationId::new("1234"));
        assert_eq!(numeric.end_time, 1_700_000_360_000);

        let string: ConversationRecord = serde_json::from_value(json!({
            "conversation_id": "conv-9",
            "contact_id": "7",
            "start_time": 0,
            "end_time": 0
        }))
        .expect("string record");
        assert_eq!(string.conversation_id.as_str(), "conv-9");
        assert_eq!(string.customer_id, 7);
        assert!(string.messages.is_empty());
    }

    #[test]
    fn ignores_auxiliary_message_fields() {
        let message: Message = serde_json::from_value(json!({
            "role": "agent",
            "content": "hello",
            "buttons": ["a"],
            "quick_replies": [{"title": "yes"}]
        }))
        .expect("message");
        assert!(message.is_quick_reply());
        assert!(!Message::new("agent", "hi").is_quick_reply());

        let empty: Message = serde_json::from_value(json!({
            "role": "agent",
            "content": "hello",
            "quick_replies": []
        }))
        .expect("message");
        assert!(!empty.is_quick_reply());
    }

    #[test]
    fn formats_epoch_millis_in_utc() {
        assert_eq!(format_epoch_millis(0), "1970-01-01 00:00:00");
        assert_eq!(format_epoch_millis(1_700_000_000_000), "2023-11-14 22:13:20");
        assert_eq!(format_epoch_millis(i64::MAX), "");
    }
}
