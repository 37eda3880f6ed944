//! Read-only view of a peeked message and how it is rendered.

use base64::Engine;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

/// The sub-queue a receiver is bound to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SubQueue {
    Active,
    DeadLetter,
}

impl SubQueue {
    /// Short label used in message block headers.
    pub fn label(self) -> &'static str {
        match self {
            SubQueue::Active => "ACTIVE",
            SubQueue::DeadLetter => "DLQ",
        }
    }

    /// Long label used in section headers.
    pub fn title(self) -> &'static str {
        match self {
            SubQueue::Active => "ACTIVE",
            SubQueue::DeadLetter => "DEAD-LETTER",
        }
    }
}

/// Message payload as handed over by the broker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Body {
    Bytes(Vec<u8>),
    /// The broker returned something that is not a data section.
    Unreadable(String),
}

impl Default for Body {
    fn default() -> Self {
        Body::Bytes(Vec::new())
    }
}

/// A message copied out of the SDK's peek result.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PeekedMessage {
    pub sequence_number: i64,
    pub message_id: Option<String>,
    pub enqueued_time: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub delivery_count: Option<u32>,
    pub content_type: Option<String>,
    pub subject: Option<String>,
    pub correlation_id: Option<String>,
    pub to: Option<String>,
    pub reply_to: Option<String>,
    pub session_id: Option<String>,
    pub partition_key: Option<String>,
    pub dead_letter_reason: Option<String>,
    pub dead_letter_error_description: Option<String>,
    /// Converted to JSON scalars, in broker order.
    pub application_properties: Vec<(String, Value)>,
    pub body: Body,
}

pub fn format_timestamp(time: &DateTime<Utc>) -> String {
    time.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

impl PeekedMessage {
    /// Metadata fields that carry a value, in display order.
    pub fn metadata(&self) -> Map<String, Value> {
        let mut map = Map::new();
        let mut put = |key: &str, value: Option<Value>| {
            if let Some(value) = value {
                map.insert(key.into(), value);
            }
        };
        let text = |value: &Option<String>| value.clone().map(Value::String);
        let time = |value: &Option<DateTime<Utc>>| {
            value.as_ref().map(|t| Value::String(format_timestamp(t)))
        };

        put("sequence_number", Some(self.sequence_number.into()));
        put("enqueued_time_utc", time(&self.enqueued_time));
        put("expires_at_utc", time(&self.expires_at));
        put("delivery_count", self.delivery_count.map(Value::from));
        put("content_type", text(&self.content_type));
        put("subject", text(&self.subject));
        put("message_id", text(&self.message_id));
        put("correlation_id", text(&self.correlation_id));
        put("to", text(&self.to));
        put("reply_to", text(&self.reply_to));
        put("session_id", text(&self.session_id));
        put("partition_key", text(&self.partition_key));
        put("dead_letter_reason", text(&self.dead_letter_reason));
        put(
            "dead_letter_error_description",
            text(&self.dead_letter_error_description),
        );

        if !self.application_properties.is_empty() {
            let props = self
                .application_properties
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect::<Map<_, _>>();
            map.insert("application_properties".into(), Value::Object(props));
        }

        map
    }

    /// Body for display: text, pretty-printed when it is JSON, otherwise a
    /// `base64:` placeholder.
    pub fn render_body(&self) -> String {
        match &self.body {
            Body::Unreadable(reason) => format!("<error reading body: {reason}>"),
            Body::Bytes(bytes) => match std::str::from_utf8(bytes) {
                Ok(text) => match serde_json::from_str::<Value>(text) {
                    Ok(json) => {
                        serde_json::to_string_pretty(&json).unwrap_or_else(|_| text.to_string())
                    }
                    Err(_) => text.to_string(),
                },
                Err(_) => base64_placeholder(bytes),
            },
        }
    }

    /// Single JSON object holding the metadata and the body. JSON bodies are
    /// embedded as values, anything else as a string.
    pub fn to_json(&self) -> Value {
        let mut map = self.metadata();
        let body = match &self.body {
            Body::Bytes(bytes) => match std::str::from_utf8(bytes) {
                Ok(text) => serde_json::from_str::<Value>(text)
                    .unwrap_or_else(|_| Value::String(text.to_string())),
                Err(_) => Value::String(base64_placeholder(bytes)),
            },
            Body::Unreadable(_) => Value::String(self.render_body()),
        };
        map.insert("body".into(), body);
        Value::Object(map)
    }
}

pub(crate) fn base64_placeholder(bytes: &[u8]) -> String {
    format!(
        "base64:{}",
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}
