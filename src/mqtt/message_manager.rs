use chrono::{DateTime, Local};
use rumqttc::Publish;
use serde_json::Value;
use std::fmt;
use thiserror::Error;
use tokio::sync::mpsc;

/// Why a payload could not be turned into headers.
#[derive(Debug, Error)]
pub enum HeaderCodecError {
    #[error("payload is not JSON: {0}")]
    NotJson(#[from] serde_json::Error),

    #[error("payload is a JSON {0}, expected an object of headers")]
    NotAnObject(&'static str),
}

/// One notification as delivered by the broker.
///
/// The publisher sends the notification headers as a flat JSON object, e.g.
/// `{"NotificationNodeId":"5","NotificationType":"2","HomeID":"184e1a2","ValueID":"100420003"}`.
/// Header order is kept as received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationMessage {
    pub topic: String,
    pub headers: Vec<(String, String)>,
    pub timestamp: DateTime<Local>,
}

impl fmt::Display for NotificationMessage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} - {} ({} headers)",
            self.timestamp.format("%H:%M:%S"),
            self.topic,
            self.headers.len()
        )
    }
}

impl NotificationMessage {
    pub fn new(topic: impl Into<String>, headers: Vec<(String, String)>) -> Self {
        NotificationMessage {
            topic: topic.into(),
            headers,
            timestamp: Local::now(),
        }
    }

    pub fn from_payload(topic: impl Into<String>, payload: &[u8]) -> Result<Self, HeaderCodecError> {
        Ok(Self::new(topic, decode_headers(payload)?))
    }

    pub fn from_publish(publish: &Publish) -> Result<Self, HeaderCodecError> {
        Self::from_payload(publish.topic.clone(), &publish.payload)
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }
}

/// Decodes the JSON header object. An empty payload carries no headers.
pub fn decode_headers(payload: &[u8]) -> Result<Vec<(String, String)>, HeaderCodecError> {
    if payload.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    match serde_json::from_slice::<Value>(payload)? {
        Value::Object(map) => Ok(map
            .into_iter()
            .map(|(key, value)| {
                let value = match value {
                    Value::String(text) => text,
                    other => other.to_string(),
                };
                (key, value)
            })
            .collect()),
        Value::Array(_) => Err(HeaderCodecError::NotAnObject("array")),
        Value::String(_) => Err(HeaderCodecError::NotAnObject("string")),
        Value::Number(_) => Err(HeaderCodecError::NotAnObject("number")),
        Value::Bool(_) => Err(HeaderCodecError::NotAnObject("bool")),
        Value::Null => Err(HeaderCodecError::NotAnObject("null")),
    }
}

/// Outbound side of the handler: decoded messages go to the display loop.
pub struct MsgManager {
    pub received_msg: mpsc::Sender<NotificationMessage>,
}
