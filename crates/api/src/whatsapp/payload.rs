//! Inbound webhook payloads
//!
//! Meta nests the message four levels deep
//! (`entry[0].changes[0].value.messages[0]`) and omits levels freely, e.g.
//! delivery-status callbacks carry no `messages` at all. Extraction is
//! therefore best-effort: every missing level is a [`PayloadError`] the
//! caller logs and acknowledges instead of failing the request. Only that
//! one path is read; sibling entries and changes may have any shape.

use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("Unexpected payload shape: {0}")]
    Shape(#[from] serde_json::Error),

    #[error("Payload has no entry")]
    NoEntry,

    #[error("Entry has no changes")]
    NoChange,

    #[error("Change carries no messages")]
    NoMessage,

    #[error("Message has no sender")]
    MissingSender,
}

#[derive(Debug, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub text: Option<TextBody>,
}

#[derive(Debug, Deserialize)]
pub struct TextBody {
    #[serde(default)]
    pub body: Option<String>,
}

/// Sender and text of the first message in a webhook delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub from: String,
    pub text: String,
}

impl InboundMessage {
    /// Extract the first message of the first change of the first entry.
    ///
    /// Non-text messages (images, stickers, ...) yield empty text.
    pub fn from_value(value: Value) -> Result<Self, PayloadError> {
        let entry = value.pointer("/entry/0").ok_or(PayloadError::NoEntry)?;
        let change = entry.pointer("/changes/0").ok_or(PayloadError::NoChange)?;
        let message = change
            .pointer("/value/messages/0")
            .ok_or(PayloadError::NoMessage)?;
        let message = Message::deserialize(message)?;

        let from = message
            .from
            .filter(|f| !f.is_empty())
            .ok_or(PayloadError::MissingSender)?;
        let text = message.text.and_then(|t| t.body).unwrap_or_default();

        Ok(Self { from, text })
    }
}

/// `field` of every change in a delivery, for the generic receipt log.
pub fn change_fields(value: &Value) -> Vec<String> {
    value
        .get("entry")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|entry| entry.get("changes").and_then(Value::as_array))
        .flatten()
        .map(|change| {
            change
                .get("field")
                .and_then(Value::as_str)
                .unwrap_or("unknown")
                .to_string()
        })
        .collect()
}
