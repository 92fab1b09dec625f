//! WebSocket message protocol
//!
//! Inbound frames are loosely typed JSON objects. Field values are kept as
//! raw JSON so an unexpected type in one field never rejects the frame.

use crate::assistant::QuotaSignal;
use crate::error::{Error, Result};
use serde::Deserialize;
use serde_json::{json, Value};

/// Welcome text sent once a connection opens
pub const WELCOME_MESSAGE: &str = "🌍 Benvenuto in Ares Travel! Come posso aiutarti?";

/// Error text for frames that are not JSON objects
pub const INVALID_FORMAT_MESSAGE: &str = "Formato messaggio non valido";

/// Placeholder used when a dest-click carries no destination
pub const DEFAULT_DEST: &str = "destinazione";

/// Inbound frame kind, from the `type` field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Ping,
    User,
    DestClick,
    /// Absent or unrecognised `type`
    Legacy,
}

/// Decoded inbound frame
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboundFrame {
    #[serde(rename = "type")]
    pub kind: Option<Value>,
    pub text: Option<Value>,
    pub t: Option<Value>,
    pub dest: Option<Value>,
}

impl InboundFrame {
    /// Parse raw text. Anything other than a JSON object is rejected.
    pub fn parse(raw: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(raw)?;
        if !value.is_object() {
            return Err(Error::Validation("frame is not a JSON object".to_string()));
        }
        Ok(serde_json::from_value(value)?)
    }

    pub fn kind(&self) -> FrameKind {
        match self.kind.as_ref().and_then(Value::as_str) {
            Some("ping") => FrameKind::Ping,
            Some("user") => FrameKind::User,
            Some("dest-click") => FrameKind::DestClick,
            _ => FrameKind::Legacy,
        }
    }

    /// Chat text, trimmed; `None` when absent, blank or not a string
    pub fn chat_text(&self) -> Option<&str> {
        self.text
            .as_ref()
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// Destination name for a dest-click
    pub fn dest_name(&self) -> String {
        match &self.dest {
            None | Some(Value::Null) => DEFAULT_DEST.to_string(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }
}

/// Text sent back for a destination click
pub fn dest_click_reply(dest: &str) -> String {
    format!(
        "Interessante scelta! {} è una destinazione fantastica. Vuoi che ti racconti di più sui viaggi disponibili?",
        dest
    )
}

/// Current wall clock in epoch milliseconds
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Server → client message
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundMessage {
    System(String),
    Pong(Value),
    Assistant(String),
    Legacy(String),
    Error(String),
    Ping { server_time: i64 },
    Quota(QuotaSignal),
}

impl OutboundMessage {
    /// Pong echoing `t`, or the current time when `t` is absent or null
    pub fn pong(t: Option<&Value>) -> Self {
        match t {
            Some(v) if !v.is_null() => Self::Pong(v.clone()),
            _ => Self::Pong(json!(now_ms())),
        }
    }

    pub fn keepalive() -> Self {
        Self::Ping {
            server_time: now_ms(),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Self::System(message) => json!({ "type": "system", "message": message }),
            Self::Pong(t) => json!({ "type": "pong", "t": t }),
            Self::Assistant(text) => json!({ "type": "assistant", "text": text }),
            Self::Legacy(message) => json!({ "message": message }),
            Self::Error(message) => json!({ "type": "error", "message": message }),
            Self::Ping { server_time } => json!({ "type": "ping", "server_time": server_time }),
            Self::Quota(signal) => json!(signal),
        }
    }

    pub fn to_text(&self) -> String {
        self.to_value().to_string()
    }
}
