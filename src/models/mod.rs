// Models module

pub mod empathy;
pub mod envelope;
pub mod message;
pub mod user;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

// Re-export commonly used types
pub use empathy::{AddEmpathyRequest, TimelineToggleRequest, ToggleOutcome};
pub use envelope::Envelope;
pub use message::{
    CreateMessageRequest, CreatedMessage, MessageFilter, MessageRow, MessageView, NewMessage,
    TimelineEntry,
};
pub use user::User;

static NUMERIC_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+$").expect("valid id pattern"));

/// A plain digit run read from a path or query value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericId {
    Fits(i64),
    /// Too large for a BIGINT column, so it can never match a stored row.
    Overflow,
}

/// Classifies `raw`: `None` unless it is a plain digit run.
pub fn numeric_id(raw: &str) -> Option<NumericId> {
    if !NUMERIC_ID.is_match(raw) {
        return None;
    }
    Some(raw.parse().map(NumericId::Fits).unwrap_or(NumericId::Overflow))
}

/// Parses an identifier that must fit in `i64`; digit runs that overflow
/// are rejected along with everything else.
pub fn parse_numeric_id(raw: &str) -> Option<i64> {
    match numeric_id(raw) {
        Some(NumericId::Fits(id)) => Some(id),
        _ => None,
    }
}

/// Identifier as clients send it: either a JSON number or a string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Number(i64),
    Text(String),
}

impl RawId {
    pub fn as_text(&self) -> String {
        match self {
            RawId::Number(n) => n.to_string(),
            RawId::Text(s) => s.clone(),
        }
    }

    pub fn numeric(&self) -> Option<i64> {
        parse_numeric_id(&self.as_text())
    }
}

/// Top-level `{ "data": { ... } }` shape shared by every write request.
#[derive(Debug, Deserialize)]
pub struct RequestBody<T> {
    pub data: Option<T>,
}

impl<T: serde::de::DeserializeOwned> RequestBody<T> {
    /// Extracts the `data` payload, rejecting empty or malformed bodies.
    pub fn parse(body: &[u8]) -> Result<T, String> {
        serde_json::from_slice::<RequestBody<T>>(body)
            .ok()
            .and_then(|body| body.data)
            .ok_or_else(|| "Malformed request body".to_string())
    }
}
