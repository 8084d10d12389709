use serde::Deserialize;

use super::RawId;

/// Body of `POST /messages/{id}` and `POST /messages/{id}/empathy`.
#[derive(Debug, Deserialize)]
pub struct AddEmpathyRequest {
    pub empathizerid: Option<RawId>,
}

impl AddEmpathyRequest {
    /// Returns the empathizer's user id.
    pub fn validate(&self) -> Result<i64, String> {
        validate_empathizer(self.empathizerid.as_ref())
    }
}

/// Body of `PUT /timeline`: the message id travels in the payload.
#[derive(Debug, Deserialize)]
pub struct TimelineToggleRequest {
    pub id: Option<RawId>,
    pub userid: Option<RawId>,
}

impl TimelineToggleRequest {
    /// Returns `(message_id, empathizer_id)`.
    pub fn validate(&self) -> Result<(i64, i64), String> {
        let message_id = self
            .id
            .as_ref()
            .and_then(RawId::numeric)
            .ok_or_else(|| "Message ID is invalid".to_string())?;
        let empathizer = validate_empathizer(self.userid.as_ref())?;
        Ok((message_id, empathizer))
    }
}

fn validate_empathizer(raw: Option<&RawId>) -> Result<i64, String> {
    let text = raw.map(RawId::as_text).unwrap_or_default();
    if text.trim().is_empty() {
        return Err("Empathizer ID cannot be empty".to_string());
    }

    // Marks reference users by their integer id.
    super::parse_numeric_id(text.trim()).ok_or_else(|| "Empathizer ID is invalid".to_string())
}

/// What a toggle did to the (message, user) mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Added(u64),
    Removed(u64),
}

impl ToggleOutcome {
    pub fn affected(&self) -> u64 {
        match self {
            ToggleOutcome::Added(n) | ToggleOutcome::Removed(n) => *n,
        }
    }
}
