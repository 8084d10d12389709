use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{numeric_id, NumericId, RawId, User};

/// Upper bound on rows returned by the sender, receiver and recent listings.
pub const RECENT_LIMIT: i64 = 100;

/// Format of the creation stamp. Fixed width, so text order equals time order.
pub const DATETIME_FORMAT: &str = "%Y%m%d%H%M%S";

/// A gratitude message exactly as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageRow {
    pub id: i64,
    pub contents: String,
    pub sender: i64,
    pub receiver: i64,
    pub datetime: String,
}

/// Validated insert payload; the store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMessage {
    pub contents: String,
    pub sender: i64,
    pub receiver: i64,
    pub datetime: String,
}

/// Request structure for posting a new message
#[derive(Debug, Deserialize)]
pub struct CreateMessageRequest {
    pub contents: Option<String>,
    #[serde(alias = "sender")]
    pub senderid: Option<RawId>,
    #[serde(alias = "receiver", alias = "reciever")]
    pub receiverid: Option<RawId>,
}

impl CreateMessageRequest {
    /// Checks contents, receiver and sender in that order and stamps the
    /// message with `now`. Nothing here touches the store.
    pub fn into_new_message(self, now: DateTime<Utc>) -> Result<NewMessage, String> {
        let contents = self.contents.unwrap_or_default();
        if contents.trim().is_empty() {
            return Err("Message contents cannot be empty".to_string());
        }

        let receiver = self
            .receiverid
            .as_ref()
            .and_then(RawId::numeric)
            .ok_or_else(|| "Receiver ID is invalid".to_string())?;

        let sender = self
            .senderid
            .as_ref()
            .and_then(RawId::numeric)
            .ok_or_else(|| "Sender ID is invalid".to_string())?;

        Ok(NewMessage {
            contents,
            sender,
            receiver,
            datetime: creation_stamp(now),
        })
    }
}

pub fn creation_stamp(now: DateTime<Utc>) -> String {
    now.format(DATETIME_FORMAT).to_string()
}

/// Which slice of messages a listing asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageFilter {
    ById(i64),
    BySender(i64),
    ByReceiver(i64),
    /// An id, sender or receiver key too large to match any row.
    OutOfRange { by_id: bool },
    Recent,
}

impl MessageFilter {
    /// Picks the first usable filter in priority order: message id, sender,
    /// receiver. Values that are not plain digits are ignored; digit runs
    /// too large for `i64` still select their filter.
    pub fn resolve(cardid: Option<&str>, sender: Option<&str>, receiver: Option<&str>) -> Self {
        if let Some(id) = cardid.and_then(numeric_id) {
            Self::keyed(id, true, MessageFilter::ById)
        } else if let Some(id) = sender.and_then(numeric_id) {
            Self::keyed(id, false, MessageFilter::BySender)
        } else if let Some(id) = receiver.and_then(numeric_id) {
            Self::keyed(id, false, MessageFilter::ByReceiver)
        } else {
            MessageFilter::Recent
        }
    }

    fn keyed(id: NumericId, by_id: bool, filter: fn(i64) -> MessageFilter) -> Self {
        match id {
            NumericId::Fits(id) => filter(id),
            NumericId::Overflow => MessageFilter::OutOfRange { by_id },
        }
    }

    /// Only a lookup by message id treats an empty result as an error.
    pub fn requires_match(&self) -> bool {
        matches!(
            self,
            MessageFilter::ById(_) | MessageFilter::OutOfRange { by_id: true }
        )
    }
}

/// Listing view: user ids replaced with profiles, plus everyone who
/// empathized with the message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageView {
    pub id: i64,
    pub contents: String,
    pub sender: Option<User>,
    pub receiver: Option<User>,
    pub datetime: String,
    #[serde(rename = "empathyUsers")]
    pub empathy_users: Vec<User>,
}

/// Response for a freshly posted message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatedMessage {
    pub id: i64,
    pub contents: String,
    pub sender: Option<User>,
    pub receiver: Option<User>,
    pub datetime: String,
    #[serde(rename = "empathyUserIds")]
    pub empathy_user_ids: Vec<i64>,
}

/// Timeline view: empathy reduced to a flag for the viewer and a total.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry {
    pub id: i64,
    pub contents: String,
    pub sender: Option<User>,
    pub receiver: Option<User>,
    pub datetime: String,
    pub has_empathized: bool,
    pub empathy_count: i64,
}
