// Store module
// The persistence seam every operation goes through

#[cfg(test)]
pub mod memory;

use async_trait::async_trait;
use std::sync::Arc;

use crate::{
    error::ApiResult,
    models::{MessageFilter, MessageRow, NewMessage, User},
};

/// Relational store holding users, messages and empathy marks.
///
/// Each method is one round trip and commits on its own. No method spans a
/// transaction, so a check followed by a write can race with another request.
#[async_trait]
pub trait EneStore: Send + Sync {
    /// Cheap connectivity check.
    async fn ping(&self) -> ApiResult<()>;

    async fn list_messages(&self, filter: MessageFilter) -> ApiResult<Vec<MessageRow>>;

    /// Persists a message and returns the store-assigned id.
    async fn insert_message(&self, message: &NewMessage) -> ApiResult<i64>;

    /// Returns the number of rows removed.
    async fn delete_message(&self, id: i64) -> ApiResult<u64>;

    async fn find_user(&self, userid: i64) -> ApiResult<Option<User>>;

    async fn list_users(&self) -> ApiResult<Vec<User>>;

    /// User ids holding a mark on the message, in insertion order.
    async fn empathizers(&self, message_id: i64) -> ApiResult<Vec<i64>>;

    async fn has_empathy(&self, message_id: i64, userid: i64) -> ApiResult<bool>;

    async fn count_empathy(&self, message_id: i64) -> ApiResult<i64>;

    async fn insert_empathy(&self, message_id: i64, userid: i64) -> ApiResult<u64>;

    async fn delete_empathy(&self, message_id: i64, userid: i64) -> ApiResult<u64>;
}

/// Handle shared by all requests for the life of the process.
pub type SharedStore = Arc<dyn EneStore>;
