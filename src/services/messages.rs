// Message operations: list, create, delete

use chrono::{DateTime, Utc};
use tracing::info;

use crate::{
    enrich::{enrich_messages, lookup_user},
    error::{ApiError, ApiResult},
    models::{CreateMessageRequest, CreatedMessage, MessageFilter, MessageView},
    store::EneStore,
};

/// Lists messages for `filter` with sender, receiver and empathizers expanded.
///
/// A lookup by message id that matches nothing is an error; every other
/// filter returns an empty list instead.
pub async fn list_messages(store: &dyn EneStore, filter: MessageFilter) -> ApiResult<Vec<MessageView>> {
    info!("Listing messages with filter: {:?}", filter);

    let rows = match filter {
        MessageFilter::OutOfRange { .. } => Vec::new(),
        _ => store.list_messages(filter).await?,
    };
    if rows.is_empty() && filter.requires_match() {
        return Err(ApiError::not_found("No messages found"));
    }

    let views = enrich_messages(store, rows).await?;
    info!("Retrieved {} messages", views.len());
    Ok(views)
}

/// Validates and stores a new message stamped with `now`, then reads it back.
pub async fn create_message(
    store: &dyn EneStore,
    request: CreateMessageRequest,
    now: DateTime<Utc>,
) -> ApiResult<CreatedMessage> {
    let message = request.into_new_message(now).map_err(ApiError::Validation)?;
    info!(
        "Creating message from user {} to user {}",
        message.sender, message.receiver
    );

    let id = store.insert_message(&message).await?;

    let row = store
        .list_messages(MessageFilter::ById(id))
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::not_found(format!("Message {} disappeared after insert", id)))?;

    let sender = lookup_user(store, row.sender).await?;
    let receiver = lookup_user(store, row.receiver).await?;

    info!("Created message with id: {}", row.id);
    Ok(CreatedMessage {
        id: row.id,
        contents: row.contents,
        sender,
        receiver,
        datetime: row.datetime,
        empathy_user_ids: Vec::new(),
    })
}

/// Deletes by id without checking existence. Empathy marks are left alone.
pub async fn delete_message(store: &dyn EneStore, id: i64) -> ApiResult<u64> {
    let affected = store.delete_message(id).await?;
    info!("Deleted message {} ({} rows affected)", id, affected);
    Ok(affected)
}
