// Message handlers
// GET / POST / DELETE on /messages[/{cardid}]

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::Method,
    response::Response,
};
use chrono::Utc;
use std::collections::HashMap;

use crate::{
    error::{ApiError, ApiResult},
    models::{
        envelope::{preflight, respond},
        numeric_id, AddEmpathyRequest, CreateMessageRequest, MessageFilter, MessageView, NumericId,
    },
    services::{empathy, messages},
    store::SharedStore,
};

use super::{parse_body, query_params, unsupported, QueryParams};

/// Dispatch table of this route
pub const METHODS: [Method; 3] = [Method::GET, Method::POST, Method::DELETE];

/// Query parameters for listing messages
#[derive(Debug, Default)]
pub struct MessageQuery {
    pub sender_id: Option<String>,
    pub receiver_id: Option<String>,
}

impl MessageQuery {
    fn from_params(mut params: HashMap<String, String>) -> Self {
        MessageQuery {
            sender_id: params.remove("senderId"),
            receiver_id: params.remove("receiverId"),
        }
    }
}

/// /messages and /messages/:cardid
pub async fn dispatch(
    State(store): State<SharedStore>,
    method: Method,
    cardid: Option<Path<String>>,
    query: QueryParams,
    body: Bytes,
) -> Response {
    let cardid = cardid.map(|Path(id)| id);
    let query = MessageQuery::from_params(query_params(query));

    match method {
        Method::GET => respond(get_messages(&store, cardid.as_deref(), &query).await),
        Method::POST => respond(post_message(&store, cardid.as_deref(), &body).await),
        Method::DELETE => respond(delete_message(&store, cardid.as_deref()).await),
        Method::OPTIONS => preflight(&METHODS),
        other => unsupported(&other),
    }
}

/// List messages, narrowed by card id, sender or receiver
/// GET /messages/:cardid?senderId=&receiverId=
async fn get_messages(
    store: &SharedStore,
    cardid: Option<&str>,
    query: &MessageQuery,
) -> ApiResult<Vec<MessageView>> {
    let filter = MessageFilter::resolve(
        cardid,
        query.sender_id.as_deref(),
        query.receiver_id.as_deref(),
    );
    messages::list_messages(store.as_ref(), filter).await
}

/// Create a message, or toggle empathy when a numeric card id is present
/// POST /messages
/// POST /messages/:cardid
async fn post_message(
    store: &SharedStore,
    cardid: Option<&str>,
    body: &[u8],
) -> ApiResult<serde_json::Value> {
    if let Some(id) = cardid.and_then(numeric_id) {
        let NumericId::Fits(message_id) = id else {
            return Err(ApiError::validation("Message ID is invalid"));
        };
        let request = parse_body::<AddEmpathyRequest>(body)?;
        let empathizer = request.validate().map_err(ApiError::Validation)?;
        let outcome = empathy::toggle_empathy(store.as_ref(), message_id, empathizer).await?;
        return Ok(serde_json::Value::from(outcome.affected()));
    }

    let request = parse_body::<CreateMessageRequest>(body)?;
    let created = messages::create_message(store.as_ref(), request, Utc::now()).await?;
    serde_json::to_value(created).map_err(|e| ApiError::Internal(e.into()))
}

/// Delete a message
/// DELETE /messages/:cardid
async fn delete_message(store: &SharedStore, cardid: Option<&str>) -> ApiResult<u64> {
    match cardid.and_then(numeric_id) {
        Some(NumericId::Fits(id)) => messages::delete_message(store.as_ref(), id).await,
        // No stored row can carry an id this large
        Some(NumericId::Overflow) => Ok(0),
        None => Err(ApiError::validation("Message ID is invalid")),
    }
}
