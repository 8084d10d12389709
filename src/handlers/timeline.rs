// Timeline handlers
// GET / POST / PUT on /timeline

use axum::{
    body::Bytes,
    extract::State,
    http::Method,
    response::Response,
};
use chrono::Utc;

use crate::{
    error::{ApiError, ApiResult},
    models::{
        envelope::{preflight, respond},
        CreateMessageRequest, CreatedMessage, TimelineToggleRequest,
    },
    services::{empathy, messages, timeline},
    store::SharedStore,
};

use super::{parse_body, query_params, unsupported, QueryParams};

/// Dispatch table of this route
pub const METHODS: [Method; 3] = [Method::GET, Method::POST, Method::PUT];

/// /timeline
pub async fn dispatch(
    State(store): State<SharedStore>,
    method: Method,
    query: QueryParams,
    body: Bytes,
) -> Response {
    // Viewer whose empathy flags are reported
    let viewer = query_params(query).remove("userid");

    match method {
        Method::GET => respond(timeline::list_timeline(store.as_ref(), viewer.as_deref()).await),
        Method::POST => respond(post_message(&store, &body).await),
        Method::PUT => respond(put_empathy(&store, &body).await),
        Method::OPTIONS => preflight(&METHODS),
        other => unsupported(&other),
    }
}

/// Post a new message from the timeline view
/// POST /timeline
async fn post_message(store: &SharedStore, body: &[u8]) -> ApiResult<CreatedMessage> {
    let request = parse_body::<CreateMessageRequest>(body)?;
    messages::create_message(store.as_ref(), request, Utc::now()).await
}

/// Toggle the viewer's empathy on a message
/// PUT /timeline
async fn put_empathy(store: &SharedStore, body: &[u8]) -> ApiResult<u64> {
    let request = parse_body::<TimelineToggleRequest>(body)?;
    let (message_id, empathizer) = request.validate().map_err(ApiError::Validation)?;
    let outcome = empathy::toggle_empathy(store.as_ref(), message_id, empathizer).await?;
    Ok(outcome.affected())
}
