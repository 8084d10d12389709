// Add-only empathy handler
// POST on /messages/{cardid}/empathy

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::Method,
    response::Response,
};

use crate::{
    error::{ApiError, ApiResult},
    models::{
        envelope::{preflight, respond},
        parse_numeric_id, AddEmpathyRequest,
    },
    services::empathy,
    store::SharedStore,
};

use super::{parse_body, unsupported};

/// Dispatch table of this route
pub const METHODS: [Method; 1] = [Method::POST];

/// /messages/:cardid/empathy
pub async fn dispatch(
    State(store): State<SharedStore>,
    method: Method,
    Path(cardid): Path<String>,
    body: Bytes,
) -> Response {
    match method {
        Method::POST => respond(post_empathy(&store, &cardid, &body).await),
        Method::OPTIONS => preflight(&METHODS),
        other => unsupported(&other),
    }
}

/// Record that a user empathizes with a message
/// POST /messages/:cardid/empathy
async fn post_empathy(store: &SharedStore, cardid: &str, body: &[u8]) -> ApiResult<u64> {
    let request = parse_body::<AddEmpathyRequest>(body)?;
    let empathizer = request.validate().map_err(ApiError::Validation)?;
    let message_id =
        parse_numeric_id(cardid).ok_or_else(|| ApiError::validation("Message ID is invalid"))?;

    empathy::add_empathy(store.as_ref(), message_id, empathizer).await
}
