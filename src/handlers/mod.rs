// Handlers module
// HTTP dispatchers for the REST API

pub mod empathy;
pub mod messages;
pub mod timeline;
pub mod users;

use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get},
    Router,
};
use serde::de::DeserializeOwned;

use crate::{
    error::{ApiError, ApiResult},
    models::{envelope::respond, RequestBody},
    store::SharedStore,
};

/// Create the router with every endpoint sharing one store handle
pub fn create_router(store: SharedStore) -> Router {
    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        // Message endpoints
        .route("/messages", any(messages::dispatch))
        .route("/messages/:cardid", any(messages::dispatch))
        .route("/messages/:cardid/empathy", any(empathy::dispatch))
        // User endpoints
        .route("/users", any(users::dispatch))
        .route("/users/:userid", any(users::dispatch))
        // Timeline endpoint
        .route("/timeline", any(timeline::dispatch))
        .with_state(store)
}

/// Health check handler
/// Returns "OK" with 200 status when the store answers
pub async fn health_check(State(store): State<SharedStore>) -> impl IntoResponse {
    match store.ping().await {
        Ok(()) => (StatusCode::OK, "OK"),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "UNAVAILABLE")
        }
    }
}

fn unsupported(method: &Method) -> Response {
    respond::<()>(Err(ApiError::UnsupportedMethod(method.to_string())))
}

/// Query string as loose key/value pairs. A repeated key keeps its last
/// value and an unreadable query string counts as empty, so filters are
/// never a reason to reject the request.
type QueryParams = Option<Query<HashMap<String, String>>>;

fn query_params(query: QueryParams) -> HashMap<String, String> {
    query.map(|Query(params)| params).unwrap_or_default()
}

fn parse_body<T: DeserializeOwned>(body: &[u8]) -> ApiResult<T> {
    RequestBody::<T>::parse(body).map_err(ApiError::Validation)
}
