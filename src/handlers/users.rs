// User handlers
// GET on /users[/{userid}]

use axum::{
    extract::{Path, State},
    http::Method,
    response::Response,
};

use crate::{
    models::envelope::{preflight, respond},
    services::users,
    store::SharedStore,
};

use super::unsupported;

/// Dispatch table of this route
pub const METHODS: [Method; 1] = [Method::GET];

/// Get one user, or all users when the id is absent or not numeric
/// GET /users
/// GET /users/:userid
pub async fn dispatch(
    State(store): State<SharedStore>,
    method: Method,
    userid: Option<Path<String>>,
) -> Response {
    let userid = userid.map(|Path(id)| id);

    match method {
        Method::GET => respond(users::get_users(store.as_ref(), userid.as_deref()).await),
        Method::OPTIONS => preflight(&METHODS),
        other => unsupported(&other),
    }
}
