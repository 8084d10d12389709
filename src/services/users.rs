// User read operations

use tracing::info;

use crate::{
    error::{ApiError, ApiResult},
    models::{numeric_id, NumericId, User},
    store::EneStore,
};

/// Fetches one user when `userid` is numeric, otherwise every user.
/// Both paths answer with a list so clients handle a single shape.
pub async fn get_users(store: &dyn EneStore, userid: Option<&str>) -> ApiResult<Vec<User>> {
    match userid.and_then(numeric_id) {
        Some(NumericId::Overflow) => Err(ApiError::not_found("User not found")),
        Some(NumericId::Fits(id)) => {
            info!("Fetching user with id: {}", id);
            let user = store
                .find_user(id)
                .await?
                .ok_or_else(|| ApiError::not_found("User not found"))?;
            Ok(vec![user])
        }
        None => {
            info!("Fetching all users");
            let users = store.list_users().await?;
            info!("Retrieved {} users", users.len());
            Ok(users)
        }
    }
}
