// Empathy operations: toggle and add-only

use tracing::info;

use crate::{error::ApiResult, models::ToggleOutcome, store::EneStore};

/// Adds the (message, user) mark when absent and removes it when present.
///
/// The existence check and the write are separate statements, so two
/// concurrent toggles for the same pair can both insert.
pub async fn toggle_empathy(store: &dyn EneStore, message_id: i64, userid: i64) -> ApiResult<ToggleOutcome> {
    let outcome = if store.has_empathy(message_id, userid).await? {
        ToggleOutcome::Removed(store.delete_empathy(message_id, userid).await?)
    } else {
        ToggleOutcome::Added(store.insert_empathy(message_id, userid).await?)
    };

    info!(
        "Toggled empathy of user {} on message {}: {:?}",
        userid, message_id, outcome
    );
    Ok(outcome)
}

/// Inserts the mark unconditionally.
pub async fn add_empathy(store: &dyn EneStore, message_id: i64, userid: i64) -> ApiResult<u64> {
    let affected = store.insert_empathy(message_id, userid).await?;
    info!("Added empathy of user {} on message {}", userid, message_id);
    Ok(affected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;
    use tokio_test::assert_ok;

    #[tokio::test]
    async fn test_toggle_is_an_involution() {
        let store = MemoryStore::new();

        let first = assert_ok!(toggle_empathy(&store, 5, 9).await);
        assert_eq!(first, ToggleOutcome::Added(1));
        assert_eq!(store.marks(), vec![(5, 9)]);

        let second = assert_ok!(toggle_empathy(&store, 5, 9).await);
        assert_eq!(second, ToggleOutcome::Removed(1));
        assert!(store.marks().is_empty());

        let third = assert_ok!(toggle_empathy(&store, 5, 9).await);
        assert_eq!(third, ToggleOutcome::Added(1));
        assert_eq!(store.marks(), vec![(5, 9)]);
    }

    #[tokio::test]
    async fn test_toggle_only_touches_the_exact_pair() {
        let store = MemoryStore::new().with_empathy(5, 8).with_empathy(6, 9);

        assert_ok!(toggle_empathy(&store, 5, 9).await);
        assert_ok!(toggle_empathy(&store, 5, 9).await);

        assert_eq!(store.marks(), vec![(5, 8), (6, 9)]);
    }

    #[tokio::test]
    async fn test_add_empathy_never_checks_existence() {
        let store = MemoryStore::new().with_empathy(5, 9);

        assert_eq!(assert_ok!(add_empathy(&store, 5, 9).await), 1);

        assert_eq!(store.reads(), 0);
        assert_eq!(store.marks(), vec![(5, 9), (5, 9)]);
    }
}
