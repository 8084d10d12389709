// Enrichment
// Replaces id columns on message rows with the records they point at.
//
// Lookups run one round trip at a time (two user reads per row, plus the
// empathy reads). Callers only see `enrich_*`, so a batched join can replace
// this without touching the operations.

use tracing::{debug, warn};

use crate::{
    error::ApiResult,
    models::{MessageRow, MessageView, TimelineEntry, User},
    store::EneStore,
};

/// Fetches a user record, logging instead of failing when it is missing.
pub async fn lookup_user(store: &dyn EneStore, userid: i64) -> ApiResult<Option<User>> {
    let user = store.find_user(userid).await?;
    if user.is_none() {
        warn!("Message references unknown user id: {}", userid);
    }
    Ok(user)
}

/// Listing shape: profiles for sender and receiver plus every empathizing user.
pub async fn enrich_messages(store: &dyn EneStore, rows: Vec<MessageRow>) -> ApiResult<Vec<MessageView>> {
    let mut views = Vec::with_capacity(rows.len());

    for row in rows {
        let sender = lookup_user(store, row.sender).await?;
        let receiver = lookup_user(store, row.receiver).await?;

        let mut empathy_users = Vec::new();
        for userid in store.empathizers(row.id).await? {
            if let Some(user) = lookup_user(store, userid).await? {
                empathy_users.push(user);
            }
        }

        debug!(
            message_id = row.id,
            empathizers = empathy_users.len(),
            "Enriched message"
        );

        views.push(MessageView {
            id: row.id,
            contents: row.contents,
            sender,
            receiver,
            datetime: row.datetime,
            empathy_users,
        });
    }

    Ok(views)
}

/// Timeline shape: profiles plus whether `viewer` empathized and the total count.
/// Without a viewer every `has_empathized` is false and no per-viewer query runs.
pub async fn enrich_timeline(
    store: &dyn EneStore,
    rows: Vec<MessageRow>,
    viewer: Option<i64>,
) -> ApiResult<Vec<TimelineEntry>> {
    let mut entries = Vec::with_capacity(rows.len());

    for row in rows {
        let sender = lookup_user(store, row.sender).await?;
        let receiver = lookup_user(store, row.receiver).await?;

        let has_empathized = match viewer {
            Some(userid) => store.has_empathy(row.id, userid).await?,
            None => false,
        };
        let empathy_count = store.count_empathy(row.id).await?;

        entries.push(TimelineEntry {
            id: row.id,
            contents: row.contents,
            sender,
            receiver,
            datetime: row.datetime,
            has_empathized,
            empathy_count,
        });
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;
    use tokio_test::assert_ok;

    fn row(id: i64, sender: i64, receiver: i64) -> MessageRow {
        MessageRow {
            id,
            contents: "hi".to_string(),
            sender,
            receiver,
            datetime: "20240101090000".to_string(),
        }
    }

    #[tokio::test]
    async fn test_enrichment_replaces_ids_and_preserves_fields() {
        let store = MemoryStore::new().with_user(10, "Sato").with_user(20, "Suzuki");

        let views = assert_ok!(enrich_messages(&store, vec![row(1, 10, 20)]).await);

        assert_eq!(views.len(), 1);
        let view = &views[0];
        assert_eq!(view.id, 1);
        assert_eq!(view.contents, "hi");
        assert_eq!(view.datetime, "20240101090000");
        assert_eq!(view.sender.as_ref().map(|u| u.name.as_str()), Some("Sato"));
        assert_eq!(view.receiver.as_ref().map(|u| u.userid), Some(20));
        assert!(view.empathy_users.is_empty());
    }

    #[tokio::test]
    async fn test_enrichment_lists_empathizing_users() {
        let store = MemoryStore::new()
            .with_user(10, "Sato")
            .with_user(20, "Suzuki")
            .with_user(30, "Tanaka")
            .with_empathy(1, 30)
            .with_empathy(1, 20)
            .with_empathy(2, 10);

        let views = assert_ok!(enrich_messages(&store, vec![row(1, 10, 20)]).await);

        let names: Vec<&str> = views[0].empathy_users.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["Tanaka", "Suzuki"]);
    }

    #[tokio::test]
    async fn test_enrichment_tolerates_unknown_users() {
        let store = MemoryStore::new().with_user(10, "Sato").with_empathy(1, 99);

        let views = assert_ok!(enrich_messages(&store, vec![row(1, 10, 77)]).await);

        assert!(views[0].sender.is_some());
        assert!(views[0].receiver.is_none());
        assert!(views[0].empathy_users.is_empty());
    }

    #[tokio::test]
    async fn test_enrichment_issues_one_lookup_per_field() {
        let store = MemoryStore::new().with_user(10, "Sato").with_user(20, "Suzuki");

        assert_ok!(enrich_messages(&store, vec![row(1, 10, 20), row(2, 20, 10)]).await);

        // sender + receiver + empathizers for each row
        assert_eq!(store.reads(), 6);
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn test_timeline_summarizes_empathy_for_viewer() {
        let store = MemoryStore::new()
            .with_user(10, "Sato")
            .with_user(20, "Suzuki")
            .with_empathy(1, 20)
            .with_empathy(1, 30);

        let entries = assert_ok!(enrich_timeline(&store, vec![row(1, 10, 20), row(2, 20, 10)], Some(20)).await);

        assert!(entries[0].has_empathized);
        assert_eq!(entries[0].empathy_count, 2);
        assert!(!entries[1].has_empathized);
        assert_eq!(entries[1].empathy_count, 0);
        assert_eq!(entries[1].sender.as_ref().map(|u| u.userid), Some(20));
    }

    #[tokio::test]
    async fn test_timeline_without_viewer() {
        let store = MemoryStore::new().with_empathy(1, 20);

        let entries = assert_ok!(enrich_timeline(&store, vec![row(1, 10, 20)], None).await);

        assert!(!entries[0].has_empathized);
        assert_eq!(entries[0].empathy_count, 1);
    }
}
