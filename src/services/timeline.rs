// Timeline listing

use tracing::info;

use crate::{
    enrich::enrich_timeline,
    error::ApiResult,
    models::{parse_numeric_id, MessageFilter, TimelineEntry},
    store::EneStore,
};

/// Most recent messages with the viewer's empathy flag and the total count.
pub async fn list_timeline(store: &dyn EneStore, viewer: Option<&str>) -> ApiResult<Vec<TimelineEntry>> {
    let viewer = viewer.and_then(parse_numeric_id);
    info!("Building timeline for viewer: {:?}", viewer);

    let rows = store.list_messages(MessageFilter::Recent).await?;
    let entries = enrich_timeline(store, rows, viewer).await?;

    info!("Timeline contains {} messages", entries.len());
    Ok(entries)
}
