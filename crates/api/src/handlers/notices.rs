use axum::extract::{Query, State};
use axum::Json;
use repertoire_events::FeedEntry;
use serde::Deserialize;

use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct NoticeQuery {
    /// Only return notices after this sequence number.
    #[serde(default)]
    pub since: u64,
}

/// GET /api/v1/notices
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<NoticeQuery>,
) -> Json<DataResponse<Vec<FeedEntry>>> {
    let entries = state.notices.since(query.since).await;
    Json(DataResponse { data: entries })
}
