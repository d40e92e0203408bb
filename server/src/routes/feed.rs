//! Polling endpoint for the live sensor feed.

use axum::extract::State;
use axum::response::Json as ResponseJson;
use axum::routing::get;
use axum::Router;
use chrono::Utc;
use onefarmer_core::{CoreError, FeedSnapshot};

use crate::error::ApiError;
use crate::state::AppState;

/// Latest reading per metric plus the connection status flag. Each
/// poll doubles as the health check: a feed that has gone quiet past
/// the staleness window is downgraded before the snapshot is taken.
pub async fn get_feed(State(state): State<AppState>) -> Result<ResponseJson<FeedSnapshot>, ApiError> {
    let mut feed = state
        .feed
        .lock()
        .map_err(|_| CoreError::Other("feed state lock poisoned".into()))?;
    feed.check_staleness(state.stale_after, Utc::now());
    Ok(ResponseJson(feed.snapshot()))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/feed", get(get_feed))
}
