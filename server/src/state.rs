use chrono::Duration;
use onefarmer_core::{DoseService, FeedState, FileDoseEntryRepository};
use std::sync::{Arc, Mutex};

/// Everything a request handler needs, created once at startup and
/// cloned per request. The feed state is shared with the MQTT task.
#[derive(Clone)]
pub struct AppState {
    pub doses: Arc<DoseService<FileDoseEntryRepository>>,
    pub feed: Arc<Mutex<FeedState>>,
    pub stale_after: Duration,
}
