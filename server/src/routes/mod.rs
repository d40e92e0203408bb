pub mod doses;
pub mod feed;
pub mod formulations;

use axum::response::Json as ResponseJson;
use axum::routing::get;
use axum::Router;
use serde_json::json;

use crate::state::AppState;

async fn health() -> ResponseJson<serde_json::Value> {
    ResponseJson(json!({ "status": "ok" }))
}

pub fn api_router() -> Router<AppState> {
    Router::new().nest(
        "/api",
        Router::new()
            .route("/health", get(health))
            .merge(doses::router())
            .merge(feed::router())
            .merge(formulations::router()),
    )
}
