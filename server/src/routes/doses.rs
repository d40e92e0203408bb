//! Routes for the dose entry log.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json as ResponseJson;
use axum::routing::post;
use axum::Router;
use onefarmer_core::{DoseEntry, NewDoseEntry};

use crate::error::ApiError;
use crate::state::AppState;

/// Record a dose event. The concentration calculator runs inline and
/// the derived mg/L map is stored on the entry.
pub async fn create_dose(
    State(state): State<AppState>,
    ResponseJson(req): ResponseJson<NewDoseEntry>,
) -> Result<(StatusCode, ResponseJson<DoseEntry>), ApiError> {
    let entry = state.doses.record_dose(req)?;
    tracing::info!(date = %entry.date, time = %entry.time, "Dose entry recorded");
    Ok((StatusCode::CREATED, ResponseJson(entry)))
}

pub async fn list_doses(
    State(state): State<AppState>,
) -> Result<ResponseJson<Vec<DoseEntry>>, ApiError> {
    let entries = state.doses.list_entries()?;
    Ok(ResponseJson(entries))
}

/// Full reset of the dose log. Unprotected, like the rest of the API.
pub async fn clear_doses(State(state): State<AppState>) -> Result<StatusCode, ApiError> {
    state.doses.clear_entries()?;
    tracing::info!("Dose log cleared");
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/doses",
        post(create_dose).get(list_doses).delete(clear_doses),
    )
}
