//! Hub statistics endpoint.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::app_state::AppState;
use crate::error::{ErrorResponse, HubError};
use crate::hub::HubStats;

/// `GET /stats` — Hub delivery counters.
///
/// # Errors
///
/// Returns [`HubError::HubUnavailable`] if the hub loop has stopped.
#[utoipa::path(
    get,
    path = "/api/v1/stats",
    tag = "System",
    summary = "Hub statistics",
    description = "Registration, delivery, and drop counters since start.",
    responses(
        (status = 200, description = "Counters", body = HubStats),
        (status = 503, description = "Hub is not running", body = ErrorResponse),
    )
)]
pub async fn stats_handler(State(state): State<AppState>) -> Result<impl IntoResponse, HubError> {
    let stats = state.hub.stats().await?;
    Ok((StatusCode::OK, Json(stats)))
}

/// Stats routes, mounted under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new().route("/stats", get(stats_handler))
}
