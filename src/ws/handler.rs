//! Axum WebSocket upgrade handler.

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use serde::Deserialize;

use super::connection::{ConnectionSettings, run_connection};
use crate::app_state::AppState;
use crate::domain::{ClientId, validate_room_name};
use crate::error::HubError;

/// Query parameters accepted by `GET /ws`.
#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    /// Room to join. Required.
    pub room: Option<String>,
    /// Client identity. A UUID is generated when absent or blank.
    #[serde(rename = "clientId")]
    pub client_id: Option<String>,
}

/// `GET /ws?room=<name>&clientId=<id>` — Upgrade HTTP connection to
/// WebSocket and join `room`.
///
/// # Errors
///
/// Returns [`HubError::InvalidRoom`] if `room` is missing, blank, or too long.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<ConnectQuery>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, HubError> {
    let room = validate_room_name(params.room.as_deref().unwrap_or_default())?;
    let client_id = params
        .client_id
        .filter(|id| !id.trim().is_empty())
        .map_or_else(ClientId::generate, ClientId::from);
    let settings = ConnectionSettings::from(state.config.as_ref());
    let hub = state.hub.clone();

    tracing::debug!(%room, %client_id, "upgrading ws connection");
    Ok(ws
        .max_message_size(state.config.max_message_bytes)
        .on_upgrade(move |socket| run_connection(socket, hub, client_id, room, settings)))
}
