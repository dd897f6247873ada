//! Room handlers: list, inspect, and publish into a room.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{
    PublishRequest, PublishResponse, RoomDetailResponse, RoomListResponse, RoomSummaryDto,
};
use crate::app_state::AppState;
use crate::domain::{MessageType, validate_room_name};
use crate::error::{ErrorResponse, HubError};

/// `GET /rooms` — List every room the hub has seen.
///
/// # Errors
///
/// Returns [`HubError::HubUnavailable`] if the hub loop has stopped.
#[utoipa::path(
    get,
    path = "/api/v1/rooms",
    tag = "Rooms",
    summary = "List rooms",
    description = "Returns every room created since start, including rooms whose members have all left.",
    responses(
        (status = 200, description = "Room list", body = RoomListResponse),
        (status = 503, description = "Hub is not running", body = ErrorResponse),
    )
)]
pub async fn list_rooms(State(state): State<AppState>) -> Result<impl IntoResponse, HubError> {
    let rooms: Vec<RoomSummaryDto> = state
        .hub
        .rooms()
        .await?
        .into_iter()
        .map(RoomSummaryDto::from)
        .collect();
    let total = rooms.len();
    Ok((StatusCode::OK, Json(RoomListResponse { rooms, total })))
}

/// `GET /rooms/{room}` — Current members of one room.
///
/// # Errors
///
/// Returns [`HubError::RoomNotFound`] if the room was never joined.
#[utoipa::path(
    get,
    path = "/api/v1/rooms/{room}",
    tag = "Rooms",
    summary = "Get room",
    description = "Returns the member list of a room.",
    params(("room" = String, Path, description = "Room name")),
    responses(
        (status = 200, description = "Room detail", body = RoomDetailResponse),
        (status = 400, description = "Invalid room name", body = ErrorResponse),
        (status = 404, description = "Room not found", body = ErrorResponse),
    )
)]
pub async fn get_room(
    State(state): State<AppState>,
    Path(room): Path<String>,
) -> Result<impl IntoResponse, HubError> {
    let room = validate_room_name(&room)?;
    let (summary, members) = state
        .hub
        .room(room.clone())
        .await?
        .ok_or(HubError::RoomNotFound(room))?;
    Ok((StatusCode::OK, Json(RoomDetailResponse::new(summary, members))))
}

/// `POST /rooms/{room}/messages` — Relay a message into a room.
///
/// Fire-and-forget: the message is queued for the hub and `202 Accepted` is
/// returned; a room with no members simply receives nothing.
///
/// # Errors
///
/// Returns [`HubError::InvalidRequest`] for the reserved `join`/`leave`
/// types, or [`HubError::InvalidRoom`] for a bad room name.
#[utoipa::path(
    post,
    path = "/api/v1/rooms/{room}/messages",
    tag = "Rooms",
    summary = "Publish to a room",
    description = "Queues an envelope for fan-out to every current member of the room.",
    params(("room" = String, Path, description = "Room name")),
    request_body = PublishRequest,
    responses(
        (status = 202, description = "Message queued", body = PublishResponse),
        (status = 400, description = "Reserved type or invalid room", body = ErrorResponse),
        (status = 503, description = "Hub is not running", body = ErrorResponse),
    )
)]
pub async fn publish_message(
    State(state): State<AppState>,
    Path(room): Path<String>,
    Json(req): Json<PublishRequest>,
) -> Result<impl IntoResponse, HubError> {
    let room = validate_room_name(&room)?;
    if MessageType::from(req.kind.as_str()).is_synthetic() {
        return Err(HubError::InvalidRequest(format!(
            "type `{}` is reserved for the hub",
            req.kind
        )));
    }

    let kind = req.kind.clone();
    state.hub.submit_message(req.into_envelope(&room)).await?;
    tracing::debug!(%room, %kind, "http message queued");

    Ok((
        StatusCode::ACCEPTED,
        Json(PublishResponse {
            room,
            kind,
            status: "accepted".to_string(),
        }),
    ))
}

/// Room routes, mounted under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/rooms", get(list_rooms))
        .route("/rooms/{room}", get(get_room))
        .route("/rooms/{room}/messages", post(publish_message))
}
