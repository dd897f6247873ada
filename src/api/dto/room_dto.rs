//! Room DTOs for list, detail, and publish operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{ClientId, Envelope, RoomSummary};

/// Sender id used when an HTTP publish does not name one.
pub const SERVER_SENDER: &str = "server";

/// One room in `GET /rooms`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RoomSummaryDto {
    /// Room name.
    pub room: String,
    /// Number of connected members.
    pub member_count: usize,
    /// When the room was first joined.
    pub created_at: DateTime<Utc>,
}

impl From<RoomSummary> for RoomSummaryDto {
    fn from(summary: RoomSummary) -> Self {
        Self {
            room: summary.room,
            member_count: summary.member_count,
            created_at: summary.created_at,
        }
    }
}

/// Response body for `GET /rooms`.
#[derive(Debug, Serialize, ToSchema)]
pub struct RoomListResponse {
    /// Rooms ordered by name.
    pub rooms: Vec<RoomSummaryDto>,
    /// Number of rooms.
    pub total: usize,
}

/// Response body for `GET /rooms/{room}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct RoomDetailResponse {
    /// Room name.
    pub room: String,
    /// Number of connected members.
    pub member_count: usize,
    /// When the room was first joined.
    pub created_at: DateTime<Utc>,
    /// Client ids of current members, sorted.
    pub members: Vec<String>,
}

impl RoomDetailResponse {
    /// Builds the response from a hub snapshot.
    #[must_use]
    pub fn new(summary: RoomSummary, members: Vec<ClientId>) -> Self {
        Self {
            room: summary.room,
            member_count: summary.member_count,
            created_at: summary.created_at,
            members: members.into_iter().map(|id| id.as_str().to_string()).collect(),
        }
    }
}

/// Request body for `POST /rooms/{room}/messages`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PublishRequest {
    /// Application message type. `join` and `leave` are reserved.
    #[serde(rename = "type")]
    pub kind: String,
    /// Opaque payload relayed as-is.
    #[serde(default)]
    pub data: serde_json::Value,
    /// Sender id; defaults to `"server"`.
    #[serde(default)]
    pub sender: Option<String>,
    /// Optional directed-delivery target.
    #[serde(default)]
    pub target: Option<String>,
    /// Optional sender instance id.
    #[serde(default, rename = "instanceId")]
    pub instance_id: Option<String>,
    /// Free-form context.
    #[serde(default, rename = "currentPCInfo")]
    pub context: String,
}

impl PublishRequest {
    /// Converts the request into an envelope for `room`.
    #[must_use]
    pub fn into_envelope(self, room: &str) -> Envelope {
        let sender = self
            .sender
            .filter(|s| !s.is_empty())
            .map_or_else(|| ClientId::from(SERVER_SENDER), ClientId::from);
        let mut envelope =
            Envelope::new(room, self.kind, self.data, sender).with_context(self.context);
        if let Some(target) = self.target.filter(|t| !t.is_empty()) {
            envelope = envelope.with_target(ClientId::from(target));
        }
        if let Some(instance_id) = self.instance_id.filter(|i| !i.is_empty()) {
            envelope = envelope.with_instance_id(instance_id);
        }
        envelope
    }
}

/// Response body for `POST /rooms/{room}/messages` (202 Accepted).
#[derive(Debug, Serialize, ToSchema)]
pub struct PublishResponse {
    /// Target room.
    pub room: String,
    /// Message type.
    #[serde(rename = "type")]
    pub kind: String,
    /// Always `"accepted"`: delivery is best effort.
    pub status: String,
}
