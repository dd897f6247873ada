//! Room membership storage.
//!
//! [`RoomRegistry`] maps room names to their member sets. It has no interior
//! locking: the hub event loop owns it exclusively and every read from other
//! tasks goes through the hub's query channel.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc;

use super::{Client, ClientId, ClientRef, ConnectionId};
use crate::error::HubError;

/// Longest accepted room name, in bytes.
pub const MAX_ROOM_NAME_LEN: usize = 128;

/// Validates a client-supplied room name, returning it trimmed.
///
/// # Errors
///
/// Returns [`HubError::InvalidRoom`] if the name is blank or longer than
/// [`MAX_ROOM_NAME_LEN`] bytes.
pub fn validate_room_name(raw: &str) -> Result<String, HubError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(HubError::InvalidRoom("room name must not be empty".to_string()));
    }
    if name.len() > MAX_ROOM_NAME_LEN {
        return Err(HubError::InvalidRoom(format!(
            "room name exceeds {MAX_ROOM_NAME_LEN} bytes"
        )));
    }
    Ok(name.to_string())
}

/// A member's slot in a room: identity plus the sender for its outbound queue.
#[derive(Debug)]
pub struct Member {
    client_id: ClientId,
    outbound: mpsc::Sender<String>,
}

impl Member {
    /// Client identity.
    #[must_use]
    pub const fn client_id(&self) -> &ClientId {
        &self.client_id
    }

    /// Sending half of the member's outbound queue.
    #[must_use]
    pub const fn outbound(&self) -> &mpsc::Sender<String> {
        &self.outbound
    }
}

#[derive(Debug)]
struct Room {
    created_at: DateTime<Utc>,
    members: HashMap<ConnectionId, Member>,
}

/// Point-in-time view of one room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomSummary {
    /// Room name.
    pub room: String,
    /// Number of current members.
    pub member_count: usize,
    /// When the room was first joined.
    pub created_at: DateTime<Utc>,
}

/// Membership mapping from room name to its member set.
///
/// Rooms are created on first join and never removed; a room whose last
/// member left stays allocated with an empty set.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: HashMap<String, Room>,
}

impl RoomRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `client` to its room, creating the room on first use.
    ///
    /// Consumes the client: the registry now owns its outbound sender.
    /// Returns `false` if the connection was already a member.
    pub fn join(&mut self, client: Client) -> bool {
        let room = self
            .rooms
            .entry(client.room().to_string())
            .or_insert_with(|| Room {
                created_at: Utc::now(),
                members: HashMap::new(),
            });
        let connection_id = client.connection_id();
        if room.members.contains_key(&connection_id) {
            return false;
        }
        room.members.insert(
            connection_id,
            Member {
                client_id: client.client_id().clone(),
                outbound: client.outbound().clone(),
            },
        );
        true
    }

    /// Removes the referenced client from its room.
    ///
    /// Returns the removed member, or `None` if it was not present. Dropping
    /// the returned member closes its outbound queue.
    pub fn leave(&mut self, client: &ClientRef) -> Option<Member> {
        self.rooms
            .get_mut(client.room())
            .and_then(|room| room.members.remove(&client.connection_id()))
    }

    /// Returns `true` if the referenced client is currently a member of its room.
    #[must_use]
    pub fn contains(&self, client: &ClientRef) -> bool {
        self.rooms
            .get(client.room())
            .is_some_and(|room| room.members.contains_key(&client.connection_id()))
    }

    /// Iterates over the members of `room`, or `None` if the room was never
    /// created.
    pub fn members<'a>(
        &'a self,
        room: &str,
    ) -> Option<impl Iterator<Item = &'a Member> + use<'a>> {
        self.rooms.get(room).map(|r| r.members.values())
    }

    /// Returns the client ids of `room`'s members, sorted, or `None` if the
    /// room was never created.
    #[must_use]
    pub fn member_ids(&self, room: &str) -> Option<Vec<ClientId>> {
        self.members(room).map(|members| {
            let mut ids: Vec<ClientId> = members.map(|m| m.client_id.clone()).collect();
            ids.sort();
            ids
        })
    }

    /// Returns the summary of one room.
    #[must_use]
    pub fn summary(&self, room: &str) -> Option<RoomSummary> {
        self.rooms.get(room).map(|r| RoomSummary {
            room: room.to_string(),
            member_count: r.members.len(),
            created_at: r.created_at,
        })
    }

    /// Returns summaries of all rooms, ordered by name.
    #[must_use]
    pub fn summaries(&self) -> Vec<RoomSummary> {
        let mut summaries: Vec<RoomSummary> = self
            .rooms
            .iter()
            .map(|(name, r)| RoomSummary {
                room: name.clone(),
                member_count: r.members.len(),
                created_at: r.created_at,
            })
            .collect();
        summaries.sort_by(|a, b| a.room.cmp(&b.room));
        summaries
    }

    /// Number of rooms ever created.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    /// Returns `true` if no room has been created yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Total number of members across all rooms.
    #[must_use]
    pub fn member_count(&self) -> usize {
        self.rooms.values().map(|r| r.members.len()).sum()
    }
}
