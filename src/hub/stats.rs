//! Counters maintained by the hub loop.

use serde::Serialize;
use utoipa::ToSchema;

/// Snapshot of hub activity since start.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct HubStats {
    /// Clients registered.
    pub registered: u64,
    /// Clients unregistered (duplicates not counted).
    pub unregistered: u64,
    /// Frames handed to client queues.
    pub delivered: u64,
    /// Frames dropped because a client queue was full.
    pub dropped_full: u64,
    /// Frames dropped because a client queue was already closed.
    pub dropped_closed: u64,
    /// Per-recipient encoding failures.
    pub encode_failures: u64,
    /// Broadcasts dropped because their room did not exist.
    pub unknown_room: u64,
    /// Rooms currently allocated.
    pub rooms: usize,
    /// Members across all rooms.
    pub members: usize,
}
