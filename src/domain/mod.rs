//! Domain layer: identities, the message envelope, clients, and room
//! membership.
//!
//! These are plain data types with no synchronization of their own. The hub
//! event loop in [`crate::hub`] is their only mutator.

pub mod client;
pub mod client_id;
pub mod envelope;
pub mod room_registry;

pub use client::{Client, ClientRef, OutboundQueue};
pub use client_id::{ClientId, ConnectionId};
pub use envelope::{Envelope, MessageType};
pub use room_registry::{
    MAX_ROOM_NAME_LEN, Member, RoomRegistry, RoomSummary, validate_room_name,
};
