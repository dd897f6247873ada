//! WebSocket layer: the upgrade endpoint and the per-connection adapter
//! between a socket and the hub.
//!
//! The endpoint at `/ws` joins one room per connection. Every text (or
//! binary) frame the client sends is an envelope relayed to that room;
//! every frame the server sends is an envelope fanned out by the hub.

pub mod connection;
pub mod handler;
