//! # roomcast
//!
//! Room-scoped publish/subscribe hub for persistent WebSocket connections.
//!
//! Clients join a named room; every envelope sent into a room is fanned out
//! to all of its current members (the sender included), and the hub
//! announces membership changes with synthetic `join`/`leave` envelopes.
//!
//! ## Architecture
//!
//! ```text
//! Clients (WebSocket, HTTP)
//!     │
//!     ├── WS adapter (ws/)         one read loop + write task per socket
//!     ├── REST handlers (api/)     room inspection, server-side publish
//!     │
//!     ├── HubHandle (hub/)         register · unregister · submit · query
//!     │
//!     └── Hub::run (hub/)          single writer of RoomRegistry (domain/)
//! ```
//!
//! All membership mutation and fan-out happens inside [`hub::Hub::run`];
//! nothing else touches room state, so no lock guards it. Delivery to each
//! client is a non-blocking `try_send` on a bounded queue, so a slow client
//! loses frames rather than stalling the hub.

pub mod api;
pub mod app;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod hub;
pub mod ws;
