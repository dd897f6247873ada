//! A registered connection and its outbound queue.
//!
//! [`Client::new`] hands back the client together with the receiving half of
//! its bounded outbound queue. The `Client` itself holds the only sender, and
//! it is moved into the hub on register, so the queue closes exactly once:
//! when the hub drops the client on unregister.

use tokio::sync::mpsc;

use super::{ClientId, ConnectionId};

/// Receiving half of a client's outbound queue. Yields serialized envelopes.
pub type OutboundQueue = mpsc::Receiver<String>;

/// One live connection bound to a single room.
#[derive(Debug)]
pub struct Client {
    connection_id: ConnectionId,
    client_id: ClientId,
    room: String,
    outbound: mpsc::Sender<String>,
}

impl Client {
    /// Creates a client for `room` with an outbound queue of `queue_capacity`
    /// frames (at least one).
    #[must_use]
    pub fn new(
        client_id: ClientId,
        room: impl Into<String>,
        queue_capacity: usize,
    ) -> (Self, OutboundQueue) {
        let (outbound, queue) = mpsc::channel(queue_capacity.max(1));
        let client = Self {
            connection_id: ConnectionId::new(),
            client_id,
            room: room.into(),
            outbound,
        };
        (client, queue)
    }

    /// Returns the lightweight reference used to unregister this client.
    #[must_use]
    pub fn handle(&self) -> ClientRef {
        ClientRef {
            connection_id: self.connection_id,
            client_id: self.client_id.clone(),
            room: self.room.clone(),
        }
    }

    /// Connection identity.
    #[must_use]
    pub const fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }

    /// Client identity.
    #[must_use]
    pub const fn client_id(&self) -> &ClientId {
        &self.client_id
    }

    /// Room this client is bound to.
    #[must_use]
    pub fn room(&self) -> &str {
        &self.room
    }

    /// Sending half of the outbound queue.
    #[must_use]
    pub const fn outbound(&self) -> &mpsc::Sender<String> {
        &self.outbound
    }
}

/// Cheap, cloneable reference to a [`Client`] that has been handed to the hub.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientRef {
    connection_id: ConnectionId,
    client_id: ClientId,
    room: String,
}

impl ClientRef {
    /// Connection identity.
    #[must_use]
    pub const fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }

    /// Client identity.
    #[must_use]
    pub const fn client_id(&self) -> &ClientId {
        &self.client_id
    }

    /// Room the client is bound to.
    #[must_use]
    pub fn room(&self) -> &str {
        &self.room
    }
}
