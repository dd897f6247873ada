//! Producer-side handle to the hub event loop.

use tokio::sync::{mpsc, oneshot};

use super::HubStats;
use crate::domain::{Client, ClientId, ClientRef, Envelope, RoomSummary};
use crate::error::HubError;

/// A client handed to the hub, with the reply fired once it is a member.
#[derive(Debug)]
pub(crate) struct Registration {
    pub(crate) client: Client,
    pub(crate) applied: oneshot::Sender<()>,
}

/// Read-only requests answered by the hub loop.
#[derive(Debug)]
pub(crate) enum HubQuery {
    Rooms(oneshot::Sender<Vec<RoomSummary>>),
    Room {
        room: String,
        reply: oneshot::Sender<Option<(RoomSummary, Vec<ClientId>)>>,
    },
    Stats(oneshot::Sender<HubStats>),
}

/// Cloneable handle used by connections and HTTP handlers to talk to the hub.
///
/// [`HubHandle::register`] and the queries wait for the event loop to answer;
/// the other methods only enqueue and the effect is applied later by the
/// loop. Methods fail only with
/// [`HubError::HubUnavailable`] once the loop has stopped.
#[derive(Debug, Clone)]
pub struct HubHandle {
    pub(crate) register: mpsc::Sender<Registration>,
    pub(crate) unregister: mpsc::Sender<ClientRef>,
    pub(crate) broadcast: mpsc::Sender<Envelope>,
    pub(crate) query: mpsc::Sender<HubQuery>,
}

impl HubHandle {
    /// Hands `client` to the hub, which adds it to its room and announces
    /// it with a `join` envelope.
    ///
    /// Returns once the client is a member, so an [`HubHandle::unregister`]
    /// issued afterwards always finds it.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::HubUnavailable`] if the hub loop has stopped.
    pub async fn register(&self, client: Client) -> Result<(), HubError> {
        let (applied, rx) = oneshot::channel();
        self.register
            .send(Registration { client, applied })
            .await
            .map_err(|_| HubError::HubUnavailable)?;
        rx.await.map_err(|_| HubError::HubUnavailable)
    }

    /// Asks the hub to remove the client, announce a `leave`, and close its
    /// outbound queue. Safe to call more than once.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::HubUnavailable`] if the hub loop has stopped.
    pub async fn unregister(&self, client: ClientRef) -> Result<(), HubError> {
        self.unregister
            .send(client)
            .await
            .map_err(|_| HubError::HubUnavailable)
    }

    /// Relays an envelope into the broadcast path. Delivery is best effort.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::HubUnavailable`] if the hub loop has stopped.
    pub async fn submit_message(&self, envelope: Envelope) -> Result<(), HubError> {
        self.broadcast
            .send(envelope)
            .await
            .map_err(|_| HubError::HubUnavailable)
    }

    /// Returns summaries of every room the hub knows about.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::HubUnavailable`] if the hub loop has stopped.
    pub async fn rooms(&self) -> Result<Vec<RoomSummary>, HubError> {
        self.ask(HubQuery::Rooms).await
    }

    /// Returns the summary and sorted member ids of `room`, or `None` if the
    /// room was never created.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::HubUnavailable`] if the hub loop has stopped.
    pub async fn room(
        &self,
        room: impl Into<String>,
    ) -> Result<Option<(RoomSummary, Vec<ClientId>)>, HubError> {
        let room = room.into();
        self.ask(|reply| HubQuery::Room { room, reply }).await
    }

    /// Returns the sorted member ids of `room`, or `None` if the room was
    /// never created.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::HubUnavailable`] if the hub loop has stopped.
    pub async fn room_members(
        &self,
        room: impl Into<String>,
    ) -> Result<Option<Vec<ClientId>>, HubError> {
        Ok(self.room(room).await?.map(|(_, members)| members))
    }

    /// Returns the hub's activity counters.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::HubUnavailable`] if the hub loop has stopped.
    pub async fn stats(&self) -> Result<HubStats, HubError> {
        self.ask(HubQuery::Stats).await
    }

    async fn ask<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> HubQuery,
    ) -> Result<T, HubError> {
        let (reply, rx) = oneshot::channel();
        self.query
            .send(build(reply))
            .await
            .map_err(|_| HubError::HubUnavailable)?;
        rx.await.map_err(|_| HubError::HubUnavailable)
    }
}
