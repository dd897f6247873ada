//! The hub's serialized event loop.
//!
//! [`Hub::run`] is the single writer of room membership. Producers (one task
//! per connection, plus HTTP handlers) only ever enqueue onto the hub's
//! channels through a [`HubHandle`]; the loop applies register, unregister,
//! and broadcast events one at a time, so no two mutations interleave and no
//! lock is needed around the [`RoomRegistry`].
//!
//! # Event selection
//!
//! The loop uses an unbiased `tokio::select!`: when several channels are
//! ready, the next one is picked at random. There is no FIFO ordering across
//! event kinds. Register is the exception that matters: the caller waits
//! until the loop has applied it, so a connection's later unregister can
//! never be handled first.
//!
//! # Backpressure
//!
//! Fan-out never awaits on a client queue. Each member gets a `try_send`;
//! a full queue drops the frame for that member only, so one stalled client
//! cannot stall the hub.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use super::handle::{HubQuery, Registration};
use super::{EnvelopeEncoder, HubHandle, HubStats};
use crate::config::HubConfig;
use crate::domain::{ClientRef, Envelope, RoomRegistry};

/// Owner of all room state. Consumed by [`Hub::run`].
#[derive(Debug)]
pub struct Hub {
    rooms: RoomRegistry,
    stats: HubStats,
    encoder: Arc<dyn EnvelopeEncoder>,
    register_rx: mpsc::Receiver<Registration>,
    unregister_rx: mpsc::Receiver<ClientRef>,
    broadcast_rx: mpsc::Receiver<Envelope>,
    query_rx: mpsc::Receiver<HubQuery>,
    // Weak so the loop can observe the broadcast channel closing once every
    // handle is gone.
    synth_tx: mpsc::WeakSender<Envelope>,
}

impl Hub {
    /// Creates the hub and the handle producers use to reach it.
    ///
    /// The hub does nothing until [`Hub::run`] is spawned.
    #[must_use]
    pub fn new(config: &HubConfig, encoder: Arc<dyn EnvelopeEncoder>) -> (Self, HubHandle) {
        let capacity = config.hub_channel_capacity.max(1);
        let (register, register_rx) = mpsc::channel(capacity);
        let (unregister, unregister_rx) = mpsc::channel(capacity);
        let (broadcast, broadcast_rx) = mpsc::channel(capacity);
        let (query, query_rx) = mpsc::channel(capacity);

        let hub = Self {
            rooms: RoomRegistry::new(),
            stats: HubStats::default(),
            encoder,
            register_rx,
            unregister_rx,
            broadcast_rx,
            query_rx,
            synth_tx: broadcast.downgrade(),
        };
        let handle = HubHandle {
            register,
            unregister,
            broadcast,
            query,
        };
        (hub, handle)
    }

    /// Runs the event loop.
    ///
    /// Returns once every [`HubHandle`] has been dropped and all pending
    /// events, including synthesized join/leave envelopes, are processed.
    pub async fn run(mut self) {
        tracing::info!("hub event loop started");
        loop {
            tokio::select! {
                Some(registration) = self.register_rx.recv() => self.on_register(registration),
                Some(client) = self.unregister_rx.recv() => self.on_unregister(&client),
                Some(envelope) = self.broadcast_rx.recv() => self.on_broadcast(&envelope),
                Some(query) = self.query_rx.recv() => self.on_query(query),
                else => break,
            }
        }
        tracing::info!(rooms = self.rooms.len(), "hub event loop stopped");
    }

    fn on_register(&mut self, Registration { client, applied }: Registration) {
        let announcement = Envelope::join(client.room(), client.client_id().clone());
        let room = client.room().to_string();
        let client_id = client.client_id().clone();
        let connection_id = client.connection_id();

        let joined = self.rooms.join(client);
        // The registering task may have been cancelled; nothing to tell it.
        let _ = applied.send(());
        if !joined {
            tracing::debug!(%room, %client_id, %connection_id, "client already registered");
            return;
        }
        self.stats.registered = self.stats.registered.saturating_add(1);
        tracing::info!(%room, %client_id, %connection_id, "client joined room");
        self.synthesize(announcement);
    }

    fn on_unregister(&mut self, client: &ClientRef) {
        if !self.rooms.contains(client) {
            tracing::debug!(
                room = client.room(),
                client_id = %client.client_id(),
                "unregister for unknown client ignored"
            );
            return;
        }

        self.synthesize(Envelope::leave(client.room(), client.client_id().clone()));
        // Dropping the removed member drops the only sender of its queue.
        drop(self.rooms.leave(client));
        self.stats.unregistered = self.stats.unregistered.saturating_add(1);
        tracing::info!(
            room = client.room(),
            client_id = %client.client_id(),
            connection_id = %client.connection_id(),
            "client left room"
        );
    }

    fn on_broadcast(&mut self, envelope: &Envelope) {
        let Some(members) = self.rooms.members(envelope.room()) else {
            self.stats.unknown_room = self.stats.unknown_room.saturating_add(1);
            tracing::warn!(
                room = envelope.room(),
                kind = %envelope.kind(),
                "room does not exist; dropping message"
            );
            return;
        };

        for member in members {
            let frame = match self.encoder.encode(envelope, member.client_id()) {
                Ok(frame) => frame,
                Err(error) => {
                    self.stats.encode_failures = self.stats.encode_failures.saturating_add(1);
                    tracing::warn!(
                        room = envelope.room(),
                        recipient = %member.client_id(),
                        %error,
                        "failed to encode message for recipient"
                    );
                    continue;
                }
            };

            match member.outbound().try_send(frame) {
                Ok(()) => self.stats.delivered = self.stats.delivered.saturating_add(1),
                Err(TrySendError::Full(_)) => {
                    self.stats.dropped_full = self.stats.dropped_full.saturating_add(1);
                    tracing::warn!(
                        room = envelope.room(),
                        recipient = %member.client_id(),
                        "outbound queue full; dropping message for slow client"
                    );
                }
                Err(TrySendError::Closed(_)) => {
                    self.stats.dropped_closed = self.stats.dropped_closed.saturating_add(1);
                    tracing::debug!(
                        room = envelope.room(),
                        recipient = %member.client_id(),
                        "outbound queue closed; skipping recipient"
                    );
                }
            }
        }
    }

    fn on_query(&self, query: HubQuery) {
        // A dropped reply receiver just means the caller gave up.
        match query {
            HubQuery::Rooms(reply) => {
                let _ = reply.send(self.rooms.summaries());
            }
            HubQuery::Room { room, reply } => {
                let answer = self
                    .rooms
                    .summary(&room)
                    .zip(self.rooms.member_ids(&room));
                let _ = reply.send(answer);
            }
            HubQuery::Stats(reply) => {
                let _ = reply.send(HubStats {
                    rooms: self.rooms.len(),
                    members: self.rooms.member_count(),
                    ..self.stats
                });
            }
        }
    }

    /// Submits a hub-generated envelope back onto the broadcast path without
    /// blocking the current event.
    fn synthesize(&self, envelope: Envelope) {
        let Some(tx) = self.synth_tx.upgrade() else {
            tracing::debug!(room = envelope.room(), "broadcast channel closed; dropping announcement");
            return;
        };
        tokio::spawn(async move {
            if let Err(error) = tx.send(envelope).await {
                tracing::debug!(room = error.0.room(), "hub stopped before announcement was queued");
            }
        });
    }
}
