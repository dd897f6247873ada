//! Per-connection read/write pumps.
//!
//! Each WebSocket gets a [`Client`] registered with the hub. A write task
//! drains the client's outbound queue into the socket and sends periodic
//! pings; when the hub closes the queue it sends a Close frame and stops.
//! The read loop decodes inbound frames into [`Envelope`]s and relays them
//! through the hub. Whichever side finishes first, the connection ends with
//! an (idempotent) unregister.

use std::time::Duration;

use axum::body::Bytes;
use axum::extract::ws::{CloseFrame, Message, Utf8Bytes, WebSocket, close_code};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::Instrument;

use crate::config::HubConfig;
use crate::domain::{Client, ClientId, ClientRef, Envelope, OutboundQueue};
use crate::error::HubError;
use crate::hub::HubHandle;

/// Per-connection tuning taken from [`HubConfig`].
#[derive(Debug, Clone, Copy)]
pub struct ConnectionSettings {
    /// Outbound queue capacity.
    pub queue_capacity: usize,
    /// Server ping period, if enabled.
    pub ping_interval: Option<Duration>,
    /// How long to wait for the writer to flush after unregister.
    pub close_grace: Duration,
}

impl From<&HubConfig> for ConnectionSettings {
    fn from(config: &HubConfig) -> Self {
        Self {
            queue_capacity: config.client_queue_capacity,
            ping_interval: config.ping_interval(),
            close_grace: config.close_grace(),
        }
    }
}

/// Runs one client connection from registration to unregistration.
pub async fn run_connection(
    socket: WebSocket,
    hub: HubHandle,
    client_id: ClientId,
    room: String,
    settings: ConnectionSettings,
) {
    let (client, outbound) = Client::new(client_id, room, settings.queue_capacity);
    let span = tracing::info_span!(
        "ws",
        room = client.room(),
        client_id = %client.client_id(),
        connection_id = %client.connection_id(),
    );
    serve_client(socket, hub, client, outbound, settings)
        .instrument(span)
        .await;
}

async fn serve_client(
    socket: WebSocket,
    hub: HubHandle,
    client: Client,
    outbound: OutboundQueue,
    settings: ConnectionSettings,
) {
    let client_ref = client.handle();
    if let Err(error) = hub.register(client).await {
        tracing::warn!(%error, "could not register client");
        return;
    }
    tracing::debug!("ws connection registered");

    let (ws_tx, ws_rx) = socket.split();
    let mut writer =
        tokio::spawn(write_pump(ws_tx, outbound, settings.ping_interval).in_current_span());

    let writer_finished = tokio::select! {
        () = read_pump(ws_rx, &hub, &client_ref) => false,
        _ = &mut writer => true,
    };

    if let Err(error) = hub.unregister(client_ref).await {
        tracing::debug!(%error, "unregister after hub stopped");
    }
    if !writer_finished
        && tokio::time::timeout(settings.close_grace, &mut writer)
            .await
            .is_err()
    {
        tracing::debug!("writer did not flush in time; aborting");
        writer.abort();
    }

    tracing::debug!("ws connection closed");
}

/// Decodes one inbound frame and pins it to the client's room and id.
///
/// # Errors
///
/// Returns [`HubError::InvalidRequest`] for malformed JSON or for the
/// hub-only `join`/`leave` types.
pub fn decode_inbound(raw: &[u8], client: &ClientRef) -> Result<Envelope, HubError> {
    let envelope: Envelope = serde_json::from_slice(raw)
        .map_err(|e| HubError::InvalidRequest(format!("malformed envelope: {e}")))?;
    if envelope.kind().is_synthetic() {
        return Err(HubError::InvalidRequest(format!(
            "type `{}` is reserved for the hub",
            envelope.kind()
        )));
    }
    Ok(envelope.bound_to(client.room(), client.client_id()))
}

async fn read_pump(mut ws_rx: SplitStream<WebSocket>, hub: &HubHandle, client: &ClientRef) {
    while let Some(frame) = ws_rx.next().await {
        let decoded = match frame {
            Ok(Message::Text(text)) => decode_inbound(text.as_str().as_bytes(), client),
            Ok(Message::Binary(bytes)) => decode_inbound(&bytes, client),
            Ok(Message::Close(_)) => return,
            // Pings are answered by axum; pongs need no action.
            Ok(_) => continue,
            Err(error) => {
                tracing::debug!(%error, "ws read error");
                return;
            }
        };

        match decoded {
            Ok(envelope) => {
                if hub.submit_message(envelope).await.is_err() {
                    return;
                }
            }
            Err(error) => tracing::warn!(%error, "dropping inbound frame"),
        }
    }
}

async fn write_pump(
    mut ws_tx: SplitSink<WebSocket, Message>,
    mut outbound: OutboundQueue,
    ping_interval: Option<Duration>,
) {
    let mut ping = ping_interval.map(|period| {
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval
    });

    loop {
        tokio::select! {
            frame = outbound.recv() => {
                let Some(text) = frame else {
                    // Queue closed by the hub: no further sends.
                    let close = Message::Close(Some(CloseFrame {
                        code: close_code::NORMAL,
                        reason: Utf8Bytes::from_static("left room"),
                    }));
                    let _ = ws_tx.send(close).await;
                    return;
                };
                if ws_tx.send(Message::text(text)).await.is_err() {
                    return;
                }
            }
            () = next_tick(&mut ping) => {
                if ws_tx.send(Message::Ping(Bytes::new())).await.is_err() {
                    return;
                }
            }
        }
    }
}

async fn next_tick(ping: &mut Option<Interval>) {
    match ping {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::MessageType;

    fn client_ref() -> ClientRef {
        let (client, _queue) = Client::new(ClientId::from("alice"), "lobby", 1);
        client.handle()
    }

    #[test]
    fn inbound_frame_is_bound_to_connection() {
        let raw = br#"{"room":"other","type":"chat","data":{"msg":"hi"},"sender":"mallory","target":"bob"}"#;
        let Ok(envelope) = decode_inbound(raw, &client_ref()) else {
            panic!("decode failed");
        };
        assert_eq!(envelope.room(), "lobby");
        assert_eq!(envelope.sender().as_str(), "alice");
        assert_eq!(envelope.kind(), &MessageType::from("chat"));
        assert_eq!(envelope.data(), &json!({"msg": "hi"}));
        assert_eq!(envelope.target().map(ClientId::as_str), Some("bob"));
    }

    #[test]
    fn frame_without_room_takes_the_connection_room() {
        let raw = br#"{"type":"x","data":1,"currentPCInfo":null}"#;
        let Ok(envelope) = decode_inbound(raw, &client_ref()) else {
            panic!("decode failed");
        };
        assert_eq!(envelope.room(), "lobby");
        assert_eq!(envelope.sender().as_str(), "alice");
        assert_eq!(envelope.context(), "");
    }

    #[test]
    fn synthetic_types_are_rejected() {
        for kind in ["join", "leave"] {
            let raw = format!(r#"{{"room":"lobby","type":"{kind}","data":null}}"#);
            let Err(HubError::InvalidRequest(message)) = decode_inbound(raw.as_bytes(), &client_ref())
            else {
                panic!("{kind} should be rejected");
            };
            assert!(message.contains("reserved"));
        }
    }

    #[test]
    fn malformed_json_is_rejected() {
        let Err(HubError::InvalidRequest(message)) = decode_inbound(b"{not json", &client_ref())
        else {
            panic!("expected InvalidRequest");
        };
        assert!(message.starts_with("malformed envelope"));
    }

    #[test]
    fn settings_follow_config() {
        let config = HubConfig {
            client_queue_capacity: 8,
            ping_interval_secs: 0,
            close_grace_ms: 250,
            ..HubConfig::default()
        };
        let settings = ConnectionSettings::from(&config);
        assert_eq!(settings.queue_capacity, 8);
        assert!(settings.ping_interval.is_none());
        assert_eq!(settings.close_grace, Duration::from_millis(250));
    }
}
