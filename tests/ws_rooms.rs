//! End-to-end tests: a real server on a loopback port, WebSocket clients via
//! `tokio-tungstenite`, and HTTP queries via `reqwest`.

#![allow(clippy::panic, clippy::unwrap_used, clippy::indexing_slicing)]

use std::net::SocketAddr;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use roomcast::app::{build_app, spawn_hub};
use roomcast::config::HubConfig;

type Ws = WebSocketStream<MaybeTlsStream<TcpStream>>;

const WAIT: Duration = Duration::from_secs(3);

async fn start_server() -> SocketAddr {
    let config = HubConfig {
        ping_interval_secs: 0,
        ..HubConfig::default()
    };
    let Ok(listener) = TcpListener::bind("127.0.0.1:0").await else {
        panic!("bind failed");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("no local addr");
    };
    let app = build_app(spawn_hub(config));
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

async fn connect(addr: SocketAddr, room: &str, id: &str) -> Ws {
    let url = format!("ws://{addr}/ws?room={room}&clientId={id}");
    let Ok((mut ws, _)) = connect_async(url).await else {
        panic!("connect failed for {id}");
    };
    // Our own join is delivered to us as well; it confirms registration.
    let own = next_envelope(&mut ws).await;
    assert_eq!(own["type"], "join");
    assert_eq!(own["sender"], id);
    ws
}

async fn next_envelope(ws: &mut Ws) -> Value {
    loop {
        let Ok(Some(Ok(message))) = timeout(WAIT, ws.next()).await else {
            panic!("expected a frame");
        };
        match message {
            Message::Text(text) => {
                let Ok(value) = serde_json::from_str::<Value>(text.as_str()) else {
                    panic!("frame is not JSON: {text}");
                };
                return value;
            }
            Message::Ping(_) | Message::Pong(_) => continue,
            other => panic!("unexpected frame: {other:?}"),
        }
    }
}

async fn send(ws: &mut Ws, value: &Value) {
    let Ok(()) = ws.send(Message::text(value.to_string())).await else {
        panic!("send failed");
    };
}

#[tokio::test]
async fn join_broadcast_and_self_delivery() {
    let addr = start_server().await;
    let mut a = connect(addr, "lobby", "A").await;
    let mut b = connect(addr, "lobby", "B").await;

    let join_b = next_envelope(&mut a).await;
    assert_eq!(join_b["type"], "join");
    assert_eq!(join_b["room"], "lobby");
    assert_eq!(join_b["sender"], "B");
    assert!(join_b["data"].is_null());
    assert_eq!(join_b["currentPCInfo"], "");

    send(&mut b, &json!({"room": "lobby", "type": "chat", "data": {"msg": "hi"}})).await;

    let at_a = next_envelope(&mut a).await;
    assert_eq!(at_a["type"], "chat");
    assert_eq!(at_a["data"], json!({"msg": "hi"}));
    assert_eq!(at_a["sender"], "B");

    let at_b = next_envelope(&mut b).await;
    assert_eq!(at_b["data"], json!({"msg": "hi"}));
}

#[tokio::test]
async fn disconnect_announces_leave_and_updates_membership() {
    let addr = start_server().await;
    let mut a = connect(addr, "lobby", "A").await;
    let mut b = connect(addr, "lobby", "B").await;
    let _join_b = next_envelope(&mut a).await;

    let Ok(()) = a.close(None).await else {
        panic!("close failed");
    };

    let leave = next_envelope(&mut b).await;
    assert_eq!(leave["type"], "leave");
    assert_eq!(leave["sender"], "A");
    assert_eq!(leave["room"], "lobby");

    let Ok(response) = reqwest::get(format!("http://{addr}/api/v1/rooms/lobby")).await else {
        panic!("http request failed");
    };
    let Ok(body) = response.json::<Value>().await else {
        panic!("bad json");
    };
    assert_eq!(body["members"], json!(["B"]));
    assert_eq!(body["member_count"], 1);
}

#[tokio::test]
async fn immediate_close_leaves_no_member_behind() {
    let addr = start_server().await;
    for _ in 0..20 {
        let Ok((mut ws, _)) = connect_async(format!("ws://{addr}/ws?room=flash&clientId=X")).await
        else {
            panic!("connect failed");
        };
        let Ok(()) = ws.close(None).await else {
            panic!("close failed");
        };
    }

    let mut stats = Value::Null;
    for _ in 0..50 {
        let response = tokio_test::assert_ok!(reqwest::get(format!("http://{addr}/api/v1/stats")).await);
        stats = tokio_test::assert_ok!(response.json::<Value>().await);
        if stats["unregistered"] == 20 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    assert_eq!(stats["registered"], 20, "stats: {stats}");
    assert_eq!(stats["unregistered"], 20, "stats: {stats}");
    assert_eq!(stats["members"], 0, "stats: {stats}");

    let response =
        tokio_test::assert_ok!(reqwest::get(format!("http://{addr}/api/v1/rooms/flash")).await);
    let body = tokio_test::assert_ok!(response.json::<Value>().await);
    assert_eq!(body["member_count"], 0);
    assert_eq!(body["members"], json!([]));
}

#[tokio::test]
async fn client_cannot_spoof_room_or_synthetic_types() {
    let addr = start_server().await;
    let mut a = connect(addr, "red", "A").await;
    let mut b = connect(addr, "blue", "B").await;

    // Reserved type: dropped by the adapter.
    send(&mut a, &json!({"room": "red", "type": "leave", "data": null})).await;
    // Different room and sender in the frame: pinned to A's own room and id.
    send(
        &mut a,
        &json!({"room": "blue", "type": "chat", "data": 1, "sender": "B"}),
    )
    .await;

    let got = next_envelope(&mut a).await;
    assert_eq!(got["type"], "chat");
    assert_eq!(got["room"], "red");
    assert_eq!(got["sender"], "A");

    let nothing = timeout(Duration::from_millis(200), b.next()).await;
    assert!(nothing.is_err(), "blue room should receive nothing");
}

#[tokio::test]
async fn http_publish_reaches_room_members() {
    let addr = start_server().await;
    let mut a = connect(addr, "lobby", "A").await;

    let client = reqwest::Client::new();
    let Ok(response) = client
        .post(format!("http://{addr}/api/v1/rooms/lobby/messages"))
        .json(&json!({"type": "notice", "data": {"text": "maintenance"}, "target": "A"}))
        .send()
        .await
    else {
        panic!("http request failed");
    };
    assert_eq!(response.status().as_u16(), 202);

    let got = next_envelope(&mut a).await;
    assert_eq!(got["type"], "notice");
    assert_eq!(got["sender"], "server");
    assert_eq!(got["target"], "A");
    assert_eq!(got["data"]["text"], "maintenance");
}

#[tokio::test]
async fn missing_room_is_rejected_before_upgrade() {
    let addr = start_server().await;
    let result = connect_async(format!("ws://{addr}/ws?clientId=A")).await;
    let Err(tokio_tungstenite::tungstenite::Error::Http(response)) = result else {
        panic!("expected an HTTP error response");
    };
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn health_and_room_listing() {
    let addr = start_server().await;
    let _a = connect(addr, "alpha", "A").await;
    let _b = connect(addr, "beta", "B").await;

    let health = tokio_test::assert_ok!(reqwest::get(format!("http://{addr}/health")).await);
    assert_eq!(health.status().as_u16(), 200);

    let rooms = tokio_test::assert_ok!(reqwest::get(format!("http://{addr}/api/v1/rooms")).await);
    let body = tokio_test::assert_ok!(rooms.json::<Value>().await);
    assert_eq!(body["total"], 2);
    assert_eq!(body["rooms"][0]["room"], "alpha");
    assert_eq!(body["rooms"][1]["room"], "beta");
}
