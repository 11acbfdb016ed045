#![allow(dead_code)]

use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio_tungstenite::tungstenite::Message;

use pairchat_shared::liveness::LivenessPolicy;

pub type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

/// Start the test app on a random TCP port and return the base URL.
pub async fn start_server() -> (String, sqlx::SqlitePool) {
    start_server_with_policy(LivenessPolicy::default()).await
}

pub async fn start_server_with_policy(policy: LivenessPolicy) -> (String, sqlx::SqlitePool) {
    let (base, pool, _) = start_server_with_http(policy).await;
    (base, pool)
}

/// Serve the gateway over TCP and hand back an in-process HTTP client bound to
/// the same state, so REST writes show up as gateway pushes.
pub async fn start_server_with_http(
    policy: LivenessPolicy,
) -> (String, sqlx::SqlitePool, axum_test::TestServer) {
    let pool = super::setup_test_db().await;
    let state = super::create_test_state(pool.clone(), policy);
    let app = pairchat_server::routes::build_router(state.clone());
    let http = axum_test::TestServer::new(pairchat_server::routes::build_router(state)).unwrap();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base = format!("http://127.0.0.1:{}", addr.port());

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Give the server a moment to start
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    (base, pool, http)
}

/// Connect a WebSocket with a session token.
pub async fn ws_connect(
    base: &str,
    token: &str,
) -> WsStream {
    let ws_url = format!(
        "{}/gateway?token={}",
        base.replace("http://", "ws://"),
        token
    );
    let (ws, _) = tokio_tungstenite::connect_async(&ws_url).await.unwrap();
    ws
}

/// Read next text message parsed as JSON, with timeout.
pub async fn recv_json(
    ws: &mut WsStream,
) -> Option<Value> {
    let timeout = tokio::time::timeout(std::time::Duration::from_secs(3), ws.next()).await;
    match timeout {
        Ok(Some(Ok(Message::Text(text)))) => serde_json::from_str(&text).ok(),
        _ => None,
    }
}

/// Read until an event of the given type arrives, skipping everything else.
pub async fn recv_event(ws: &mut WsStream, event_type: &str) -> Option<Value> {
    let deadline = tokio::time::Instant::now() + std::time::Duration::from_secs(3);
    loop {
        let remaining = deadline.checked_duration_since(tokio::time::Instant::now())?;
        match tokio::time::timeout(remaining, ws.next()).await {
            Ok(Some(Ok(Message::Text(text)))) => {
                if let Ok(v) = serde_json::from_str::<Value>(&text) {
                    if v["type"] == event_type {
                        return Some(v);
                    }
                }
            }
            Ok(Some(Ok(_))) => continue,
            _ => return None,
        }
    }
}

/// Drain all pending messages until timeout.
pub async fn drain_messages(
    ws: &mut WsStream,
) -> Vec<Value> {
    let mut messages = Vec::new();
    loop {
        let timeout =
            tokio::time::timeout(std::time::Duration::from_millis(200), ws.next()).await;
        match timeout {
            Ok(Some(Ok(Message::Text(text)))) => {
                if let Ok(v) = serde_json::from_str::<Value>(&text) {
                    messages.push(v);
                }
            }
            _ => break,
        }
    }
    messages
}

/// Send a JSON message over WebSocket.
pub async fn send_json(
    ws: &mut WsStream,
    value: &Value,
) {
    ws.send(Message::Text(serde_json::to_string(value).unwrap().into()))
        .await
        .unwrap();
}
