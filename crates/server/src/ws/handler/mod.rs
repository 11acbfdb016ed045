mod dispatch;
mod lifecycle;

use axum::{
    extract::{Query, State, WebSocketUpgrade, ws::{Message, WebSocket}},
    http::HeaderMap,
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::AppState;
use crate::middleware::auth::{lookup_user, session_token, verify_token};
use crate::models::AuthUser;
use crate::ws::events::ClientEvent;

#[derive(Debug, Deserialize)]
pub struct GatewayQuery {
    token: Option<String>,
}

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<GatewayQuery>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let auth_user = authenticate(&state, &headers, query.token).await;
    ws.on_upgrade(move |socket| handle_socket(socket, state, auth_user))
}

/// Browsers cannot set headers on a WebSocket handshake, so the token may
/// also arrive as a query parameter.
async fn authenticate(
    state: &AppState,
    headers: &HeaderMap,
    query_token: Option<String>,
) -> Option<AuthUser> {
    let token = query_token
        .filter(|t| !t.is_empty())
        .or_else(|| session_token(headers))?;
    let identity = verify_token(&state.config, &token)?;

    match lookup_user(&state.db, &identity).await {
        Ok(user) => user,
        Err(e) => {
            tracing::error!("Gateway auth lookup failed: {:?}", e);
            None
        }
    }
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, auth_user: Option<AuthUser>) {
    let Some(user) = auth_user else {
        tracing::debug!("Closing unauthenticated gateway connection");
        return;
    };

    let client_id = state.gateway.next_client_id().await;
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    state.gateway.register(client_id, user.id.clone(), tx).await;
    tracing::info!("{} connected to gateway (client {})", user.name, client_id);

    lifecycle::handle_connect(&state, client_id, &user).await;

    // Task to forward messages from mpsc to WebSocket
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if ws_tx.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    });

    let recv_state = state.clone();
    let recv_user = user.clone();
    let recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = ws_rx.next().await {
            match msg {
                Message::Text(text) => match serde_json::from_str::<ClientEvent>(&text) {
                    Ok(event) => {
                        dispatch::handle_client_event(&recv_state, client_id, &recv_user, event).await;
                    }
                    Err(e) => tracing::debug!("Ignoring malformed client event: {}", e),
                },
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = send_task => {},
        _ = recv_task => {},
    }

    lifecycle::handle_disconnect(&state, client_id, &user).await;
}
