use crate::AppState;
use crate::db::now_ms;
use crate::models::AuthUser;
use crate::store;
use crate::ws::events::ServerEvent;
use crate::ws::gateway::ClientId;
use crate::ws::live;

/// Mark the user online and hand the new client a presence snapshot.
pub async fn handle_connect(state: &AppState, client_id: ClientId, user: &AuthUser) {
    if let Err(e) = live::set_online(state, &user.id, true).await {
        tracing::warn!("Failed to mark {} online: {:?}", user.id, e);
    }

    let presence = match store::presence::all(&state.db, &state.policy, now_ms()).await {
        Ok(presence) => presence,
        Err(e) => {
            tracing::warn!("Failed to load presence snapshot: {:?}", e);
            Default::default()
        }
    };

    state
        .gateway
        .send_to(
            client_id,
            &ServerEvent::Ready {
                user_id: user.id.clone(),
                presence,
            },
        )
        .await;
}

pub async fn handle_disconnect(state: &AppState, client_id: ClientId, user: &AuthUser) {
    state.gateway.unregister(client_id).await;
    tracing::info!("{} disconnected from gateway (client {})", user.name, client_id);

    match store::typing::clear_user(&state.db, &user.id).await {
        Ok(conversations) => {
            for conversation_id in conversations {
                state
                    .gateway
                    .cancel_typing_expiry(&conversation_id, &user.id)
                    .await;
                state
                    .gateway
                    .push_typers(&state.db, &state.policy, &conversation_id)
                    .await;
            }
        }
        Err(e) => tracing::warn!("Failed to clear typing for {}: {:?}", user.id, e),
    }

    // Other tabs may still be open; only the last connection takes the user
    // offline.
    if state.gateway.connection_count(&user.id).await > 0 {
        return;
    }

    if let Err(e) = live::set_online(state, &user.id, false).await {
        tracing::warn!("Failed to mark {} offline: {:?}", user.id, e);
    }
}
