use crate::AppState;
use crate::models::AuthUser;
use crate::store;
use crate::ws::events::{ClientEvent, ServerEvent};
use crate::ws::gateway::ClientId;
use crate::ws::live;

pub(super) async fn handle_client_event(
    state: &AppState,
    client_id: ClientId,
    user: &AuthUser,
    event: ClientEvent,
) {
    match event {
        ClientEvent::JoinConversation { conversation_id } => {
            if !ensure_participant(state, client_id, user, &conversation_id).await {
                return;
            }
            state
                .gateway
                .subscribe_conversation(client_id, &conversation_id)
                .await;
            // Opening a conversation counts as reading it.
            if let Err(e) = live::mark_read(state, &conversation_id, &user.id).await {
                tracing::warn!("Failed to mark {} read for {}: {:?}", conversation_id, user.id, e);
            }
            state
                .gateway
                .push_typers(&state.db, &state.policy, &conversation_id)
                .await;
        }
        ClientEvent::LeaveConversation { conversation_id } => {
            state
                .gateway
                .unsubscribe_conversation(client_id, &conversation_id)
                .await;
        }
        ClientEvent::Heartbeat { online } => {
            if let Err(e) = live::set_online(state, &user.id, online).await {
                tracing::warn!("Heartbeat write failed for {}: {:?}", user.id, e);
            }
        }
        ClientEvent::Typing {
            conversation_id,
            active,
        } => {
            if !ensure_participant(state, client_id, user, &conversation_id).await {
                return;
            }
            if let Err(e) = live::set_typing(state, &conversation_id, &user.id, active).await {
                tracing::warn!("Typing write failed for {}: {:?}", user.id, e);
            }
        }
        ClientEvent::MarkRead { conversation_id } => {
            if !ensure_participant(state, client_id, user, &conversation_id).await {
                return;
            }
            if let Err(e) = live::mark_read(state, &conversation_id, &user.id).await {
                tracing::warn!("Failed to mark {} read for {}: {:?}", conversation_id, user.id, e);
            }
        }
        ClientEvent::Ping => {
            state.gateway.send_to(client_id, &ServerEvent::Pong).await;
        }
    }
}

/// Reply with an error event unless the user takes part in the conversation.
async fn ensure_participant(
    state: &AppState,
    client_id: ClientId,
    user: &AuthUser,
    conversation_id: &str,
) -> bool {
    let message = match store::conversations::find_for_participant(&state.db, conversation_id, &user.id).await {
        Ok(Some(_)) => return true,
        Ok(None) => "Conversation not found",
        Err(e) => {
            tracing::error!("Conversation lookup failed: {:?}", e);
            "Database error"
        }
    };

    state
        .gateway
        .send_to(
            client_id,
            &ServerEvent::Error {
                message: message.to_string(),
            },
        )
        .await;
    false
}
