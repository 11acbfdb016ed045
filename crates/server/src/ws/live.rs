//! Tracker writes followed by a push of the recomputed view to every client
//! whose view depends on the changed record. Used by both the HTTP routes and
//! the gateway so the two paths stay identical.

use crate::db::now_ms;
use crate::store;
use crate::ws::events::ServerEvent;
use crate::AppState;

pub async fn set_online(state: &AppState, user_id: &str, online: bool) -> Result<(), sqlx::Error> {
    store::presence::set_online(&state.db, user_id, online, now_ms()).await?;
    tracing::debug!("Presence for {} set to {}", user_id, online);
    push_presence(state, user_id).await;
    Ok(())
}

/// Broadcast the user's derived presence if it differs from the last push.
pub async fn push_presence(state: &AppState, user_id: &str) {
    let refreshed = state
        .gateway
        .refresh_presence(&state.db, &state.policy, user_id, now_ms())
        .await;
    let online = match refreshed {
        Ok(Some(online)) => online,
        Ok(None) => return,
        Err(e) => {
            tracing::warn!("Failed to derive presence for {}: {:?}", user_id, e);
            return;
        }
    };

    state
        .gateway
        .broadcast_all(
            &ServerEvent::Presence {
                user_id: user_id.to_string(),
                online,
            },
            None,
        )
        .await;
}

pub async fn set_typing(
    state: &AppState,
    conversation_id: &str,
    user_id: &str,
    active: bool,
) -> Result<(), sqlx::Error> {
    store::typing::set_typing(&state.db, conversation_id, user_id, active, now_ms()).await?;

    if active {
        state
            .gateway
            .schedule_typing_expiry(
                conversation_id.to_string(),
                user_id.to_string(),
                state.db.clone(),
                state.policy,
            )
            .await;
    } else {
        state
            .gateway
            .cancel_typing_expiry(conversation_id, user_id)
            .await;
    }

    state
        .gateway
        .push_typers(&state.db, &state.policy, conversation_id)
        .await;
    Ok(())
}

pub async fn mark_read(state: &AppState, conversation_id: &str, user_id: &str) -> Result<(), sqlx::Error> {
    store::reads::mark_read(&state.db, conversation_id, user_id, now_ms()).await?;
    push_unread(state, conversation_id, user_id).await;
    Ok(())
}

/// Send a user's recomputed unread count to all of their connections.
pub async fn push_unread(state: &AppState, conversation_id: &str, user_id: &str) {
    match store::reads::unread_count(&state.db, conversation_id, user_id).await {
        Ok(count) => {
            state
                .gateway
                .send_to_user(
                    user_id,
                    &ServerEvent::UnreadCount {
                        conversation_id: conversation_id.to_string(),
                        count,
                    },
                )
                .await;
        }
        Err(e) => tracing::warn!("Failed to count unread for {}: {:?}", user_id, e),
    }
}
