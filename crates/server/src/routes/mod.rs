pub mod conversations;
pub mod messages;
pub mod presence;
pub mod reactions;
pub mod reads;
pub mod typing;
pub mod users;

use crate::error::{ApiError, ApiResult};
use crate::models::Conversation;
use crate::store;
use crate::ws;
use crate::AppState;
use axum::{routing::{delete, get, post}, Router};
use std::sync::Arc;

pub fn build_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Users
        .route("/users/sync", post(users::sync_user))
        .route("/users/me", get(users::get_me))
        .route("/users", get(users::list_users))
        // Conversations
        .route("/conversations", post(conversations::create_conversation))
        .route("/conversations", get(conversations::list_conversations))
        .route("/conversations/with/{userId}", get(conversations::conversation_with))
        .route("/conversations/{conversationId}/messages", get(messages::list_messages))
        .route("/conversations/{conversationId}/messages", post(messages::send_message))
        .route("/conversations/{conversationId}/typing", post(typing::set_typing))
        .route("/conversations/{conversationId}/typing", get(typing::list_typers))
        .route("/conversations/{conversationId}/read", post(reads::mark_read))
        .route("/conversations/{conversationId}/unread", get(reads::unread_count))
        // Messages
        .route("/messages/{messageId}", delete(messages::delete_message))
        .route("/messages/{messageId}/reactions", post(reactions::toggle_reaction))
        .route("/messages/{messageId}/reactions", get(reactions::list_reactions))
        // Presence
        .route("/presence", post(presence::set_presence))
        .route("/presence", get(presence::all_presence))
        .route("/presence/{userId}", get(presence::user_presence));

    Router::new()
        .nest("/api", api_routes)
        .route("/gateway", get(ws::handler::ws_handler))
        .with_state(state)
}

/// Load a conversation for a mutation by one of its participants.
pub(crate) async fn participant_conversation(
    state: &AppState,
    conversation_id: &str,
    user_id: &str,
) -> ApiResult<Conversation> {
    let conversation = store::conversations::find(&state.db, conversation_id)
        .await?
        .ok_or(ApiError::NotFound("Conversation"))?;
    if !conversation.has_participant(user_id) {
        return Err(ApiError::Forbidden("Not a participant in this conversation"));
    }
    Ok(conversation)
}

/// Queries answer with an empty default rather than an error; store failures
/// are only logged.
pub(crate) fn or_default<T: Default>(result: Result<T, sqlx::Error>, what: &str) -> T {
    result.unwrap_or_else(|e| {
        tracing::error!("Failed to load {}: {:?}", what, e);
        T::default()
    })
}
