use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use pairchat_shared::validation::validate_message_content;
use std::sync::Arc;

use super::{or_default, participant_conversation};
use crate::db::now_ms;
use crate::error::{ApiError, ApiResult};
use crate::models::{AuthUser, Message, MessageWithSender, SendMessageRequest};
use crate::store;
use crate::ws::events::ServerEvent;
use crate::ws::live;
use crate::AppState;

/// GET /api/conversations/:conversationId/messages
pub async fn list_messages(
    State(state): State<Arc<AppState>>,
    user: Option<AuthUser>,
    Path(conversation_id): Path<String>,
) -> Json<Vec<MessageWithSender>> {
    let Some(user) = user else {
        return Json(Vec::new());
    };

    let conversation = or_default(
        store::conversations::find_for_participant(&state.db, &conversation_id, &user.id).await,
        "conversation",
    );
    if conversation.is_none() {
        return Json(Vec::new());
    }

    Json(or_default(
        store::messages::list_with_senders(&state.db, &conversation_id).await,
        "messages",
    ))
}

/// POST /api/conversations/:conversationId/messages
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(conversation_id): Path<String>,
    Json(body): Json<SendMessageRequest>,
) -> ApiResult<Json<Message>> {
    let content = validate_message_content(&body.content).map_err(ApiError::Validation)?;
    let conversation = participant_conversation(&state, &conversation_id, &user.id).await?;

    // Sending ends the sender's typing indicator.
    live::set_typing(&state, &conversation_id, &user.id, false).await?;

    let message =
        store::messages::insert(&state.db, &conversation_id, &user.id, content, now_ms()).await?;
    tracing::debug!("{} sent message {} in {}", user.id, message.id, conversation_id);

    let sender = store::users::find_public(&state.db, &user.id).await?;
    state
        .gateway
        .broadcast_conversation(
            &conversation_id,
            &ServerEvent::Message {
                message: MessageWithSender {
                    message: message.clone(),
                    sender,
                },
            },
            None,
        )
        .await;

    let recipient = conversation.other_participant(&user.id);
    live::push_unread(&state, &conversation_id, recipient).await;

    Ok(Json(message))
}

/// DELETE /api/messages/:messageId
pub async fn delete_message(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(message_id): Path<String>,
) -> ApiResult<StatusCode> {
    let message = store::messages::find(&state.db, &message_id)
        .await?
        .ok_or(ApiError::NotFound("Message"))?;

    if message.sender_id != user.id {
        return Err(ApiError::Forbidden("You can only delete your own messages"));
    }

    if !message.is_deleted {
        store::messages::soft_delete(&state.db, &message_id).await?;
        tracing::debug!("{} deleted message {}", user.id, message_id);
    }

    state
        .gateway
        .broadcast_conversation(
            &message.conversation_id,
            &ServerEvent::MessageDelete {
                message_id,
                conversation_id: message.conversation_id.clone(),
            },
            None,
        )
        .await;

    Ok(StatusCode::NO_CONTENT)
}
