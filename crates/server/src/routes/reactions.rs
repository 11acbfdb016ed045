use axum::{
    extract::{Path, State},
    Json,
};
use pairchat_shared::validation::validate_emoji;
use std::sync::Arc;

use super::{or_default, participant_conversation};
use crate::db::now_ms;
use crate::error::{ApiError, ApiResult};
use crate::models::{
    summarize_reactions, AuthUser, ReactionSummary, ToggleReactionRequest, ToggleReactionResponse,
};
use crate::store;
use crate::ws::events::ServerEvent;
use crate::AppState;

/// POST /api/messages/:messageId/reactions
pub async fn toggle_reaction(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(message_id): Path<String>,
    Json(body): Json<ToggleReactionRequest>,
) -> ApiResult<Json<ToggleReactionResponse>> {
    validate_emoji(&body.emoji).map_err(ApiError::Validation)?;

    let message = store::messages::find(&state.db, &message_id)
        .await?
        .ok_or(ApiError::NotFound("Message"))?;
    participant_conversation(&state, &message.conversation_id, &user.id).await?;

    if message.is_deleted {
        return Err(ApiError::Conflict("Cannot react to a deleted message"));
    }

    let added =
        store::reactions::toggle(&state.db, &message_id, &user.id, &body.emoji, now_ms()).await?;

    let event = if added {
        ServerEvent::ReactionAdd {
            message_id,
            user_id: user.id,
            emoji: body.emoji,
        }
    } else {
        ServerEvent::ReactionRemove {
            message_id,
            user_id: user.id,
            emoji: body.emoji,
        }
    };
    state
        .gateway
        .broadcast_conversation(&message.conversation_id, &event, None)
        .await;

    Ok(Json(ToggleReactionResponse { added }))
}

/// GET /api/messages/:messageId/reactions
pub async fn list_reactions(
    State(state): State<Arc<AppState>>,
    user: Option<AuthUser>,
    Path(message_id): Path<String>,
) -> Json<Vec<ReactionSummary>> {
    let Some(user) = user else {
        return Json(Vec::new());
    };

    let message = match or_default(store::messages::find(&state.db, &message_id).await, "message") {
        Some(message) if !message.is_deleted => message,
        // Reactions on a deleted message are hidden along with its content.
        _ => return Json(Vec::new()),
    };

    let visible = or_default(
        store::conversations::find_for_participant(&state.db, &message.conversation_id, &user.id)
            .await,
        "conversation",
    );
    if visible.is_none() {
        return Json(Vec::new());
    }

    let reactions = or_default(
        store::reactions::for_message(&state.db, &message_id).await,
        "reactions",
    );
    Json(summarize_reactions(&reactions, &user.id))
}
