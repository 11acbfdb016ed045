use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use super::or_default;
use crate::db::now_ms;
use crate::error::{ApiError, ApiResult};
use crate::models::{
    AuthUser, ConversationIdResponse, ConversationSummary, CreateConversationRequest,
};
use crate::store;
use crate::ws::events::ServerEvent;
use crate::AppState;

/// POST /api/conversations
pub async fn create_conversation(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(body): Json<CreateConversationRequest>,
) -> ApiResult<Json<ConversationIdResponse>> {
    if body.other_user_id == user.id {
        return Err(ApiError::Validation(
            "Cannot start a conversation with yourself".into(),
        ));
    }

    store::users::find_public(&state.db, &body.other_user_id)
        .await?
        .ok_or(ApiError::NotFound("User"))?;

    let (conversation, created) =
        store::conversations::get_or_create(&state.db, &user.id, &body.other_user_id, now_ms())
            .await?;

    if created {
        state
            .gateway
            .send_to_user(
                &body.other_user_id,
                &ServerEvent::ConversationCreated {
                    conversation_id: conversation.id.clone(),
                    user_id: user.id.clone(),
                },
            )
            .await;
    }

    Ok(Json(ConversationIdResponse {
        id: conversation.id,
    }))
}

/// GET /api/conversations
pub async fn list_conversations(
    State(state): State<Arc<AppState>>,
    user: Option<AuthUser>,
) -> Json<Vec<ConversationSummary>> {
    let Some(user) = user else {
        return Json(Vec::new());
    };
    Json(or_default(summaries(&state, &user.id).await, "conversations"))
}

async fn summaries(state: &AppState, user_id: &str) -> Result<Vec<ConversationSummary>, sqlx::Error> {
    let conversations = store::conversations::for_user(&state.db, user_id).await?;

    let mut summaries = Vec::with_capacity(conversations.len());
    for conversation in conversations {
        let other_id = conversation.other_participant(user_id);
        let other_user = store::users::find_public(&state.db, other_id).await?;
        let last_message = store::messages::latest(&state.db, &conversation.id).await?;
        let unread_count = store::reads::unread_count(&state.db, &conversation.id, user_id).await?;

        summaries.push(ConversationSummary {
            participants: conversation.participants().map(String::from),
            id: conversation.id,
            other_user,
            last_message,
            unread_count,
            created_at: conversation.created_at,
        });
    }

    summaries.sort_by_key(|s| std::cmp::Reverse(s.last_activity()));
    Ok(summaries)
}

/// GET /api/conversations/with/:userId
pub async fn conversation_with(
    State(state): State<Arc<AppState>>,
    user: Option<AuthUser>,
    Path(other_user_id): Path<String>,
) -> Json<Option<ConversationIdResponse>> {
    let Some(user) = user else {
        return Json(None);
    };
    let conversation = or_default(
        store::conversations::find_between(&state.db, &user.id, &other_user_id).await,
        "conversation",
    );
    Json(conversation.map(|c| ConversationIdResponse { id: c.id }))
}
