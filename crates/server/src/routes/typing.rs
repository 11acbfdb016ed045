use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use super::{or_default, participant_conversation};
use crate::db::now_ms;
use crate::error::ApiResult;
use crate::models::{AuthUser, SetTypingRequest, TypingUser};
use crate::store;
use crate::ws::live;
use crate::AppState;

/// POST /api/conversations/:conversationId/typing
pub async fn set_typing(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(conversation_id): Path<String>,
    Json(body): Json<SetTypingRequest>,
) -> ApiResult<StatusCode> {
    participant_conversation(&state, &conversation_id, &user.id).await?;
    live::set_typing(&state, &conversation_id, &user.id, body.is_typing).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/conversations/:conversationId/typing
///
/// Other participants currently typing; the caller is never included.
pub async fn list_typers(
    State(state): State<Arc<AppState>>,
    user: Option<AuthUser>,
    Path(conversation_id): Path<String>,
) -> Json<Vec<TypingUser>> {
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
        store::typing::typers(
            &state.db,
            &state.policy,
            &conversation_id,
            Some(&user.id),
            now_ms(),
        )
        .await,
        "typers",
    ))
}
