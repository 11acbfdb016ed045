use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use super::{or_default, participant_conversation};
use crate::error::ApiResult;
use crate::models::{AuthUser, UnreadResponse};
use crate::store;
use crate::ws::live;
use crate::AppState;

/// POST /api/conversations/:conversationId/read
pub async fn mark_read(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(conversation_id): Path<String>,
) -> ApiResult<StatusCode> {
    participant_conversation(&state, &conversation_id, &user.id).await?;
    live::mark_read(&state, &conversation_id, &user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/conversations/:conversationId/unread
pub async fn unread_count(
    State(state): State<Arc<AppState>>,
    user: Option<AuthUser>,
    Path(conversation_id): Path<String>,
) -> Json<UnreadResponse> {
    let Some(user) = user else {
        return Json(UnreadResponse { count: 0 });
    };

    let conversation = or_default(
        store::conversations::find_for_participant(&state.db, &conversation_id, &user.id).await,
        "conversation",
    );
    let count = match conversation {
        Some(_) => or_default(
            store::reads::unread_count(&state.db, &conversation_id, &user.id).await,
            "unread count",
        ),
        None => 0,
    };
    Json(UnreadResponse { count })
}
