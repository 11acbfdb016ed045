use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::collections::HashMap;
use std::sync::Arc;

use super::or_default;
use crate::db::now_ms;
use crate::error::ApiResult;
use crate::models::{AuthUser, OnlineResponse, SetOnlineRequest};
use crate::store;
use crate::ws::live;
use crate::AppState;

/// POST /api/presence
pub async fn set_presence(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(body): Json<SetOnlineRequest>,
) -> ApiResult<StatusCode> {
    live::set_online(&state, &user.id, body.is_online).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/presence
pub async fn all_presence(
    State(state): State<Arc<AppState>>,
    user: Option<AuthUser>,
) -> Json<HashMap<String, bool>> {
    if user.is_none() {
        return Json(HashMap::new());
    }
    Json(or_default(
        store::presence::all(&state.db, &state.policy, now_ms()).await,
        "presence",
    ))
}

/// GET /api/presence/:userId
pub async fn user_presence(
    State(state): State<Arc<AppState>>,
    user: Option<AuthUser>,
    Path(user_id): Path<String>,
) -> Json<OnlineResponse> {
    let online = match user {
        Some(_) => or_default(
            store::presence::is_online(&state.db, &state.policy, &user_id, now_ms()).await,
            "presence",
        ),
        None => false,
    };
    Json(OnlineResponse { online })
}
