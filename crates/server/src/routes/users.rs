use axum::{
    extract::{Query, State},
    Json,
};
use pairchat_shared::validation::{validate_display_name, validate_email};
use serde::Deserialize;
use std::sync::Arc;

use super::or_default;
use crate::db::now_ms;
use crate::error::{ApiError, ApiResult};
use crate::models::{AuthUser, Identity, PublicUser, SyncUserRequest, User};
use crate::store;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct UserSearchQuery {
    pub q: Option<String>,
}

/// POST /api/users/sync
pub async fn sync_user(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Json(body): Json<SyncUserRequest>,
) -> ApiResult<Json<User>> {
    validate_display_name(&body.name).map_err(ApiError::Validation)?;
    validate_email(&body.email).map_err(ApiError::Validation)?;

    let image_url = body
        .image_url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty());

    let user = store::users::upsert_by_external_id(
        &state.db,
        &identity.subject,
        body.name.trim(),
        body.email.trim(),
        image_url,
        now_ms(),
    )
    .await?;

    tracing::info!("Synced user {} ({})", user.id, user.name);
    Ok(Json(user))
}

/// GET /api/users/me
pub async fn get_me(
    State(state): State<Arc<AppState>>,
    user: Option<AuthUser>,
) -> Json<Option<User>> {
    let Some(user) = user else {
        return Json(None);
    };
    Json(or_default(store::users::find(&state.db, &user.id).await, "current user"))
}

/// GET /api/users
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    user: Option<AuthUser>,
    Query(query): Query<UserSearchQuery>,
) -> Json<Vec<PublicUser>> {
    let Some(user) = user else {
        return Json(Vec::new());
    };
    Json(or_default(
        store::users::search(&state.db, &user.id, query.q.as_deref()).await,
        "users",
    ))
}
