use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub external_id: String,
    pub name: String,
    pub email: String,
    pub image_url: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Profile fields other participants may see.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: String,
    pub name: String,
    pub image_url: Option<String>,
}

/// Profile fields mirrored from the identity provider on every login.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncUserRequest {
    pub name: String,
    pub email: String,
    pub image_url: Option<String>,
}
