use serde::{Deserialize, Serialize};

use super::PublicUser;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PresenceRecord {
    pub user_id: String,
    pub is_online: bool,
    pub last_seen: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetOnlineRequest {
    pub is_online: bool,
}

#[derive(Debug, Serialize)]
pub struct OnlineResponse {
    pub online: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetTypingRequest {
    pub is_typing: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingUser {
    pub user: PublicUser,
    pub last_typed_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ReadRecord {
    pub conversation_id: String,
    pub user_id: String,
    pub last_read_at: i64,
}

#[derive(Debug, Serialize)]
pub struct UnreadResponse {
    pub count: i64,
}
