use serde::{Deserialize, Serialize};

use super::{Message, PublicUser};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    pub user_low_id: String,
    pub user_high_id: String,
    pub created_at: i64,
}

impl Conversation {
    pub fn has_participant(&self, user_id: &str) -> bool {
        self.user_low_id == user_id || self.user_high_id == user_id
    }

    /// The participant that is not `user_id`.
    pub fn other_participant(&self, user_id: &str) -> &str {
        if self.user_low_id == user_id {
            &self.user_high_id
        } else {
            &self.user_low_id
        }
    }

    pub fn participants(&self) -> [&str; 2] {
        [&self.user_low_id, &self.user_high_id]
    }
}

/// Order a pair of user ids so both directions of contact share one key.
pub fn canonical_pair<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateConversationRequest {
    pub other_user_id: String,
}

#[derive(Debug, Serialize)]
pub struct ConversationIdResponse {
    pub id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    pub id: String,
    pub participants: [String; 2],
    pub other_user: Option<PublicUser>,
    pub last_message: Option<Message>,
    pub unread_count: i64,
    pub created_at: i64,
}

impl ConversationSummary {
    /// Sort key for the conversation list: latest message, else creation.
    pub fn last_activity(&self) -> i64 {
        self.last_message
            .as_ref()
            .map(|m| m.created_at)
            .unwrap_or(self.created_at)
    }
}
