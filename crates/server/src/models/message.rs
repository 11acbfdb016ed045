use pairchat_shared::constants::DELETED_MESSAGE_PLACEHOLDER;
use serde::{Deserialize, Serialize};

use super::PublicUser;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    pub content: String,
    pub created_at: i64,
    pub is_deleted: bool,
}

impl Message {
    /// Hide the content of a soft-deleted message from readers.
    pub fn redacted(mut self) -> Self {
        if self.is_deleted {
            self.content = DELETED_MESSAGE_PLACEHOLDER.to_string();
        }
        self
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageWithSender {
    #[serde(flatten)]
    pub message: Message,
    pub sender: Option<PublicUser>,
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Reaction {
    pub id: String,
    pub message_id: String,
    pub user_id: String,
    pub emoji: String,
    pub created_at: i64,
}

#[derive(Debug, Deserialize)]
pub struct ToggleReactionRequest {
    pub emoji: String,
}

#[derive(Debug, Serialize)]
pub struct ToggleReactionResponse {
    pub added: bool,
}

/// Reactions on one message grouped by emoji, as seen by one viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionSummary {
    pub emoji: String,
    pub count: i64,
    pub has_reacted: bool,
}

/// Group reactions by emoji, keeping the order each emoji first appeared.
pub fn summarize_reactions(reactions: &[Reaction], viewer_id: &str) -> Vec<ReactionSummary> {
    let mut grouped: Vec<ReactionSummary> = Vec::new();
    for reaction in reactions {
        let idx = match grouped.iter().position(|s| s.emoji == reaction.emoji) {
            Some(idx) => idx,
            None => {
                grouped.push(ReactionSummary {
                    emoji: reaction.emoji.clone(),
                    count: 0,
                    has_reacted: false,
                });
                grouped.len() - 1
            }
        };
        grouped[idx].count += 1;
        if reaction.user_id == viewer_id {
            grouped[idx].has_reacted = true;
        }
    }
    grouped
}
