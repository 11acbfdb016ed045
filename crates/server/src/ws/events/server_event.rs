use serde::Serialize;
use std::collections::HashMap;

use crate::models::{MessageWithSender, TypingUser};

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    Ready {
        #[serde(rename = "userId")]
        user_id: String,
        presence: HashMap<String, bool>,
    },
    Message {
        message: MessageWithSender,
    },
    MessageDelete {
        #[serde(rename = "messageId")]
        message_id: String,
        #[serde(rename = "conversationId")]
        conversation_id: String,
    },
    ConversationCreated {
        #[serde(rename = "conversationId")]
        conversation_id: String,
        #[serde(rename = "userId")]
        user_id: String,
    },
    /// Everyone currently typing; clients drop their own entry.
    Typing {
        #[serde(rename = "conversationId")]
        conversation_id: String,
        typers: Vec<TypingUser>,
    },
    Presence {
        #[serde(rename = "userId")]
        user_id: String,
        online: bool,
    },
    ReactionAdd {
        #[serde(rename = "messageId")]
        message_id: String,
        #[serde(rename = "userId")]
        user_id: String,
        emoji: String,
    },
    ReactionRemove {
        #[serde(rename = "messageId")]
        message_id: String,
        #[serde(rename = "userId")]
        user_id: String,
        emoji: String,
    },
    UnreadCount {
        #[serde(rename = "conversationId")]
        conversation_id: String,
        count: i64,
    },
    Pong,
    Error {
        message: String,
    },
}
