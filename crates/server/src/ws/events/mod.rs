mod server_event;

pub use server_event::ServerEvent;

use serde::Deserialize;

// ── Client → Server Events ──

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    JoinConversation {
        #[serde(rename = "conversationId")]
        conversation_id: String,
    },
    LeaveConversation {
        #[serde(rename = "conversationId")]
        conversation_id: String,
    },
    /// Periodic presence refresh; `online: false` is the hidden/unload courtesy signal.
    Heartbeat {
        #[serde(default = "default_online")]
        online: bool,
    },
    Typing {
        #[serde(rename = "conversationId")]
        conversation_id: String,
        active: bool,
    },
    MarkRead {
        #[serde(rename = "conversationId")]
        conversation_id: String,
    },
    Ping,
}

fn default_online() -> bool {
    true
}
