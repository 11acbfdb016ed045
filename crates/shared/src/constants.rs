pub const APP_NAME: &str = "Pairchat";

// Limits
pub const MAX_MESSAGE_LENGTH: usize = 4000;
pub const MAX_DISPLAY_NAME_LENGTH: usize = 64;
pub const MAX_EMAIL_LENGTH: usize = 254;
pub const MAX_EMOJI_LENGTH: usize = 32;

/// Rendered in place of the content of a soft-deleted message.
pub const DELETED_MESSAGE_PLACEHOLDER: &str = "This message was deleted";

// Presence
pub const PRESENCE_HEARTBEAT_INTERVAL_MS: i64 = 30_000;
pub const PRESENCE_STALE_WINDOW_MS: i64 = 35_000;

// Typing
pub const TYPING_DEBOUNCE_MS: i64 = 1_000;
pub const TYPING_CUTOFF_MS: i64 = 1_500;
