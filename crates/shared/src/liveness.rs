//! Time-window rules that decide whether presence and typing records are
//! still trusted. All timestamps are milliseconds since the Unix epoch.

use crate::constants::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LivenessPolicy {
    /// How often a connected client refreshes its presence record.
    pub heartbeat_interval_ms: i64,
    /// Maximum age of a presence record that still counts as online.
    pub stale_window_ms: i64,
    /// Idle time after the last keystroke before a client clears its typing record.
    pub typing_debounce_ms: i64,
    /// Maximum age of a typing record that is still shown to others.
    pub typing_cutoff_ms: i64,
}

impl Default for LivenessPolicy {
    fn default() -> Self {
        Self {
            heartbeat_interval_ms: PRESENCE_HEARTBEAT_INTERVAL_MS,
            stale_window_ms: PRESENCE_STALE_WINDOW_MS,
            typing_debounce_ms: TYPING_DEBOUNCE_MS,
            typing_cutoff_ms: TYPING_CUTOFF_MS,
        }
    }
}

impl LivenessPolicy {
    pub fn new(
        heartbeat_interval_ms: i64,
        stale_window_ms: i64,
        typing_debounce_ms: i64,
        typing_cutoff_ms: i64,
    ) -> Result<Self, String> {
        let policy = Self {
            heartbeat_interval_ms,
            stale_window_ms,
            typing_debounce_ms,
            typing_cutoff_ms,
        };
        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.heartbeat_interval_ms <= 0 || self.typing_debounce_ms <= 0 {
            return Err("Heartbeat interval and typing debounce must be positive".into());
        }
        // A live client must never drop to offline between two heartbeats.
        if self.stale_window_ms <= self.heartbeat_interval_ms {
            return Err(format!(
                "Presence stale window ({}ms) must exceed the heartbeat interval ({}ms)",
                self.stale_window_ms, self.heartbeat_interval_ms
            ));
        }
        // Typing must stay visible until the client's own stop signal fires.
        if self.typing_cutoff_ms <= self.typing_debounce_ms {
            return Err(format!(
                "Typing cutoff ({}ms) must exceed the typing debounce ({}ms)",
                self.typing_cutoff_ms, self.typing_debounce_ms
            ));
        }
        Ok(())
    }

    /// A stored `online` flag only counts while its timestamp is fresh.
    pub fn is_online(&self, online: bool, last_seen_ms: i64, now_ms: i64) -> bool {
        online && now_ms - last_seen_ms < self.stale_window_ms
    }

    pub fn is_typing(&self, last_typed_at_ms: i64, now_ms: i64) -> bool {
        last_typed_at_ms > self.typing_cutoff(now_ms)
    }

    /// Typing records at or before this instant are stale.
    pub fn typing_cutoff(&self, now_ms: i64) -> i64 {
        now_ms - self.typing_cutoff_ms
    }
}

/// A message counts as unread for `viewer` when someone else sent it after
/// the viewer's last read. No read record means everything is unread.
pub fn is_unread(created_at_ms: i64, sender_id: &str, last_read_ms: Option<i64>, viewer_id: &str) -> bool {
    sender_id != viewer_id && created_at_ms > last_read_ms.unwrap_or(0)
}
