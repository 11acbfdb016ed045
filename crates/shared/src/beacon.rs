//! Client-side timers that drive the presence and typing trackers.
//!
//! Both state machines are clock-agnostic: callers pass the current time in
//! milliseconds and forward the returned signal to the server.

use crate::constants::{PRESENCE_HEARTBEAT_INTERVAL_MS, TYPING_DEBOUNCE_MS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypingSignal {
    Typing,
    Stopped,
}

impl TypingSignal {
    pub fn is_typing(self) -> bool {
        matches!(self, TypingSignal::Typing)
    }
}

/// Re-arms on every keystroke and emits `Stopped` once input goes idle.
#[derive(Debug, Clone)]
pub struct TypingDebouncer {
    debounce_ms: i64,
    deadline: Option<i64>,
}

impl Default for TypingDebouncer {
    fn default() -> Self {
        Self::new(TYPING_DEBOUNCE_MS)
    }
}

impl TypingDebouncer {
    pub fn new(debounce_ms: i64) -> Self {
        Self {
            debounce_ms,
            deadline: None,
        }
    }

    /// Every keystroke refreshes the server-side record.
    pub fn keystroke(&mut self, now_ms: i64) -> TypingSignal {
        self.deadline = Some(now_ms + self.debounce_ms);
        TypingSignal::Typing
    }

    /// Fires `Stopped` once the idle deadline has passed.
    pub fn poll(&mut self, now_ms: i64) -> Option<TypingSignal> {
        match self.deadline {
            Some(deadline) if now_ms >= deadline => {
                self.deadline = None;
                Some(TypingSignal::Stopped)
            }
            _ => None,
        }
    }

    pub fn deadline(&self) -> Option<i64> {
        self.deadline
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Sending clears the record right away instead of waiting for idle.
    pub fn message_sent(&mut self) -> TypingSignal {
        self.deadline = None;
        TypingSignal::Stopped
    }

    /// Navigating away or unmounting always clears the record.
    pub fn teardown(&mut self) -> TypingSignal {
        self.deadline = None;
        TypingSignal::Stopped
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Hidden,
}

/// Heartbeat schedule plus visibility and unload courtesy signals.
///
/// Each method that returns `Some(online)` (or a bare `bool`) means the
/// client should send `setOnline(online)`.
#[derive(Debug, Clone)]
pub struct PresenceBeacon {
    interval_ms: i64,
    next_beat: Option<i64>,
    visibility: Visibility,
}

impl Default for PresenceBeacon {
    fn default() -> Self {
        Self::new(PRESENCE_HEARTBEAT_INTERVAL_MS)
    }
}

impl PresenceBeacon {
    pub fn new(interval_ms: i64) -> Self {
        Self {
            interval_ms,
            next_beat: None,
            visibility: Visibility::Visible,
        }
    }

    pub fn mount(&mut self, now_ms: i64) -> bool {
        self.visibility = Visibility::Visible;
        self.next_beat = Some(now_ms + self.interval_ms);
        true
    }

    /// Heartbeats report the current visibility so a hidden tab stays offline.
    pub fn tick(&mut self, now_ms: i64) -> Option<bool> {
        let due = self.next_beat?;
        if now_ms < due {
            return None;
        }
        self.next_beat = Some(now_ms + self.interval_ms);
        Some(self.visibility == Visibility::Visible)
    }

    pub fn visibility_changed(&mut self, visibility: Visibility) -> Option<bool> {
        if self.visibility == visibility {
            return None;
        }
        self.visibility = visibility;
        Some(visibility == Visibility::Visible)
    }

    pub fn unload(&mut self) -> bool {
        self.next_beat = None;
        false
    }

    pub fn teardown(&mut self) -> bool {
        self.unload()
    }

    pub fn is_running(&self) -> bool {
        self.next_beat.is_some()
    }
}
