use std::time::{Duration, Instant};

/// How long a notification stays on screen.
pub const NOTIFICATION_TTL: Duration = Duration::from_secs(3);

/// Transient, auto-dismissing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub is_error: bool,
    pub expires_at: Instant,
}

impl Notification {
    pub fn new(message: impl Into<String>, is_error: bool, now: Instant) -> Self {
        Self { message: message.into(), is_error, expires_at: now + NOTIFICATION_TTL }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}
