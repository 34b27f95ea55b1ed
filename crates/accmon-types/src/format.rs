//! Display helpers for monitor views.
#![allow(
    clippy::integer_division,
    clippy::modulo_arithmetic,
    reason = "duration breakdown requires integer division and modulo"
)]

use chrono::{DateTime, Utc};

use crate::models::AccountStatus;
use crate::status::AccountState;

/// Format a remaining duration in milliseconds.
///
/// Examples:
/// - 65_000 -> "1m 5s"
/// - 3_700_000 -> "1h 1m"
/// - 45_000 -> "45s"
/// - 0 or negative -> "now"
pub fn format_duration(ms: i64) -> String {
    if ms <= 0 {
        return "now".to_string();
    }
    let secs = ms / 1000;
    let mins = secs / 60;
    let hours = mins / 60;

    if hours > 0 {
        format!("{}h {}m", hours, mins % 60)
    } else if mins > 0 {
        format!("{}m {}s", mins, secs % 60)
    } else {
        format!("{}s", secs)
    }
}

/// Time left until quota recovery, only when recovery is still ahead of `now`.
pub fn recovery_countdown(account: &AccountStatus, now: DateTime<Utc>) -> Option<String> {
    account
        .next_recover_at
        .filter(|at| *at > now)
        .map(|at| format_duration(at.signed_duration_since(now).num_milliseconds()))
}

/// Status line shown next to an account.
pub fn status_text(account: &AccountStatus, state: AccountState, countdown: Option<&str>) -> String {
    match state {
        AccountState::Disabled => "Disabled".to_string(),
        AccountState::Cooldown => match countdown {
            Some(left) => format!("Cooldown ({})", left),
            None => "Cooldown".to_string(),
        },
        AccountState::Error if account.status_message.is_empty() => "Error".to_string(),
        AccountState::Error => account.status_message.clone(),
        AccountState::Active => "Active".to_string(),
    }
}
