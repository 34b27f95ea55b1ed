//! Monitor view state.
//!
//! The view cycles `Idle → Fetching → (Rendered | Errored) → Idle`. It holds
//! the last good snapshot, the active filters and at most one notification.
//! A failed fetch never clears the snapshot.

mod notification;
pub mod render;

use std::time::Instant;

use accmon_types::{
    classify, recovery_countdown, status_text, AccountFilter, AccountState, AccountStatus,
    AccountsSnapshot,
};
use chrono::{DateTime, Utc};

use crate::error::ClientError;
use crate::types::RefreshInterval;

pub use notification::{Notification, NOTIFICATION_TTL};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewPhase {
    Idle,
    Fetching,
    Rendered,
    Errored,
}

/// What a completed fetch did to the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Rendered,
    Errored,
    AuthChallenge,
}

/// One account prepared for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountCard {
    pub state: AccountState,
    pub title: String,
    pub subtitle: String,
    pub provider: String,
    pub status_text: String,
    pub recovery_in: Option<String>,
    pub quota_reason: Option<String>,
    pub backoff_level: Option<u32>,
    pub last_refresh: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
    pub error_message: Option<String>,
}

impl AccountCard {
    pub fn from_status(account: &AccountStatus, now: DateTime<Utc>) -> Self {
        let state = classify(account, now);
        let recovery_in = recovery_countdown(account, now);
        let short_id: String = account.id.chars().take(20).collect();

        Self {
            state,
            title: account.display_name().to_string(),
            subtitle: format!("#{} • {}...", account.index, short_id),
            provider: account.provider.clone(),
            status_text: status_text(account, state, recovery_in.as_deref()),
            recovery_in,
            quota_reason: (!account.quota_reason.is_empty()).then(|| account.quota_reason.clone()),
            backoff_level: (account.backoff_level > 0).then_some(account.backoff_level),
            last_refresh: account.last_refresh,
            updated_at: account.updated_at,
            error_message: account
                .last_error
                .as_ref()
                .and_then(|e| e.message.clone())
                .filter(|m| !m.is_empty()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MonitorView {
    phase: ViewPhase,
    in_flight: usize,
    snapshot: Option<AccountsSnapshot>,
    filter: AccountFilter,
    interval: RefreshInterval,
    notification: Option<Notification>,
    awaiting_key: bool,
}

impl MonitorView {
    pub fn new(filter: AccountFilter, interval: RefreshInterval) -> Self {
        Self {
            phase: ViewPhase::Idle,
            in_flight: 0,
            snapshot: None,
            filter,
            interval,
            notification: None,
            awaiting_key: false,
        }
    }

    pub const fn phase(&self) -> ViewPhase {
        self.phase
    }

    /// Busy indicator: true while any fetch is outstanding.
    pub const fn is_busy(&self) -> bool {
        self.in_flight > 0
    }

    pub const fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub const fn snapshot(&self) -> Option<&AccountsSnapshot> {
        self.snapshot.as_ref()
    }

    pub const fn filter(&self) -> &AccountFilter {
        &self.filter
    }

    pub fn filter_mut(&mut self) -> &mut AccountFilter {
        &mut self.filter
    }

    pub const fn interval(&self) -> RefreshInterval {
        self.interval
    }

    pub fn set_interval(&mut self, interval: RefreshInterval) {
        self.interval = interval;
    }

    pub const fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }

    pub const fn is_awaiting_key(&self) -> bool {
        self.awaiting_key
    }

    /// Leave key-prompt mode (key submitted or prompt dismissed).
    pub fn end_key_prompt(&mut self) {
        self.awaiting_key = false;
    }

    /// Record a newly started fetch. Overlapping fetches are allowed.
    pub fn begin_fetch(&mut self) {
        self.in_flight += 1;
        self.phase = ViewPhase::Fetching;
    }

    pub fn finish_fetch(
        &mut self,
        result: Result<AccountsSnapshot, ClientError>,
        now: Instant,
    ) -> FetchOutcome {
        self.in_flight = self.in_flight.saturating_sub(1);
        match result {
            Ok(snapshot) => {
                self.snapshot = Some(snapshot);
                self.phase = ViewPhase::Rendered;
                FetchOutcome::Rendered
            },
            Err(e) if e.is_auth_challenge() => {
                tracing::debug!("[Monitor] Auth challenge: {}", e);
                self.awaiting_key = true;
                self.phase = ViewPhase::Idle;
                FetchOutcome::AuthChallenge
            },
            Err(e) => {
                tracing::warn!("[Monitor] Fetch failed: {}", e);
                self.notify(format!("Failed to fetch accounts: {}", e), true, now);
                self.phase = ViewPhase::Errored;
                FetchOutcome::Errored
            },
        }
    }

    /// Return to idle once a rendered or errored frame has been drawn.
    pub fn settle(&mut self) {
        if matches!(self.phase, ViewPhase::Rendered | ViewPhase::Errored) {
            self.phase = if self.in_flight > 0 { ViewPhase::Fetching } else { ViewPhase::Idle };
        }
    }

    pub fn notify(&mut self, message: impl Into<String>, is_error: bool, now: Instant) {
        self.notification = Some(Notification::new(message, is_error, now));
    }

    /// Drop an expired notification. Returns true if one was removed.
    pub fn dismiss_expired(&mut self, now: Instant) -> bool {
        if self.notification.as_ref().is_some_and(|n| n.is_expired(now)) {
            self.notification = None;
            return true;
        }
        false
    }

    pub fn notification_deadline(&self) -> Option<Instant> {
        self.notification.as_ref().map(|n| n.expires_at)
    }

    /// Filtered accounts of the current snapshot, classified at `now`.
    pub fn cards(&self, now: DateTime<Utc>) -> Vec<AccountCard> {
        self.snapshot
            .as_ref()
            .map(|s| {
                self.filter
                    .apply(&s.accounts, now)
                    .into_iter()
                    .map(|a| AccountCard::from_status(a, now))
                    .collect()
            })
            .unwrap_or_default()
    }
}
