//! Account status classification.
//!
//! One classifier serves both the server-side aggregator (over registry
//! records) and the client-side filter (over the wire projection). Both types
//! implement [`Classify`], so the precedence rules live in exactly one place.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{AccountRecord, AccountStatus};

/// Registry status tag that marks an account as errored.
pub const ERROR_STATUS: &str = "error";

/// Operational state of an account as seen by the monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountState {
    Active,
    Error,
    Cooldown,
    Disabled,
}

impl AccountState {
    pub const ALL: [Self; 4] = [Self::Active, Self::Cooldown, Self::Error, Self::Disabled];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Error => "error",
            Self::Cooldown => "cooldown",
            Self::Disabled => "disabled",
        }
    }
}

impl fmt::Display for AccountState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown account state '{0}' (expected active, error, cooldown or disabled)")]
pub struct ParseStateError(pub String);

impl FromStr for AccountState {
    type Err = ParseStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|state| state.as_str() == lower)
            .ok_or_else(|| ParseStateError(s.to_string()))
    }
}

/// Read-only view of the fields the classifier inspects.
pub trait Classify {
    fn is_disabled(&self) -> bool;
    fn is_quota_exceeded(&self) -> bool;
    fn is_unavailable(&self) -> bool;
    fn next_recover_at(&self) -> Option<DateTime<Utc>>;
    fn status_tag(&self) -> &str;
}

/// Classify an account at `now`.
///
/// Precedence, first match wins:
/// 1. disabled
/// 2. quota exceeded → cooldown
/// 3. unavailable with a recovery time strictly after `now` → cooldown
/// 4. unavailable, or registry status `"error"` → error
/// 5. active
pub fn classify<A: Classify + ?Sized>(account: &A, now: DateTime<Utc>) -> AccountState {
    if account.is_disabled() {
        return AccountState::Disabled;
    }
    if account.is_quota_exceeded() {
        return AccountState::Cooldown;
    }
    let unavailable = account.is_unavailable();
    if unavailable && account.next_recover_at().is_some_and(|at| at > now) {
        return AccountState::Cooldown;
    }
    if unavailable || account.status_tag() == ERROR_STATUS {
        return AccountState::Error;
    }
    AccountState::Active
}

impl Classify for AccountRecord {
    fn is_disabled(&self) -> bool {
        self.disabled
    }

    fn is_quota_exceeded(&self) -> bool {
        self.quota.exceeded
    }

    fn is_unavailable(&self) -> bool {
        self.unavailable
    }

    fn next_recover_at(&self) -> Option<DateTime<Utc>> {
        self.quota.next_recover_at
    }

    fn status_tag(&self) -> &str {
        &self.status
    }
}

impl Classify for AccountStatus {
    fn is_disabled(&self) -> bool {
        self.disabled
    }

    fn is_quota_exceeded(&self) -> bool {
        self.quota_exceeded
    }

    fn is_unavailable(&self) -> bool {
        self.unavailable
    }

    fn next_recover_at(&self) -> Option<DateTime<Utc>> {
        self.next_recover_at
    }

    fn status_tag(&self) -> &str {
        &self.status
    }
}
