//! Wire payload of the accounts monitor endpoint.
//!
//! Field names and omit-when-absent rules are a compatibility surface for
//! dashboard clients: optional fields are skipped, never serialized as `null`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::record::LastError;

/// Populated sub-fields of an account's last error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct LastErrorView {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
}

impl From<&LastError> for LastErrorView {
    fn from(err: &LastError) -> Self {
        let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());
        Self {
            code: non_empty(&err.code),
            message: non_empty(&err.message),
            http_status: err.http_status.filter(|s| *s != 0),
        }
    }
}

/// Flattened, read-only view of one account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccountStatus {
    pub id: String,
    pub provider: String,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub status_message: String,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub unavailable: bool,
    #[serde(default)]
    pub quota_exceeded: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub quota_reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_recover_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_retry_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub backoff_level: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<LastErrorView>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_refresh: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub index: u64,
}

impl AccountStatus {
    /// Best display name: email, then label, then a placeholder.
    pub fn display_name(&self) -> &str {
        match self.email.as_deref() {
            Some(email) if !email.is_empty() => email,
            _ if !self.label.is_empty() => &self.label,
            _ => "Unknown",
        }
    }
}

/// Point-in-time classification of every account in the registry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccountsSnapshot {
    pub timestamp: DateTime<Utc>,
    pub total_count: usize,
    pub active_count: usize,
    pub error_count: usize,
    pub cooldown_count: usize,
    pub accounts: Vec<AccountStatus>,
}

impl AccountsSnapshot {
    /// Empty snapshot taken at `timestamp`.
    pub fn empty(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            total_count: 0,
            active_count: 0,
            error_count: 0,
            cooldown_count: 0,
            accounts: Vec::new(),
        }
    }

    /// Accounts counted in `total_count` but in none of the three buckets.
    pub fn disabled_count(&self) -> usize {
        self.total_count
            .saturating_sub(self.active_count + self.error_count + self.cooldown_count)
    }

    /// Whether the counts agree with the account list.
    pub fn is_consistent(&self) -> bool {
        self.total_count == self.accounts.len()
            && self.active_count + self.error_count + self.cooldown_count <= self.total_count
    }
}
