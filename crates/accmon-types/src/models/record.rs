//! Registry-side account record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::metadata::{extract_email, extract_last_refresh, Metadata};

/// Quota and backoff state tracked by the account manager.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct QuotaState {
    /// Upstream reported the quota as exhausted
    #[serde(default)]
    pub exceeded: bool,
    /// Human-readable reason attached by the account manager
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Current backoff step (0 = no backoff)
    #[serde(default)]
    pub backoff_level: u32,
    /// When the account manager expects the quota to recover
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_recover_at: Option<DateTime<Utc>>,
}

/// Last upstream error observed for an account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct LastError {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
}

/// Authentication account as held by the account registry.
///
/// The monitor never mutates these; it only reads them through a
/// point-in-time copy of the registry list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccountRecord {
    /// Opaque unique identifier
    pub id: String,
    /// Backend type tag (`codex`, `claude`, `gemini`, ...)
    pub provider: String,
    /// Display label
    #[serde(default)]
    pub label: String,
    /// Registry status tag; `"error"` is significant for classification
    #[serde(default)]
    pub status: String,
    /// Free text shown when the account is classified as error
    #[serde(default)]
    pub status_message: String,
    /// Administratively turned off
    #[serde(default)]
    pub disabled: bool,
    /// Currently not serving traffic
    #[serde(default)]
    pub unavailable: bool,
    #[serde(default)]
    pub quota: QuotaState,
    /// General retry backoff, distinct from quota recovery
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_retry_after: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<LastError>,
    /// Free-form provider metadata
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
    /// Ordinal assigned by the registry (display only)
    #[serde(default)]
    pub index: u64,
}

impl AccountRecord {
    /// Create a nominal record for the given ID and provider.
    pub fn new(id: impl Into<String>, provider: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            provider: provider.into(),
            label: String::new(),
            status: "active".to_string(),
            status_message: String::new(),
            disabled: false,
            unavailable: false,
            quota: QuotaState::default(),
            next_retry_after: None,
            last_error: None,
            metadata: Metadata::new(),
            created_at: now,
            updated_at: now,
            index: 0,
        }
    }

    /// Email address from metadata, if stored as a string.
    pub fn email(&self) -> Option<&str> {
        extract_email(&self.metadata)
    }

    /// Last credential refresh time from metadata, if recognizable.
    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        extract_last_refresh(&self.metadata)
    }
}
