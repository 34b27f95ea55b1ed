//! Provider and status filtering over snapshot accounts.

use chrono::{DateTime, Utc};

use crate::models::AccountStatus;
use crate::status::{classify, AccountState};

/// Conjunction of an optional provider substring and an optional state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountFilter {
    provider: Option<String>,
    status: Option<AccountState>,
}

impl AccountFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Case-insensitive substring match on the provider. Empty clears.
    #[must_use]
    pub fn with_provider(mut self, provider: Option<&str>) -> Self {
        self.set_provider(provider);
        self
    }

    #[must_use]
    pub fn with_status(mut self, status: Option<AccountState>) -> Self {
        self.status = status;
        self
    }

    pub fn set_provider(&mut self, provider: Option<&str>) {
        self.provider = provider
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_lowercase);
    }

    pub fn set_status(&mut self, status: Option<AccountState>) {
        self.status = status;
    }

    pub fn provider(&self) -> Option<&str> {
        self.provider.as_deref()
    }

    pub const fn status(&self) -> Option<AccountState> {
        self.status
    }

    pub const fn is_empty(&self) -> bool {
        self.provider.is_none() && self.status.is_none()
    }

    /// Whether `account` passes both filters when classified at `now`.
    pub fn matches(&self, account: &AccountStatus, now: DateTime<Utc>) -> bool {
        if let Some(provider) = &self.provider {
            if !account.provider.to_lowercase().contains(provider.as_str()) {
                return false;
            }
        }
        if let Some(status) = self.status {
            if classify(account, now) != status {
                return false;
            }
        }
        true
    }

    /// Matching accounts, in snapshot order.
    pub fn apply<'a>(&self, accounts: &'a [AccountStatus], now: DateTime<Utc>) -> Vec<&'a AccountStatus> {
        accounts.iter().filter(|a| self.matches(a, now)).collect()
    }
}
