//! Accounts monitor service.
//!
//! Takes one copy of the registry list and folds it into a snapshot. No other
//! locks are taken and nothing is written back.

use std::sync::Arc;

use accmon_types::{aggregate, AccountsSnapshot, MonitorError};
use chrono::{DateTime, Utc};

use crate::registry::AccountRegistry;

#[derive(Clone)]
pub struct AccountsMonitor {
    registry: Option<Arc<dyn AccountRegistry>>,
}

impl AccountsMonitor {
    pub fn new(registry: Option<Arc<dyn AccountRegistry>>) -> Self {
        Self { registry }
    }

    pub fn snapshot(&self, now: DateTime<Utc>) -> Result<AccountsSnapshot, MonitorError> {
        let registry = self.registry.as_ref().ok_or(MonitorError::RegistryUnavailable)?;
        let accounts = registry.list();
        let snapshot = aggregate(accounts.iter().map(Option::as_deref), now);
        tracing::debug!(
            "[Monitor] Snapshot: {} total, {} active, {} cooldown, {} error",
            snapshot.total_count,
            snapshot.active_count,
            snapshot.cooldown_count,
            snapshot.error_count
        );
        Ok(snapshot)
    }
}
