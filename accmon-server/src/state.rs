//! Application State
//!
//! Holds the shared state of the server: the accounts monitor service and the
//! management security settings.

use std::sync::Arc;

use accmon_types::{AccountsSnapshot, MonitorError};
use chrono::Utc;

use crate::middleware::SecurityConfig;
use crate::monitor::AccountsMonitor;
use crate::registry::AccountRegistry;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub inner: Arc<AppStateInner>,
}

pub struct AppStateInner {
    /// `None` until the monitor handler has been wired up
    pub monitor: Option<AccountsMonitor>,
    pub security: Arc<SecurityConfig>,
}

impl AppState {
    pub fn new(registry: Option<Arc<dyn AccountRegistry>>, security: SecurityConfig) -> Self {
        Self::with_monitor(Some(AccountsMonitor::new(registry)), security)
    }

    pub fn with_monitor(monitor: Option<AccountsMonitor>, security: SecurityConfig) -> Self {
        Self { inner: Arc::new(AppStateInner { monitor, security: Arc::new(security) }) }
    }

    pub fn accounts_snapshot(&self) -> Result<AccountsSnapshot, MonitorError> {
        let monitor = self.inner.monitor.as_ref().ok_or(MonitorError::NotInitialized)?;
        monitor.snapshot(Utc::now())
    }
}
