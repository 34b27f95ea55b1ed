//! Test helpers for accmon-server unit tests.

use std::sync::Arc;

use accmon_types::AccountRecord;
use chrono::{Duration, Utc};

use crate::middleware::SecurityConfig;
use crate::registry::{AccountRegistry, MemoryRegistry};
use crate::state::AppState;

pub const TEST_KEY: &str = "test-management-key";

/// Registry returning a fixed slot list, including empty slots.
pub struct SparseRegistry(pub Vec<Option<Arc<AccountRecord>>>);

impl AccountRegistry for SparseRegistry {
    fn list(&self) -> Vec<Option<Arc<AccountRecord>>> {
        self.0.clone()
    }
}

/// One account per classification: disabled, cooldown, error, active.
pub fn sample_records() -> Vec<AccountRecord> {
    let mut disabled = AccountRecord::new("acc-disabled", "codex");
    disabled.disabled = true;
    disabled.index = 0;

    let mut cooling = AccountRecord::new("acc-cooldown", "claude");
    cooling.quota.exceeded = true;
    cooling.quota.reason = Some("daily limit".to_string());
    cooling.quota.backoff_level = 2;
    cooling.quota.next_recover_at = Some(Utc::now() + Duration::minutes(30));
    cooling.index = 1;

    let mut broken = AccountRecord::new("acc-error", "gemini");
    broken.unavailable = true;
    broken.status_message = "refresh token revoked".to_string();
    broken.index = 2;

    let mut active = AccountRecord::new("acc-active", "codex");
    active.metadata.insert("email".to_string(), serde_json::json!("ops@example.com"));
    active.index = 3;

    vec![disabled, cooling, broken, active]
}

/// `AppState` over [`sample_records`] guarded by [`TEST_KEY`].
pub fn test_app_state() -> AppState {
    let registry: Arc<dyn AccountRegistry> = Arc::new(MemoryRegistry::from_records(sample_records()));
    AppState::new(Some(registry), SecurityConfig::new(Some(TEST_KEY.to_string())))
}
