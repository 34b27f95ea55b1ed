//! Account Registry
//!
//! The monitor only ever reads the registry, through [`AccountRegistry::list`],
//! which hands out a point-in-time copy of the shared record handles. Slots may
//! be empty (`None`) for accounts removed while a copy was being taken.
//!
//! [`MemoryRegistry`] is the in-process implementation. It is seeded from an
//! auth directory of `*.json` records and can be re-seeded in the background.

mod loader;
mod reload;

use std::path::Path;
use std::sync::Arc;

use accmon_types::AccountRecord;
use parking_lot::RwLock;

pub use loader::{load_auth_dir, RegistryError};
pub use reload::start_reload;

/// Source of account records.
pub trait AccountRegistry: Send + Sync {
    /// Point-in-time copy of the account list.
    fn list(&self) -> Vec<Option<Arc<AccountRecord>>>;
}

#[derive(Default)]
pub struct MemoryRegistry {
    accounts: RwLock<Vec<Option<Arc<AccountRecord>>>>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<AccountRecord>) -> Self {
        let registry = Self::new();
        registry.replace(records);
        registry
    }

    /// Load every record in `dir`.
    pub fn load_dir(dir: &Path) -> Result<Self, RegistryError> {
        Ok(Self::from_records(load_auth_dir(dir)?))
    }

    /// Swap in a new record list. Readers see either the old or the new list.
    pub fn replace(&self, records: Vec<AccountRecord>) {
        let next: Vec<_> = records.into_iter().map(|r| Some(Arc::new(r))).collect();
        *self.accounts.write() = next;
    }

    pub fn len(&self) -> usize {
        self.accounts.read().iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AccountRegistry for MemoryRegistry {
    fn list(&self) -> Vec<Option<Arc<AccountRecord>>> {
        self.accounts.read().clone()
    }
}
