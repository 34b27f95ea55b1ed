//! Core domain models for the accounts monitor.
//!
//! `AccountRecord` is what the registry owns; `AccountStatus` and
//! `AccountsSnapshot` are the wire payload served to monitor clients.

mod metadata;
mod record;
mod snapshot;

pub use metadata::{extract_email, extract_last_refresh, Metadata, LAST_REFRESH_KEYS};
pub use record::{AccountRecord, LastError, QuotaState};
pub use snapshot::{AccountStatus, AccountsSnapshot, LastErrorView};
