//! Snapshot aggregation.

use chrono::{DateTime, Utc};

use crate::models::{AccountRecord, AccountStatus, AccountsSnapshot, LastErrorView};
use crate::status::{classify, AccountState};

/// Project a registry record into its wire form.
///
/// Optional display fields are only set when the underlying data is present.
pub fn project(record: &AccountRecord) -> AccountStatus {
    AccountStatus {
        id: record.id.clone(),
        provider: record.provider.clone(),
        label: record.label.clone(),
        email: record.email().map(str::to_string),
        status: record.status.clone(),
        status_message: record.status_message.clone(),
        disabled: record.disabled,
        unavailable: record.unavailable,
        quota_exceeded: record.quota.exceeded,
        quota_reason: record.quota.reason.clone().unwrap_or_default(),
        next_recover_at: record.quota.next_recover_at,
        next_retry_at: record.next_retry_after,
        backoff_level: record.quota.backoff_level,
        last_error: record.last_error.as_ref().map(LastErrorView::from),
        last_refresh: record.last_refresh(),
        created_at: record.created_at,
        updated_at: record.updated_at,
        index: record.index,
    }
}

/// Build a snapshot from a point-in-time list of records.
///
/// Absent entries are skipped. Order is preserved. Disabled accounts count
/// towards `total_count` only.
pub fn aggregate<'a, I>(accounts: I, now: DateTime<Utc>) -> AccountsSnapshot
where
    I: IntoIterator<Item = Option<&'a AccountRecord>>,
{
    let mut snapshot = AccountsSnapshot::empty(now);

    for record in accounts.into_iter().flatten() {
        snapshot.accounts.push(project(record));
        snapshot.total_count += 1;

        match classify(record, now) {
            AccountState::Disabled => {},
            AccountState::Cooldown => snapshot.cooldown_count += 1,
            AccountState::Error => snapshot.error_count += 1,
            AccountState::Active => snapshot.active_count += 1,
        }
    }

    snapshot
}
