//! # accmon Types
//!
//! Account model, status classification and snapshot aggregation for the
//! accounts monitor.
//!
//! - **`models`** - Registry records (`AccountRecord`) and the wire projection
//!   (`AccountStatus`, `AccountsSnapshot`)
//! - **`status`** - The precedence-ordered classifier shared by server and client
//! - **`aggregate`** - Folds records into a counted snapshot
//! - **`filter`** - Provider/status filtering over a snapshot
//! - **`format`** - Countdown and duration formatting
//! - **`error`** - Typed monitor errors
//!
//! ## Architecture Role
//!
//! ```text
//!                 accmon-types (this crate)
//!                        │
//!            ┌───────────┴───────────┐
//!            ▼                       ▼
//!      accmon-server           accmon-client
//!   (aggregate + classify)   (classify + filter)
//! ```
//!
//! Nothing in this crate performs I/O. `now` is always passed in.

pub mod aggregate;
pub mod error;
pub mod filter;
pub mod format;
pub mod models;
pub mod status;

pub use aggregate::{aggregate, project};
pub use error::MonitorError;
pub use filter::AccountFilter;
pub use format::{format_duration, recovery_countdown, status_text};
pub use models::{
    AccountRecord, AccountStatus, AccountsSnapshot, LastError, LastErrorView, Metadata,
    QuotaState,
};
pub use status::{classify, AccountState, Classify, ParseStateError};
