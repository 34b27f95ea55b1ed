//! # accmon Client
//!
//! Talks to the accounts monitor endpoint and renders it in a terminal.
//!
//! - [`MonitorClient`] fetches `AccountsSnapshot` payloads, attaching the
//!   management key as a bearer token when one is known.
//! - [`CredentialStore`] persists the management key between runs.
//! - [`watch`] drives the polling monitor view on a single-threaded runtime.

mod client;
mod credentials;
mod error;
mod types;
pub mod view;
pub mod watch;

pub use client::{MonitorClient, SNAPSHOT_PATH};
pub use credentials::CredentialStore;
pub use error::{ClientError, CredentialError};
pub use types::{ClientConfig, ParseIntervalError, RefreshInterval};
