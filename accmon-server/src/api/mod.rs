//! API Routes
//!
//! Read-only management endpoints of the accounts monitor.

pub mod monitor;

#[cfg(test)]
mod monitor_tests;

use axum::{routing::get, Router};

use crate::state::AppState;

pub const MONITOR_PATH: &str = "/v0/management/accounts-monitor";
pub const MONITOR_PAGE_PATH: &str = "/v0/management/accounts-monitor/page";

/// Routes that require the management key.
pub fn management_router() -> Router<AppState> {
    Router::new().route(MONITOR_PATH, get(monitor::get_accounts_monitor))
}

/// Routes served without authentication.
pub fn public_router() -> Router<AppState> {
    Router::new().route(MONITOR_PAGE_PATH, get(monitor::serve_monitor_page))
}
