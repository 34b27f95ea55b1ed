//! Accounts monitor handlers

use accmon_types::{AccountsSnapshot, MonitorError};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Json, Response},
};

use crate::state::AppState;

/// Self-contained dashboard polling [`get_accounts_monitor`].
pub const MONITOR_PAGE_HTML: &str = include_str!("../../assets/account_monitor.html");

/// `{"error": "..."}` response for a [`MonitorError`].
#[derive(Debug)]
pub struct MonitorErrorResponse(pub MonitorError);

impl From<MonitorError> for MonitorErrorResponse {
    fn from(err: MonitorError) -> Self {
        Self(err)
    }
}

impl IntoResponse for MonitorErrorResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(serde_json::json!({ "error": self.0.message() }))).into_response()
    }
}

pub async fn get_accounts_monitor(
    State(state): State<AppState>,
) -> Result<Json<AccountsSnapshot>, MonitorErrorResponse> {
    match state.accounts_snapshot() {
        Ok(snapshot) => Ok(Json(snapshot)),
        Err(e) => {
            tracing::warn!("[Monitor] Snapshot unavailable: {}", e);
            Err(e.into())
        },
    }
}

pub async fn serve_monitor_page() -> impl IntoResponse {
    ([(header::CACHE_CONTROL, "no-cache")], Html(MONITOR_PAGE_HTML))
}
