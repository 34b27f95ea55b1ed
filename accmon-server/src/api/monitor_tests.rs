use std::sync::Arc;

use accmon_types::{AccountsSnapshot, MonitorError};
use axum::extract::State;
use axum::http::{header, HeaderName, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum_test::TestServer;

use super::monitor::{get_accounts_monitor, MonitorErrorResponse};
use super::{MONITOR_PAGE_PATH, MONITOR_PATH};
use crate::middleware::SecurityConfig;
use crate::registry::{AccountRegistry, MemoryRegistry};
use crate::router::build_router;
use crate::state::AppState;
use crate::test_helpers::{test_app_state, TEST_KEY};

fn server(state: AppState) -> TestServer {
    TestServer::new(build_router(state)).unwrap()
}

fn bearer() -> HeaderValue {
    HeaderValue::from_str(&format!("Bearer {}", TEST_KEY)).unwrap()
}

#[tokio::test]
async fn test_handler_returns_classified_snapshot() {
    let Ok(axum::Json(snapshot)) = get_accounts_monitor(State(test_app_state())).await else {
        panic!("expected a snapshot");
    };
    assert_eq!(snapshot.total_count, 4);
    assert_eq!(snapshot.active_count, 1);
    assert_eq!(snapshot.error_count, 1);
    assert_eq!(snapshot.cooldown_count, 1);
    assert!(snapshot.accounts.iter().any(|a| a.id == "acc-disabled" && a.disabled));
}

#[tokio::test]
async fn test_monitor_requires_key() {
    let server = server(test_app_state());

    server.get(MONITOR_PATH).await.assert_status(StatusCode::UNAUTHORIZED);
    server
        .get(MONITOR_PATH)
        .add_header(header::AUTHORIZATION, HeaderValue::from_static("Bearer wrong"))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_monitor_with_bearer_key() {
    let server = server(test_app_state());

    let response = server.get(MONITOR_PATH).add_header(header::AUTHORIZATION, bearer()).await;
    response.assert_status_ok();

    let snapshot: AccountsSnapshot = response.json();
    assert_eq!(snapshot.total_count, 4);
    assert_eq!(snapshot.accounts.len(), 4);
    assert!(snapshot.is_consistent());
}

#[tokio::test]
async fn test_monitor_with_management_key_header() {
    let server = server(test_app_state());

    server
        .get(MONITOR_PATH)
        .add_header(HeaderName::from_static("x-management-key"), HeaderValue::from_static(TEST_KEY))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_monitor_rejects_all_without_configured_key() {
    let registry: Arc<dyn AccountRegistry> = Arc::new(MemoryRegistry::new());
    let server = server(AppState::new(Some(registry), SecurityConfig::default()));

    server
        .get(MONITOR_PATH)
        .add_header(header::AUTHORIZATION, HeaderValue::from_static("Bearer "))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    server.get(MONITOR_PAGE_PATH).await.assert_status_ok();
}

#[tokio::test]
async fn test_missing_registry_is_503() {
    let state = AppState::new(None, SecurityConfig::new(Some(TEST_KEY.to_string())));
    let response = server(state).get(MONITOR_PATH).add_header(header::AUTHORIZATION, bearer()).await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    response.assert_json(&serde_json::json!({"error": "auth manager not available"}));
}

#[tokio::test]
async fn test_uninitialized_handler_is_500() {
    let state = AppState::with_monitor(None, SecurityConfig::new(Some(TEST_KEY.to_string())));
    let response = server(state).get(MONITOR_PATH).add_header(header::AUTHORIZATION, bearer()).await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    response.assert_json(&serde_json::json!({"error": "handler not initialized"}));
}

#[tokio::test]
async fn test_empty_registry_snapshot() {
    let registry: Arc<dyn AccountRegistry> = Arc::new(MemoryRegistry::new());
    let state = AppState::new(Some(registry), SecurityConfig::new(Some(TEST_KEY.to_string())));
    let response = server(state).get(MONITOR_PATH).add_header(header::AUTHORIZATION, bearer()).await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["total_count"], 0);
    assert_eq!(body["accounts"], serde_json::json!([]));
}

#[tokio::test]
async fn test_wire_omits_absent_fields() {
    let server = server(test_app_state());
    let body: serde_json::Value =
        server.get(MONITOR_PATH).add_header(header::AUTHORIZATION, bearer()).await.json();

    let active = body["accounts"]
        .as_array()
        .unwrap()
        .iter()
        .find(|a| a["id"] == "acc-active")
        .unwrap();
    assert_eq!(active["email"], "ops@example.com");
    for absent in ["last_error", "next_recover_at", "quota_reason", "status_message", "last_refresh"] {
        assert!(active.get(absent).is_none(), "{absent} should be omitted");
    }

    let cooling = body["accounts"]
        .as_array()
        .unwrap()
        .iter()
        .find(|a| a["id"] == "acc-cooldown")
        .unwrap();
    assert_eq!(cooling["quota_reason"], "daily limit");
    assert_eq!(cooling["backoff_level"], 2);
    assert!(cooling.get("next_recover_at").is_some());
}

#[tokio::test]
async fn test_page_is_public_html() {
    let server = server(test_app_state());
    let response = server.get(MONITOR_PAGE_PATH).await;

    response.assert_status_ok();
    let content_type = response.header(header::CONTENT_TYPE);
    assert_eq!(content_type.to_str().unwrap(), "text/html; charset=utf-8");
    let body = response.text();
    assert!(body.contains("accounts-monitor"));
    // An elapsed recovery time must not keep an unavailable account in cooldown.
    assert!(body.contains("new Date(a.next_recover_at).getTime() > now) return 'cooldown'"));
    let disabled = body.find("if (a.disabled) return 'disabled'").unwrap();
    let unavailable = body.find("if (a.unavailable || a.status === 'error') return 'error'").unwrap();
    assert!(disabled < unavailable);
}

#[tokio::test]
async fn test_health_is_public() {
    let server = server(test_app_state());
    for path in ["/health", "/healthz"] {
        let response = server.get(path).await;
        response.assert_status_ok();
        response.assert_json(&serde_json::json!({"status": "ok"}));
    }
}

#[test]
fn test_error_response_status() {
    let response = MonitorErrorResponse(MonitorError::RegistryUnavailable).into_response();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}
