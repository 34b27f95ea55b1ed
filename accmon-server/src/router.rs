use axum::{http::StatusCode, middleware, response::IntoResponse, routing::get, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::middleware::{cors_layer, management_auth_middleware};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let security = state.inner.security.clone();

    let protected_api = api::management_router()
        .layer(middleware::from_fn_with_state(security, management_auth_middleware));

    // The dashboard page is public so a browser can load it and then ask for the key.
    let public_routes = api::public_router()
        .route("/health", get(health_check))
        .route("/healthz", get(health_check))
        .route("/version", get(version_info));

    protected_api
        .merge(public_routes)
        .with_state(state)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(cors_layer()))
}

async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, axum::Json(serde_json::json!({"status": "ok"})))
}

async fn version_info() -> impl IntoResponse {
    (StatusCode::OK, axum::Json(serde_json::json!({ "version": env!("CARGO_PKG_VERSION") })))
}
