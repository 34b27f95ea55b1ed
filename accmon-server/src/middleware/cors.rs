use axum::http::Method;
use tower_http::cors::{Any, CorsLayer};

/// Read-only surface: any origin may GET, credentials are never shared.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::HEAD, Method::OPTIONS])
        .allow_headers(Any)
        .allow_credentials(false)
        .max_age(std::time::Duration::from_secs(3600))
}
