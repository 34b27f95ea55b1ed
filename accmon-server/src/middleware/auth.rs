use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
};
use subtle::ConstantTimeEq;

/// Alternative to `Authorization: Bearer` for management requests.
pub const MANAGEMENT_KEY_HEADER: &str = "x-management-key";

#[derive(Debug, Clone, Default)]
pub struct SecurityConfig {
    management_key: Option<String>,
}

impl SecurityConfig {
    /// Blank keys count as not configured.
    pub fn new(management_key: Option<String>) -> Self {
        let management_key = management_key.map(|k| k.trim().to_string()).filter(|k| !k.is_empty());
        Self { management_key }
    }

    pub fn has_key(&self) -> bool {
        self.management_key.is_some()
    }

    fn accepts(&self, presented: Option<&str>) -> bool {
        match (self.management_key.as_deref(), presented) {
            (Some(expected), Some(presented)) => constant_time_compare(presented, expected),
            _ => false,
        }
    }
}

fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

fn presented_key(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .or_else(|| request.headers().get(MANAGEMENT_KEY_HEADER).and_then(|h| h.to_str().ok()))
        .map(str::trim)
}

/// Require the management key. With no key configured every request is denied.
pub async fn management_auth_middleware(
    State(security): State<Arc<SecurityConfig>>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if request.method() == axum::http::Method::OPTIONS {
        return Ok(next.run(request).await);
    }

    if !security.has_key() {
        tracing::warn!("[Auth] Management key not configured; denying {}", request.uri().path());
        return Err(StatusCode::UNAUTHORIZED);
    }

    if security.accepts(presented_key(&request)) {
        Ok(next.run(request).await)
    } else {
        tracing::debug!("[Auth] Rejected management request to {}", request.uri().path());
        Err(StatusCode::UNAUTHORIZED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("abc", "abc"));
        assert!(!constant_time_compare("abc", "abd"));
        assert!(!constant_time_compare("ab", "abc"));
    }

    #[test]
    fn test_blank_key_is_unset() {
        assert!(!SecurityConfig::new(Some("   ".to_string())).has_key());
        assert!(!SecurityConfig::new(None).has_key());
        assert!(SecurityConfig::new(Some(" k ".to_string())).accepts(Some("k")));
    }

    #[test]
    fn test_accepts_requires_both_sides() {
        let security = SecurityConfig::new(Some("secret".to_string()));
        assert!(security.accepts(Some("secret")));
        assert!(!security.accepts(Some("Secret")));
        assert!(!security.accepts(None));
        assert!(!SecurityConfig::default().accepts(Some("")));
    }
}
