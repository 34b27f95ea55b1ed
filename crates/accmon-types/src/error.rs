//! Typed errors for the accounts monitor endpoint.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Request-fatal conditions of the monitor endpoint.
///
/// Partial data (bad metadata, missing optional fields) is never an error;
/// it is dropped from the projection.
#[derive(Debug, Clone, Copy, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum MonitorError {
    /// The monitor handler was not wired into the server
    #[error("handler not initialized")]
    NotInitialized,

    /// The account registry collaborator is missing
    #[error("auth manager not available")]
    RegistryUnavailable,
}

impl MonitorError {
    /// HTTP status code reported for this error.
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::NotInitialized => 500,
            Self::RegistryUnavailable => 503,
        }
    }

    /// Short message carried in the `{"error": ...}` response body.
    pub const fn message(&self) -> &'static str {
        match self {
            Self::NotInitialized => "handler not initialized",
            Self::RegistryUnavailable => "auth manager not available",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(MonitorError::NotInitialized.http_status(), 500);
        assert_eq!(MonitorError::RegistryUnavailable.http_status(), 503);
    }

    #[test]
    fn test_display() {
        assert_eq!(MonitorError::RegistryUnavailable.to_string(), "auth manager not available");
        assert_eq!(MonitorError::NotInitialized.message(), MonitorError::NotInitialized.to_string());
    }
}
