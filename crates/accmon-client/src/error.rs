//! Error types for the accmon client.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when talking to the monitor endpoint.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Failed to establish connection to the server.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// No accmon server found at any discovery location.
    #[error("Server not found at any discovery location")]
    ServerNotFound,

    /// HTTP request failed.
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server rejected the request for lack of (valid) credentials.
    #[error("HTTP {status}: management key required")]
    Unauthorized {
        /// 401 or 403.
        status: u16,
    },

    /// Server returned a non-success status other than an auth challenge.
    #[error("HTTP {status}: {message}")]
    ServerError {
        /// HTTP status code.
        status: u16,
        /// Error message from server.
        message: String,
    },

    /// Server returned an invalid or unparseable response.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Management key could not be read or written.
    #[error(transparent)]
    Credentials(#[from] CredentialError),

    /// Terminal output failed.
    #[error("Terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// Whether this error should trigger a management key prompt.
    pub const fn is_auth_challenge(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }
}

/// Errors from the management key store.
#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("Cannot determine home directory")]
    NoHomeDir,

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
