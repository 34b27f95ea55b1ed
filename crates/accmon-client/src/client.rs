use std::time::Duration;

use accmon_types::AccountsSnapshot;
use reqwest::{Client, StatusCode};

use crate::error::ClientError;
use crate::types::ClientConfig;

/// JSON snapshot endpoint.
pub const SNAPSHOT_PATH: &str = "/v0/management/accounts-monitor";

#[derive(Clone)]
pub struct MonitorClient {
    client: Client,
    config: ClientConfig,
}

impl MonitorClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    /// Probe the usual local addresses and connect to the first live server.
    pub async fn auto_discover(management_key: Option<String>) -> Result<Self, ClientError> {
        for base_url in discovery_candidates() {
            if let Ok(client) = Self::try_connect(&base_url, management_key.clone()).await {
                tracing::info!("Connected to accmon at {}", base_url);
                return Ok(client);
            }
        }
        Err(ClientError::ServerNotFound)
    }

    async fn try_connect(base_url: &str, management_key: Option<String>) -> Result<Self, ClientError> {
        let config =
            ClientConfig { base_url: base_url.to_string(), management_key, ..Default::default() };
        let client = Self::new(config)?;
        let resp = client
            .client
            .get(client.url("/health"))
            .timeout(Duration::from_secs(2))
            .send()
            .await
            .map_err(|e| ClientError::Connection(e.to_string()))?;
        if resp.status().is_success() {
            Ok(client)
        } else {
            Err(ClientError::Connection(format!("Health check failed: {}", resp.status())))
        }
    }

    /// Fetch the current accounts snapshot.
    ///
    /// 401 and 403 come back as [`ClientError::Unauthorized`] so callers can
    /// prompt for a management key.
    pub async fn fetch_snapshot(&self) -> Result<AccountsSnapshot, ClientError> {
        let mut request = self.client.get(self.url(SNAPSHOT_PATH));
        if let Some(key) = self.config.management_key.as_deref().filter(|k| !k.is_empty()) {
            request = request.bearer_auth(key);
        }

        let resp = request.send().await?;
        let status = resp.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ClientError::Unauthorized { status: status.as_u16() });
        }

        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(ClientError::ServerError { status: status.as_u16(), message });
        }

        resp.json().await.map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Client for the same server using a different management key.
    pub fn with_management_key(&self, key: impl Into<String>) -> Result<Self, ClientError> {
        let config = ClientConfig { management_key: Some(key.into()), ..self.config.clone() };
        Self::new(config)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }
}

fn discovery_candidates() -> Vec<String> {
    let mut candidates = Vec::new();
    if let Ok(url) = std::env::var("ACCMON_URL") {
        candidates.push(url);
    }
    if let Ok(port) = std::env::var("ACCMON_PORT") {
        candidates.push(format!("http://127.0.0.1:{}", port));
    }
    candidates.push("http://127.0.0.1:8317".to_string());
    candidates
}
