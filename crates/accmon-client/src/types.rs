use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

/// Auto-refresh period of the monitor view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshInterval {
    Off,
    FiveSeconds,
    #[default]
    TenSeconds,
    ThirtySeconds,
    SixtySeconds,
}

impl RefreshInterval {
    pub const ALL: [Self; 5] =
        [Self::Off, Self::FiveSeconds, Self::TenSeconds, Self::ThirtySeconds, Self::SixtySeconds];

    /// Timer period, or `None` when auto-refresh is off.
    pub const fn period(self) -> Option<Duration> {
        match self {
            Self::Off => None,
            Self::FiveSeconds => Some(Duration::from_secs(5)),
            Self::TenSeconds => Some(Duration::from_secs(10)),
            Self::ThirtySeconds => Some(Duration::from_secs(30)),
            Self::SixtySeconds => Some(Duration::from_secs(60)),
        }
    }

    const fn seconds(self) -> u64 {
        match self.period() {
            Some(period) => period.as_secs(),
            None => 0,
        }
    }
}

impl fmt::Display for RefreshInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Off => f.write_str("off"),
            other => write!(f, "{}s", other.seconds()),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unsupported refresh interval '{0}' (use off, 5, 10, 30 or 60)")]
pub struct ParseIntervalError(pub String);

impl FromStr for RefreshInterval {
    type Err = ParseIntervalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().to_ascii_lowercase();
        if trimmed == "off" {
            return Ok(Self::Off);
        }
        let secs: u64 = trimmed
            .strip_suffix('s')
            .unwrap_or(&trimmed)
            .parse()
            .map_err(|_| ParseIntervalError(s.to_string()))?;
        Self::ALL
            .into_iter()
            .find(|i| i.seconds() == secs)
            .ok_or_else(|| ParseIntervalError(s.to_string()))
    }
}

/// Configuration for the accmon client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the accmon server.
    pub base_url: String,
    /// Management key sent as a bearer token, once known.
    pub management_key: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self { base_url: "http://127.0.0.1:8317".to_string(), management_key: None, timeout_secs: 30 }
    }
}
