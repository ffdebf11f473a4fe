//! Session configuration.

use std::path::PathBuf;
use std::time::Duration;

use odet_client::ClientConfig;
use odet_models::ModelId;

/// Video readiness polling budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollerConfig {
    /// Status queries before giving up
    pub max_attempts: u32,
    /// Delay between two status queries
    pub interval: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            max_attempts: 30,
            interval: Duration::from_millis(1000),
        }
    }
}

impl PollerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            max_attempts: std::env::var("ODET_POLL_MAX_ATTEMPTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
            interval: Duration::from_millis(
                std::env::var("ODET_POLL_INTERVAL_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(1000),
            ),
        }
    }
}

/// Everything needed to wire a detection session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub client: ClientConfig,
    pub poller: PollerConfig,
    /// Directory holding persisted custom presets
    pub presets_dir: PathBuf,
    /// Model selected when the session starts
    pub default_model: ModelId,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            client: ClientConfig::default(),
            poller: PollerConfig::default(),
            presets_dir: PathBuf::from(".odet"),
            default_model: ModelId::new(ModelId::DEFAULT),
        }
    }
}

impl SessionConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            client: ClientConfig::from_env(),
            poller: PollerConfig::from_env(),
            presets_dir: std::env::var("ODET_PRESETS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".odet")),
            default_model: std::env::var("ODET_DEFAULT_MODEL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(ModelId::new)
                .unwrap_or_else(|| ModelId::new(ModelId::DEFAULT)),
        }
    }
}
