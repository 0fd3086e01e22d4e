//! Configuration for the control-plane client.
//!
//! # Configuration Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `endpoint` | `""` | Base URL the wire target is appended to |
//! | `max_attempts` | 3 | Attempts per call under the default retry policy |
//! | `retry_delay_ms` | 1000 | First backoff of the default policy |
//! | `max_retry_delay_ms` | 30000 | Backoff ceiling of the default policy |
//! | `request_timeout_ms` | 30000 | Per-attempt transport timeout |
//! | `connection_timeout_secs` | 30 | Connect timeout |
//! | `enable_logging` | false | Emit retry warnings through `tracing` |
//! | `auto_correlation_id` | true | Generate `opc-request-id` when the caller has none |
//!
//! Every key is optional in the JSON config file:
//!
//! ```
//! use ctlplane::ClientConfig;
//!
//! let config: ClientConfig = serde_json::from_str(r#"{"max_attempts": 5}"#).unwrap();
//! assert_eq!(config.max_attempts, 5);
//! assert_eq!(config.retry_delay_ms, 1000);
//! ```

use crate::core::client::retry::RetryPolicy;
use crate::core::error::{ControlPlaneError, Result};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tokio::fs;

/// Configuration for the control-plane client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL, e.g. `https://identity.example.com/20160918`.
    pub endpoint: String,

    /// Attempts per call under the default retry policy (at least 1).
    pub max_attempts: u32,

    /// First backoff of the default policy, in milliseconds.
    ///
    /// Later backoffs double: 1s, 2s, 4s, ... up to `max_retry_delay_ms`.
    pub retry_delay_ms: u64,

    pub max_retry_delay_ms: u64,

    /// Maximum time for one attempt, in milliseconds.
    pub request_timeout_ms: u64,

    pub connection_timeout_secs: u64,

    /// When enabled, retries are logged with `tracing::warn!`.
    pub enable_logging: bool,

    /// Generate an `opc-request-id` for calls whose metadata has none.
    pub auto_correlation_id: bool,

    /// Proxy URL (optional).
    pub proxy_url: String,

    pub user_agent: String,

    pub max_idle_connections: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            endpoint: String::new(),
            max_attempts: 3,
            retry_delay_ms: 1000,
            max_retry_delay_ms: 30_000,
            request_timeout_ms: 30_000,
            connection_timeout_secs: 30,
            enable_logging: false,
            auto_correlation_id: true,
            proxy_url: String::new(),
            user_agent: concat!("ctlplane/", env!("CARGO_PKG_VERSION")).to_string(),
            max_idle_connections: 100,
        }
    }
}

impl ClientConfig {
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Load from the default config file; defaults if the file does not exist.
    pub async fn load() -> Result<Self> {
        Self::load_from(&paths::config_file()?).await
    }

    pub async fn load_from(path: &Path) -> Result<Self> {
        if !fs::try_exists(path).await? {
            return Ok(ClientConfig::default());
        }
        let content = fs::read_to_string(path).await?;
        let config: ClientConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(ControlPlaneError::Config(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        if self.retry_delay_ms > self.max_retry_delay_ms {
            return Err(ControlPlaneError::Config(format!(
                "retry_delay_ms ({}) exceeds max_retry_delay_ms ({})",
                self.retry_delay_ms, self.max_retry_delay_ms
            )));
        }
        Ok(())
    }

    /// Process-wide default retry policy described by this configuration.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::exponential(
            self.max_attempts,
            Duration::from_millis(self.retry_delay_ms),
            Duration::from_millis(self.max_retry_delay_ms),
        )
    }
}
