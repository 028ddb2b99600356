//! Configuration structures
//!
//! Every section deserializes with defaults, so a config file only needs the
//! keys it wants to change.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    CONNECTION_NAMESPACE, DEFAULT_API_BASE_URL, DEFAULT_API_TIMEOUT_SECS, DEFAULT_RETRY_BASE_DELAY_MS,
    DEFAULT_RETRY_MAX_ATTEMPTS, DEFAULT_RETRY_MAX_DELAY_MS, DEFAULT_STATE_PATH,
};
use crate::errors::{LutemError, Result};

/// Top-level application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LutemConfig {
    pub api: ApiConfig,
    pub retry: RetryConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

impl LutemConfig {
    /// Check cross-field constraints that serde cannot express.
    ///
    /// # Errors
    /// Returns `LutemError::Config` describing the first invalid field.
    pub fn validate(&self) -> Result<()> {
        self.api.validate()?;
        self.retry.validate()?;
        if self.storage.namespace.trim().is_empty() {
            return Err(LutemError::Config("storage.namespace must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Remote API settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL every request path is appended to
    pub base_url: String,
    /// Transport-level timeout per attempt
    pub timeout_secs: u64,
    pub user_agent: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout_secs: DEFAULT_API_TIMEOUT_SECS,
            user_agent: None,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(LutemError::Config("api.base_url must not be empty".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(LutemError::Config("api.timeout_secs must be greater than 0".to_string()));
        }
        Ok(())
    }
}

/// Process-wide default retry policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries after the first attempt
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_RETRY_MAX_ATTEMPTS,
            base_delay_ms: DEFAULT_RETRY_BASE_DELAY_MS,
            max_delay_ms: DEFAULT_RETRY_MAX_DELAY_MS,
        }
    }
}

impl RetryConfig {
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }

    /// # Errors
    /// Returns `LutemError::Config` when `max_delay_ms < base_delay_ms`.
    pub fn validate(&self) -> Result<()> {
        if self.max_delay_ms < self.base_delay_ms {
            return Err(LutemError::Config(format!(
                "retry.max_delay_ms ({}) must not be less than retry.base_delay_ms ({})",
                self.max_delay_ms, self.base_delay_ms
            )));
        }
        Ok(())
    }
}

/// Durable state location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON file holding the persisted connection record
    pub state_path: PathBuf,
    /// Key the connection record is stored under
    pub namespace: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            state_path: PathBuf::from(DEFAULT_STATE_PATH),
            namespace: CONNECTION_NAMESPACE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), json: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config: LutemConfig =
            serde_json::from_str(r#"{"api":{"base_url":"https://api.lutem.dev"}}"#).unwrap();

        assert_eq!(config.api.base_url, "https://api.lutem.dev");
        assert_eq!(config.api.timeout(), Duration::from_secs(30));
        assert_eq!(config.retry, RetryConfig::default());
        assert_eq!(config.storage.namespace, "lutem-steam");
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn inverted_retry_bounds_are_rejected() {
        let config = LutemConfig {
            retry: RetryConfig { max_attempts: 3, base_delay_ms: 5000, max_delay_ms: 100 },
            ..LutemConfig::default()
        };
        assert!(matches!(config.validate(), Err(LutemError::Config(_))));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut config = LutemConfig::default();
        config.api.timeout_secs = 0;
        assert!(config.validate().is_err());
    }
}
