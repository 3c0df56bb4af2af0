//! Client configuration
//!
//! Loaded from an optional YAML file merged with `BUDGETEASE_`-prefixed
//! environment variables (`BUDGETEASE_STORE__URL`, ...).

use figment::{
    providers::{Env, Format, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::connection::ConnectionMonitorConfig;
use crate::retry::RetryPolicy;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(String),

    #[error("invalid configuration: {0}")]
    Validation(String),
}

/// Top-level client configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Record store endpoint and credentials
    pub store: StoreConfig,

    /// Retry bounds for store calls
    pub retry: RetrySettings,

    /// Connection monitor settings
    pub connection: ConnectionSettings,
}

impl ClientConfig {
    /// Load configuration from file and environment
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut figment = Figment::new();

        if let Some(path) = config_path {
            figment = figment.merge(Yaml::file(path));
        }

        figment = figment.merge(Env::prefixed("BUDGETEASE_").split("__"));

        figment
            .extract()
            .map_err(|e| ConfigError::Load(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.url.is_empty() {
            return Err(ConfigError::Validation("store URL required".to_string()));
        }
        if self.store.anon_key.is_empty() {
            return Err(ConfigError::Validation("store API key required".to_string()));
        }
        if self.retry.base_delay_ms == 0 {
            return Err(ConfigError::Validation(
                "retry base delay must be greater than 0".to_string(),
            ));
        }
        if self.connection.poll_interval_secs == 0 {
            return Err(ConfigError::Validation(
                "connection poll interval must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Record store endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Base URL of the store service
    pub url: String,

    /// Anonymous API key
    pub anon_key: String,

    /// Application name sent with every request
    pub application_name: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            anon_key: String::new(),
            application_name: "budgetease".to_string(),
        }
    }
}

/// Retry bounds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrySettings {
    /// Total attempts per operation
    pub max_retries: u32,

    /// Base backoff delay in milliseconds
    pub base_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 1000,
        }
    }
}

impl RetrySettings {
    /// Build the retry policy these settings describe
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, Duration::from_millis(self.base_delay_ms))
    }
}

/// Connection monitor settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionSettings {
    /// Seconds between reachability probes
    pub poll_interval_secs: u64,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            poll_interval_secs: 30,
        }
    }
}

impl ConnectionSettings {
    /// Build the monitor configuration these settings describe
    pub fn monitor_config(&self) -> ConnectionMonitorConfig {
        ConnectionMonitorConfig {
            poll_interval: Duration::from_secs(self.poll_interval_secs),
        }
    }
}
