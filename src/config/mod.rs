//! Configuration system for taskwait
//!
//! Supports loading configuration from:
//! 1. CLI --config argument
//! 2. ~/.config/taskwait/config.{TASKWAIT_ENV}.json
//! 3. Default values
//!
//! Where TASKWAIT_ENV can be: production (default), development, test
//!
//! # Examples
//!
//! ```no_run
//! use taskwait::config::AppConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::load(None)?;
//! println!("Waiting up to {}s on {:?}", config.wait_timeout_secs, config.server_url);
//! # Ok(())
//! # }
//! ```
//!
//! ## Environment Variables
//!
//! Environment variables override config file values:
//! - OCTOPUS_URL
//! - OCTOPUS_API_KEY
//! - OCTOPUS_SPACE

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse config JSON: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the task server, e.g. `https://deploy.example.com`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_url: Option<String>,

    /// API key (can be environment variable name like "OCTOPUS_API_KEY")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Space the tasks live in
    #[serde(default = "default_space_id")]
    pub space_id: String,

    /// Timeout for a single HTTP request in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Default time to wait for tasks in seconds
    #[serde(default = "default_wait_timeout")]
    pub wait_timeout_secs: u64,
}

fn default_space_id() -> String {
    "Spaces-1".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_wait_timeout() -> u64 {
    600
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_url: None,
            api_key: None,
            space_id: default_space_id(),
            request_timeout_secs: default_request_timeout(),
            wait_timeout_secs: default_wait_timeout(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: AppConfig = serde_json::from_str(&content)?;

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Load configuration with standard priority:
    /// 1. Explicit path
    /// 2. ~/.config/taskwait/config.{TASKWAIT_ENV}.json
    /// 3. Defaults
    pub fn load(explicit_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit_path {
            if path.exists() {
                tracing::info!("Loading config from: {:?}", path);
                return Self::from_file(path);
            } else {
                return Err(ConfigError::ValidationError(format!(
                    "Config file not found: {:?}",
                    path
                )));
            }
        }

        let env = std::env::var("TASKWAIT_ENV").unwrap_or_else(|_| "production".to_string());

        if let Some(config_dir) = Self::config_dir() {
            let config_path = config_dir.join(format!("config.{}.json", env));

            if config_path.exists() {
                tracing::info!("Loading config from: {:?}", config_path);
                return Self::from_file(&config_path);
            }
        }

        tracing::debug!("Using default configuration with environment overrides");
        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("OCTOPUS_URL") {
            self.server_url = Some(url);
        }

        if let Some(key) = lookup("OCTOPUS_API_KEY") {
            self.api_key = Some(key);
        }

        if let Some(space) = lookup("OCTOPUS_SPACE") {
            self.space_id = space;
        }
    }

    /// Resolve API key from environment variable if needed
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key.as_ref().and_then(|key| {
            if !key.is_empty() && key.chars().all(|c| c.is_ascii_uppercase() || c == '_') {
                std::env::var(key).ok()
            } else {
                Some(key.clone())
            }
        })
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(url) = &self.server_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::ValidationError(format!(
                    "server_url must start with http:// or https://, got {}",
                    url
                )));
            }
        }

        if self.space_id.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "space_id cannot be empty".to_string(),
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "request_timeout_secs must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Get the config directory path
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("taskwait"))
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
