use meridian_bots::BackendMode;
use std::path::Path;
use thiserror::Error;

use super::types::RunnerConfig;

/// Environment variable overriding `bot.api_key`
pub const API_KEY_ENV: &str = "MERIDIAN_BOT_API_KEY";
/// Environment variable overriding `bot.api_secret`
pub const API_SECRET_ENV: &str = "MERIDIAN_BOT_API_SECRET";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("No trading pairs in config")]
    NoTradingPairs,
    #[error("Invalid interval: {0} must be greater than zero")]
    InvalidInterval(&'static str),
    #[error("Remote mode requires bot API credentials")]
    MissingCredentials,
}

/// Load runner configuration from a JSON file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<RunnerConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Load configuration from a JSON string
pub fn load_config_from_str(json: &str) -> Result<RunnerConfig, ConfigError> {
    let config: RunnerConfig = serde_json::from_str(json)?;
    Ok(config)
}

/// Load the default embedded configuration
pub fn load_default_config() -> Result<RunnerConfig, ConfigError> {
    let default_config = include_str!("default_config.json");
    load_config_from_str(default_config)
}

impl RunnerConfig {
    /// Take bot API credentials from the environment when set
    pub fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            self.bot.api_key = key;
        }
        if let Ok(secret) = std::env::var(API_SECRET_ENV) {
            self.bot.api_secret = secret;
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.trading_pairs.is_empty() {
            return Err(ConfigError::NoTradingPairs);
        }
        if self.update_interval_ms == 0 {
            return Err(ConfigError::InvalidInterval("update_interval_ms"));
        }
        if self.stream.cadence_ms == 0 {
            return Err(ConfigError::InvalidInterval("stream.cadence_ms"));
        }
        if self.stream.backoff_ms == 0 {
            return Err(ConfigError::InvalidInterval("stream.backoff_ms"));
        }
        if self.mode == BackendMode::Remote
            && (self.bot.api_key.is_empty() || self.bot.api_secret.is_empty())
        {
            return Err(ConfigError::MissingCredentials);
        }
        Ok(())
    }
}
