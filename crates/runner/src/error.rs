//! Error types for the runner crate

use meridian_ports::BackendError;
use thiserror::Error;

use crate::config::ConfigError;

/// Startup and lifecycle errors
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Bot backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Market data source error: {0}")]
    DataSource(String),

    #[error("Context already started")]
    AlreadyStarted,

    #[error("Orchestrator task failed: {0}")]
    Join(String),
}

impl From<meridian_market_data::RestError> for RunnerError {
    fn from(e: meridian_market_data::RestError) -> Self {
        RunnerError::DataSource(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RunnerError>;
