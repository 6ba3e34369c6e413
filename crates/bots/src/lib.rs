//! Meridian Bots
//!
//! Implementations of the [`BotRegistry`] port:
//! - [`MockBotRegistry`]: in-memory, for development and tests
//! - [`RemoteBotRegistry`]: DCA bots on a 3Commas-style REST backend
//!
//! The variant is picked once, at construction, through
//! [`create_bot_registry`].

pub mod client;
pub mod mock;
pub mod remote;
pub mod settings;

pub use client::{BotApiClient, DEFAULT_BOT_API_URL};
pub use mock::{MOCK_BOT_ID_BASE, MOCK_PROFIT, MockBotRegistry};
pub use remote::RemoteBotRegistry;
pub use settings::{BotDefaults, BotSettingsUpdate, CreateBotRequest, RemoteBotConfig};

use meridian_ports::{BackendResult, BotRegistry};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Which bot backend to run against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendMode {
    #[default]
    Mock,
    Remote,
}

impl fmt::Display for BackendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendMode::Mock => write!(f, "mock"),
            BackendMode::Remote => write!(f, "remote"),
        }
    }
}

/// Build the bot registry for `mode`. `remote` is only read in remote mode.
pub fn create_bot_registry(
    mode: BackendMode,
    remote: &RemoteBotConfig,
    clock: Arc<dyn meridian_ports::Clock>,
) -> BackendResult<Box<dyn BotRegistry>> {
    let registry: Box<dyn BotRegistry> = match mode {
        BackendMode::Mock => Box::new(MockBotRegistry::new()),
        BackendMode::Remote => Box::new(RemoteBotRegistry::new(remote.clone(), clock)?),
    };
    log::info!("[Bots] using {} backend", registry.name());
    Ok(registry)
}
