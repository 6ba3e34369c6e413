//! Meridian Ports
//!
//! Port definitions (traits) for the Meridian system.
//! These define the boundaries between the core components and the outside
//! world: the exchange data source, the analysis collaborator, the bot
//! backend and the status sink.

mod analyzer;
mod bots;
mod clock;
mod error;
mod market_data;
mod status;

pub use analyzer::Analyzer;
pub use bots::BotRegistry;
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{BackendError, BackendResult, FetchError, FetchResult};
pub use market_data::MarketDataSource;
pub use status::StatusSink;
