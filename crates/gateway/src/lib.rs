//! Meridian Gateway
//!
//! Streaming side of the Meridian system. Provides:
//! - A `Connection` abstraction for streaming subscribers, with a tokio
//!   channel implementation for in-process clients
//! - `ConnectionRegistry`: the live subscriber set with broadcast and
//!   partial-failure pruning
//! - `StreamingAggregator`: one polling loop per subscribed symbol, a live
//!   ticker table and price observers
//!
//! ## Architecture
//!
//! ```text
//!  MarketDataSource
//!         │ ticker (1s cadence, 5s backoff on failure)
//!  ┌──────▼──────┐
//!  │ symbol loop │ × N  (one task per subscribed symbol)
//!  └──────┬──────┘
//!         │ LiveTicker
//!         ├──────────► live table (atomic replace)
//!         ├──────────► PriceObservers (each in its own failure boundary)
//!         └──────────► ConnectionRegistry::broadcast ──► clients
//! ```

pub mod aggregator;
pub mod channel;
pub mod connection;
pub mod error;
pub mod observer;
pub mod registry;

// Re-export commonly used types
pub use aggregator::{StreamConfig, StreamingAggregator};
pub use channel::{ChannelClient, ChannelConnection};
pub use connection::{Connection, ConnectionId};
pub use error::{ObserverError, TransportError};
pub use observer::{ObserverId, ObserverSet, PriceObserver};
pub use registry::{BroadcastReport, ConnectionRegistry};
