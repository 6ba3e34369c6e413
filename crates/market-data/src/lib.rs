//! Meridian Market Data
//!
//! Turns raw exchange data into [`MarketSnapshot`](meridian_core::MarketSnapshot)s:
//! - `indicators`: pure trend, volatility, SMA and RSI derivations
//! - `cache`: per-symbol last-good snapshot store
//! - `fetcher`: fetch, derive and cache with stale fallback
//! - `binance`: Binance public REST implementation of the data source port

pub mod binance;
pub mod cache;
pub mod error;
pub mod fetcher;
pub mod indicators;

pub use binance::{BinanceConfig, BinanceRestSource, RestError};
pub use cache::SnapshotCache;
pub use error::MarketDataError;
pub use fetcher::{FetchOutcome, SnapshotFetcher, derive_snapshot};
