//! Meridian Core Domain
//!
//! Pure domain types for the Meridian system.
//! This crate contains no async, no I/O, and is 100% unit testable.

pub mod bots;
pub mod market;
pub mod values;

// Re-export commonly used types at crate root
pub use bots::{
    BotHandle, BotId, BotStats, Direction, Recommendation, StatusRecord, TradeRecord, UNKNOWN_PROFIT,
};
pub use market::{CandleSeries, Indicators, LiveTicker, MarketSnapshot, Ticker, Trend};
pub use values::{Percent, Price, Symbol, Timestamp};
