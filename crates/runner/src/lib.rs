//! Meridian Runner
//!
//! Wires the Meridian system together and drives it:
//!
//! - **Config**: JSON runner configuration with embedded defaults
//! - **Orchestrator**: the per-pair snapshot → recommendation → bot cycle
//! - **Context**: owns every component, with start/stop lifecycle
//! - **Analyzer**: rule-based stand-in for the external analysis service
//!
//! ## Architecture
//!
//! ```text
//!                 ┌───────────────────────┐
//!                 │   MarketDataSource    │
//!                 │   (Binance REST)      │
//!                 └───────┬───────┬───────┘
//!             ticker      │       │  ticker + klines
//!          ┌──────────────▼─┐   ┌─▼──────────────────┐
//!          │   Streaming    │   │  SnapshotFetcher   │
//!          │   Aggregator   │   │  (+ cache)         │
//!          └───────┬────────┘   └─────────┬──────────┘
//!                  │ LiveTicker           │ MarketSnapshot
//!                  ▼                      ▼
//!          ┌────────────────┐   ┌────────────────────┐
//!          │   Connection   │   │   Orchestrator     │──► Analyzer
//!          │   Registry     │   │   (per pair)       │──► BotRegistry
//!          └───────┬────────┘   └─────────┬──────────┘
//!                  ▼                      ▼
//!               clients              StatusSink
//! ```

pub mod analyzer;
pub mod config;
pub mod context;
pub mod error;
pub mod orchestrator;
pub mod status;

// Re-export main types
pub use analyzer::RuleBasedAnalyzer;
pub use config::{ConfigError, RunnerConfig, load_config, load_default_config};
pub use context::Context;
pub use error::{Result, RunnerError};
pub use orchestrator::{Orchestrator, PairOutcome};
pub use status::LogStatusSink;
