use serde::{Deserialize, Serialize};

use super::Ticker;
use crate::values::{Percent, Price, Symbol, Timestamp};

/// Minimal per-tick liveness record pushed to streaming subscribers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveTicker {
    pub symbol: Symbol,
    pub current_price: Price,
    pub price_change_24h: Percent,
    pub volume_24h: f64,
    pub timestamp: Timestamp,
}

impl LiveTicker {
    pub fn from_ticker(ticker: &Ticker, timestamp: Timestamp) -> Self {
        Self {
            symbol: ticker.symbol.clone(),
            current_price: ticker.last_price,
            price_change_24h: ticker.price_change_percent,
            volume_24h: ticker.volume,
            timestamp,
        }
    }
}
