use serde::{Deserialize, Serialize};
use std::fmt;

use crate::values::{Percent, Price, Symbol, Timestamp};

/// Short-term price direction derived from recent closes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Bullish,
    Bearish,
    Neutral,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trend::Bullish => write!(f, "bullish"),
            Trend::Bearish => write!(f, "bearish"),
            Trend::Neutral => write!(f, "neutral"),
        }
    }
}

/// Technical indicators computed from the candle series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Indicators {
    pub sma_20: Price,
    pub rsi_14: f64,
    pub price_vs_sma: Percent,
}

impl Default for Indicators {
    /// Values reported when there is not enough history to compute anything
    fn default() -> Self {
        Self {
            sma_20: 0.0,
            rsi_14: 50.0,
            price_vs_sma: 0.0,
        }
    }
}

/// Derived market state for one symbol at one fetch instant.
///
/// Snapshots are immutable: a newer fetch produces a new value that replaces
/// the old one wholesale, fields are never patched in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub symbol: Symbol,
    pub current_price: Price,
    pub price_change_24h: Percent,
    pub volume_24h: f64,
    pub high_24h: Price,
    pub low_24h: Price,
    pub timestamp: Timestamp,
    pub trend: Trend,
    pub volatility: f64,
    pub indicators: Indicators,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trend_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Trend::Bullish).unwrap(), "\"bullish\"");
        assert_eq!(Trend::Bearish.to_string(), "bearish");
    }

    #[test]
    fn test_default_indicators() {
        let indicators = Indicators::default();
        assert_eq!(indicators.sma_20, 0.0);
        assert_eq!(indicators.rsi_14, 50.0);
        assert_eq!(indicators.price_vs_sma, 0.0);
    }
}
