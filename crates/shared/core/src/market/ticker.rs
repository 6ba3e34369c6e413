use serde::{Deserialize, Serialize};

use crate::values::{Percent, Price, Symbol};

/// Rolling 24h ticker for a symbol, as delivered by the data source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticker {
    pub symbol: Symbol,
    pub last_price: Price,
    pub price_change_percent: Percent,
    pub volume: f64,
    pub high_price: Price,
    pub low_price: Price,
}

impl Ticker {
    /// Ticker with only a last price set (high/low collapse onto it)
    pub fn at_price(symbol: impl Into<Symbol>, last_price: Price) -> Self {
        Self {
            symbol: symbol.into(),
            last_price,
            price_change_percent: 0.0,
            volume: 0.0,
            high_price: last_price,
            low_price: last_price,
        }
    }
}
