use serde::{Deserialize, Serialize};
use std::fmt;

use super::Direction;
use crate::values::{Price, Symbol, Timestamp};

/// Identifier assigned to a bot by its backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BotId(pub u64);

impl fmt::Display for BotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for BotId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Reference to a bot managing one trading pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotHandle {
    pub id: BotId,
    pub pair: Symbol,
}

impl BotHandle {
    pub fn new(id: impl Into<BotId>, pair: impl Into<Symbol>) -> Self {
        Self {
            id: id.into(),
            pair: pair.into(),
        }
    }
}

/// One applied recommendation in a bot's history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub bot_id: BotId,
    pub timestamp: Timestamp,
    pub price: Price,
    pub direction: Direction,
    pub confidence: f64,
    pub executed: bool,
}

/// Performance summary reported by a bot backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotStats {
    /// Backend-formatted profit (e.g. `"0.00%"`)
    pub profit: String,
    pub total_trades: usize,
    pub last_trade: Option<TradeRecord>,
}
