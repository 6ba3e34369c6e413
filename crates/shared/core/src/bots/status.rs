use serde::{Deserialize, Serialize};

use super::{BotStats, Recommendation};
use crate::market::MarketSnapshot;
use crate::values::{Percent, Price, Symbol};

/// Profit label used when the backend returned no stats
pub const UNKNOWN_PROFIT: &str = "Unknown";

/// Status emitted after a recommendation was applied to a pair's bot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusRecord {
    pub pair: Symbol,
    pub current_price: Price,
    pub price_change_24h: Percent,
    pub bot_profit: String,
    pub average_confidence: f64,
}

impl StatusRecord {
    /// Join snapshot, recommendation and (optional) stats into one record
    pub fn join(
        snapshot: &MarketSnapshot,
        recommendation: &Recommendation,
        stats: Option<&BotStats>,
    ) -> Self {
        Self {
            pair: snapshot.symbol.clone(),
            current_price: snapshot.current_price,
            price_change_24h: snapshot.price_change_24h,
            bot_profit: stats
                .map(|s| s.profit.clone())
                .unwrap_or_else(|| UNKNOWN_PROFIT.to_string()),
            average_confidence: recommendation.confidence,
        }
    }
}
