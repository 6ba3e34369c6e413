//! In-memory bot backend
//!
//! Ids are allocated from [`MOCK_BOT_ID_BASE`] upwards, every applied
//! recommendation is appended to the bot's history, and stats are derived
//! from that history alone.

use async_trait::async_trait;
use meridian_core::{BotHandle, BotId, BotStats, Recommendation, Symbol, TradeRecord};
use meridian_ports::BotRegistry;
use std::collections::HashMap;

pub const MOCK_BOT_ID_BASE: u64 = 1000;
/// Profit reported by every mock bot
pub const MOCK_PROFIT: &str = "0.00%";

pub struct MockBotRegistry {
    next_id: u64,
    active_bots: HashMap<Symbol, BotId>,
    /// Append-only history per bot
    trades: HashMap<BotId, Vec<TradeRecord>>,
}

impl MockBotRegistry {
    pub fn new() -> Self {
        log::info!("[MockBots] created mock bot registry");
        Self {
            next_id: MOCK_BOT_ID_BASE,
            active_bots: HashMap::new(),
            trades: HashMap::new(),
        }
    }

    pub fn trades(&self, bot_id: BotId) -> &[TradeRecord] {
        self.trades.get(&bot_id).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl Default for MockBotRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BotRegistry for MockBotRegistry {
    fn name(&self) -> &str {
        "MockBotRegistry"
    }

    async fn create_bot(&mut self, pair: &str) -> Option<BotHandle> {
        let id = BotId(self.next_id);
        self.next_id += 1;

        self.active_bots.insert(pair.to_string(), id);
        self.trades.entry(id).or_default();
        log::info!("[MockBots] created bot {} for {}", id, pair);
        Some(BotHandle::new(id, pair))
    }

    async fn apply_recommendation(
        &mut self,
        bot_id: BotId,
        recommendation: &Recommendation,
    ) -> bool {
        if !recommendation.should_trade {
            log::info!(
                "[MockBots] bot {}: skipping update, no trade recommended",
                bot_id
            );
            return false;
        }
        let Some(history) = self.trades.get_mut(&bot_id) else {
            log::warn!("[MockBots] unknown bot {}", bot_id);
            return false;
        };

        history.push(TradeRecord {
            bot_id,
            timestamp: recommendation.timestamp,
            price: recommendation.price,
            direction: recommendation.direction,
            confidence: recommendation.confidence,
            executed: recommendation.should_trade,
        });
        log::info!(
            "[MockBots] bot {} applied {} @ {} (confidence {:.1}%)",
            bot_id,
            recommendation.direction,
            recommendation.price,
            recommendation.confidence
        );
        true
    }

    async fn get_stats(&self, bot_id: BotId) -> Option<BotStats> {
        let trades = self.trades.get(&bot_id)?;
        Some(BotStats {
            profit: MOCK_PROFIT.to_string(),
            total_trades: trades.len(),
            last_trade: trades.last().cloned(),
        })
    }

    fn active_bot(&self, pair: &str) -> Option<BotId> {
        self.active_bots.get(pair).copied()
    }
}
