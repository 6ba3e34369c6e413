//! Remote bot backend
//!
//! DCA bots on the signed REST backend. Backend failures are logged and
//! reported as `None`/`false`; nothing here returns an error to the caller
//! of the [`BotRegistry`] port.

use async_trait::async_trait;
use meridian_core::{BotHandle, BotId, BotStats, Recommendation, Symbol, TradeRecord};
use meridian_ports::{BackendError, BackendResult, BotRegistry, Clock};
use std::collections::HashMap;
use std::sync::Arc;

use crate::client::BotApiClient;
use crate::settings::{BotDefaults, BotSettingsUpdate, CreateBotRequest, RemoteBotConfig};

pub struct RemoteBotRegistry {
    client: BotApiClient,
    defaults: BotDefaults,
    account_id: Option<u64>,
    clock: Arc<dyn Clock>,
    active_bots: HashMap<Symbol, BotId>,
    history: HashMap<BotId, Vec<TradeRecord>>,
}

impl RemoteBotRegistry {
    pub fn new(config: RemoteBotConfig, clock: Arc<dyn Clock>) -> BackendResult<Self> {
        let client = BotApiClient::new(
            config.rest_url,
            config.api_key,
            config.api_secret,
            config.request_timeout,
        )?;

        Ok(Self {
            client,
            defaults: config.defaults,
            account_id: config.account_id,
            clock,
            active_bots: HashMap::new(),
            history: HashMap::new(),
        })
    }

    async fn resolve_account(&mut self) -> BackendResult<u64> {
        if let Some(id) = self.account_id {
            return Ok(id);
        }

        let account = self
            .client
            .list_accounts()
            .await?
            .into_iter()
            .next()
            .ok_or(BackendError::NoAccount)?;
        log::info!(
            "[RemoteBots] using account {} ({})",
            account.id,
            account.name
        );
        self.account_id = Some(account.id);
        Ok(account.id)
    }

    async fn try_create(&mut self, pair: &str) -> BackendResult<BotHandle> {
        let account_id = self.resolve_account().await?;
        let request = CreateBotRequest::new(
            pair,
            account_id,
            self.clock.now().date_naive(),
            &self.defaults,
        );
        let bot = self.client.create_bot(&request).await?;
        Ok(BotHandle::new(bot.id, pair))
    }
}

#[async_trait]
impl BotRegistry for RemoteBotRegistry {
    fn name(&self) -> &str {
        "RemoteBotRegistry"
    }

    async fn create_bot(&mut self, pair: &str) -> Option<BotHandle> {
        match self.try_create(pair).await {
            Ok(handle) => {
                self.active_bots.insert(pair.to_string(), handle.id);
                self.history.entry(handle.id).or_default();
                log::info!("[RemoteBots] created bot {} for {}", handle.id, pair);
                Some(handle)
            }
            Err(e) => {
                log::error!("[RemoteBots] creating bot for {} failed: {}", pair, e);
                None
            }
        }
    }

    async fn apply_recommendation(
        &mut self,
        bot_id: BotId,
        recommendation: &Recommendation,
    ) -> bool {
        let Some(update) = BotSettingsUpdate::from_recommendation(recommendation, &self.defaults)
        else {
            if recommendation.should_trade {
                log::warn!(
                    "[RemoteBots] bot {}: recommendation without take profit/stop loss",
                    bot_id
                );
            } else {
                log::info!("[RemoteBots] bot {}: skipping update, no trade recommended", bot_id);
            }
            return false;
        };

        match self.client.update_bot(bot_id.0, &update).await {
            Ok(_) => {
                self.history.entry(bot_id).or_default().push(TradeRecord {
                    bot_id,
                    timestamp: recommendation.timestamp,
                    price: recommendation.price,
                    direction: recommendation.direction,
                    confidence: recommendation.confidence,
                    executed: true,
                });
                log::info!(
                    "[RemoteBots] bot {} updated: take profit {}%, stop loss {}%, safety orders {} (confidence {:.1}%)",
                    bot_id,
                    update.take_profit,
                    update.stop_loss_percentage,
                    update.max_safety_orders,
                    recommendation.confidence
                );
                true
            }
            Err(e) => {
                log::error!("[RemoteBots] updating bot {} failed: {}", bot_id, e);
                false
            }
        }
    }

    async fn get_stats(&self, bot_id: BotId) -> Option<BotStats> {
        match self.client.bot_stats(bot_id.0).await {
            Ok(stats) => {
                let history = self.history.get(&bot_id);
                Some(BotStats {
                    profit: stats.profit_label(),
                    total_trades: history.map_or(0, Vec::len),
                    last_trade: history.and_then(|h| h.last().cloned()),
                })
            }
            Err(e) => {
                log::error!("[RemoteBots] fetching stats for bot {} failed: {}", bot_id, e);
                None
            }
        }
    }

    fn active_bot(&self, pair: &str) -> Option<BotId> {
        self.active_bots.get(pair).copied()
    }
}
