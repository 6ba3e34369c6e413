//! Backend bot settings
//!
//! Maps the abstract recommendation onto the DCA bot parameters of the
//! remote backend.

use chrono::NaiveDate;
use meridian_core::Recommendation;
use serde::Serialize;
use std::time::Duration;

use crate::client::DEFAULT_BOT_API_URL;

/// Confidence (percent) above which the full safety-order depth is used
pub const HIGH_CONFIDENCE: f64 = 85.0;

/// Parameters every new bot starts with
#[derive(Debug, Clone, PartialEq)]
pub struct BotDefaults {
    /// Base and safety order volume in quote currency
    pub base_order_volume: f64,
    pub take_profit: f64,
    pub stop_loss: f64,
    pub max_safety_orders: u32,
    /// Price deviation between safety orders, percent
    pub safety_order_step: f64,
    pub martingale_volume_coefficient: f64,
    pub martingale_step_coefficient: f64,
}

impl Default for BotDefaults {
    fn default() -> Self {
        Self {
            base_order_volume: 10.0,
            take_profit: 1.5,
            stop_loss: 2.0,
            max_safety_orders: 3,
            safety_order_step: 2.5,
            martingale_volume_coefficient: 1.5,
            martingale_step_coefficient: 1.0,
        }
    }
}

/// Connection and defaults for the remote backend
#[derive(Debug, Clone)]
pub struct RemoteBotConfig {
    pub rest_url: String,
    pub api_key: String,
    pub api_secret: String,
    /// Trading account; looked up from the backend when unset
    pub account_id: Option<u64>,
    pub request_timeout: Duration,
    pub defaults: BotDefaults,
}

impl Default for RemoteBotConfig {
    fn default() -> Self {
        Self {
            rest_url: DEFAULT_BOT_API_URL.to_string(),
            api_key: String::new(),
            api_secret: String::new(),
            account_id: None,
            request_timeout: Duration::from_secs(30),
            defaults: BotDefaults::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyEntry {
    pub strategy: String,
}

/// Body of a create-bot request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateBotRequest {
    pub name: String,
    pub account_id: u64,
    pub pairs: String,
    pub base_order_volume: f64,
    pub take_profit: f64,
    pub safety_order_volume: f64,
    pub martingale_volume_coefficient: f64,
    pub martingale_step_coefficient: f64,
    pub max_safety_orders: u32,
    pub active_safety_orders_count: u32,
    pub safety_order_step_percentage: f64,
    pub take_profit_type: String,
    pub strategy_list: Vec<StrategyEntry>,
    pub min_volume_btc_24h: f64,
    pub profit_currency: String,
    pub start_order_type: String,
    pub stop_loss_percentage: f64,
    pub cooldown: u32,
}

/// `AI_Bot_{pair}_{YYYYMMDD}`
pub fn bot_name(pair: &str, date: NaiveDate) -> String {
    format!("AI_Bot_{}_{}", pair, date.format("%Y%m%d"))
}

impl CreateBotRequest {
    pub fn new(pair: &str, account_id: u64, date: NaiveDate, defaults: &BotDefaults) -> Self {
        Self {
            name: bot_name(pair, date),
            account_id,
            pairs: pair.to_string(),
            base_order_volume: defaults.base_order_volume,
            take_profit: defaults.take_profit,
            safety_order_volume: defaults.base_order_volume,
            martingale_volume_coefficient: defaults.martingale_volume_coefficient,
            martingale_step_coefficient: defaults.martingale_step_coefficient,
            max_safety_orders: defaults.max_safety_orders,
            active_safety_orders_count: defaults.max_safety_orders,
            safety_order_step_percentage: defaults.safety_order_step,
            take_profit_type: "total".to_string(),
            strategy_list: vec![StrategyEntry {
                strategy: "nonstop".to_string(),
            }],
            min_volume_btc_24h: 0.0,
            profit_currency: "quote_currency".to_string(),
            start_order_type: "limit".to_string(),
            stop_loss_percentage: defaults.stop_loss,
            cooldown: 1,
        }
    }
}

/// Settings changed when a recommendation is applied
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BotSettingsUpdate {
    pub take_profit: f64,
    pub stop_loss_percentage: f64,
    pub max_safety_orders: u32,
}

impl BotSettingsUpdate {
    /// `None` when the recommendation must be declined
    pub fn from_recommendation(
        recommendation: &Recommendation,
        defaults: &BotDefaults,
    ) -> Option<Self> {
        if !recommendation.should_trade {
            return None;
        }
        let (take_profit, stop_loss) = recommendation.targets()?;

        let max_safety_orders = if recommendation.confidence > HIGH_CONFIDENCE {
            defaults.max_safety_orders
        } else {
            1
        };

        Some(Self {
            take_profit,
            stop_loss_percentage: stop_loss,
            max_safety_orders,
        })
    }
}
