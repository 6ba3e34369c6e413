use meridian_bots::{BackendMode, BotDefaults, DEFAULT_BOT_API_URL, RemoteBotConfig};
use meridian_gateway::StreamConfig;
use meridian_market_data::BinanceConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Top-level runner configuration file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Bot backend: `mock` or `remote`
    #[serde(default)]
    pub mode: BackendMode,
    /// Pairs driven by the orchestrator
    pub trading_pairs: Vec<String>,
    /// Pause between orchestrator cycles
    #[serde(default = "default_update_interval_ms")]
    pub update_interval_ms: u64,
    /// Symbols streamed to clients; empty means the trading pairs
    #[serde(default)]
    pub stream_symbols: Vec<String>,
    #[serde(default)]
    pub stream: StreamSettings,
    #[serde(default)]
    pub market_data: MarketDataSettings,
    #[serde(default)]
    pub bot: BotSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamSettings {
    #[serde(default = "default_cadence_ms")]
    pub cadence_ms: u64,
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            cadence_ms: default_cadence_ms(),
            backoff_ms: default_backoff_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketDataSettings {
    #[serde(default = "default_market_data_url")]
    pub rest_url: String,
    #[serde(default = "default_candle_interval")]
    pub candle_interval: String,
    #[serde(default = "default_candle_limit")]
    pub candle_limit: u32,
    #[serde(default = "default_market_data_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for MarketDataSettings {
    fn default() -> Self {
        Self {
            rest_url: default_market_data_url(),
            candle_interval: default_candle_interval(),
            candle_limit: default_candle_limit(),
            request_timeout_ms: default_market_data_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotSettings {
    #[serde(default = "default_bot_url")]
    pub rest_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub api_secret: String,
    #[serde(default)]
    pub account_id: Option<u64>,
    #[serde(default = "default_bot_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default = "default_base_order_volume")]
    pub base_order_volume: f64,
    #[serde(default = "default_take_profit")]
    pub take_profit: f64,
    #[serde(default = "default_stop_loss")]
    pub stop_loss: f64,
    #[serde(default = "default_max_safety_orders")]
    pub max_safety_orders: u32,
    #[serde(default = "default_safety_order_step")]
    pub safety_order_step: f64,
    #[serde(default = "default_martingale_volume")]
    pub martingale_volume_coefficient: f64,
    #[serde(default = "default_martingale_step")]
    pub martingale_step_coefficient: f64,
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            rest_url: default_bot_url(),
            api_key: String::new(),
            api_secret: String::new(),
            account_id: None,
            request_timeout_ms: default_bot_timeout_ms(),
            base_order_volume: default_base_order_volume(),
            take_profit: default_take_profit(),
            stop_loss: default_stop_loss(),
            max_safety_orders: default_max_safety_orders(),
            safety_order_step: default_safety_order_step(),
            martingale_volume_coefficient: default_martingale_volume(),
            martingale_step_coefficient: default_martingale_step(),
        }
    }
}

impl RunnerConfig {
    pub fn update_interval(&self) -> Duration {
        Duration::from_millis(self.update_interval_ms)
    }

    pub fn stream_symbols(&self) -> &[String] {
        if self.stream_symbols.is_empty() {
            &self.trading_pairs
        } else {
            &self.stream_symbols
        }
    }

    pub fn stream_config(&self) -> StreamConfig {
        StreamConfig {
            cadence: Duration::from_millis(self.stream.cadence_ms),
            backoff: Duration::from_millis(self.stream.backoff_ms),
        }
    }

    pub fn binance_config(&self) -> BinanceConfig {
        BinanceConfig {
            rest_url: self.market_data.rest_url.clone(),
            candle_interval: self.market_data.candle_interval.clone(),
            candle_limit: self.market_data.candle_limit,
            request_timeout: Duration::from_millis(self.market_data.request_timeout_ms),
        }
    }

    pub fn remote_bot_config(&self) -> RemoteBotConfig {
        let bot = &self.bot;
        RemoteBotConfig {
            rest_url: bot.rest_url.clone(),
            api_key: bot.api_key.clone(),
            api_secret: bot.api_secret.clone(),
            account_id: bot.account_id,
            request_timeout: Duration::from_millis(bot.request_timeout_ms),
            defaults: BotDefaults {
                base_order_volume: bot.base_order_volume,
                take_profit: bot.take_profit,
                stop_loss: bot.stop_loss,
                max_safety_orders: bot.max_safety_orders,
                safety_order_step: bot.safety_order_step,
                martingale_volume_coefficient: bot.martingale_volume_coefficient,
                martingale_step_coefficient: bot.martingale_step_coefficient,
            },
        }
    }
}

fn default_update_interval_ms() -> u64 {
    60_000
}

fn default_cadence_ms() -> u64 {
    1_000
}

fn default_backoff_ms() -> u64 {
    5_000
}

fn default_market_data_url() -> String {
    "https://api.binance.com".to_string()
}

fn default_candle_interval() -> String {
    "1h".to_string()
}

fn default_candle_limit() -> u32 {
    24
}

fn default_market_data_timeout_ms() -> u64 {
    10_000
}

fn default_bot_url() -> String {
    DEFAULT_BOT_API_URL.to_string()
}

fn default_bot_timeout_ms() -> u64 {
    30_000
}

fn default_base_order_volume() -> f64 {
    10.0
}

fn default_take_profit() -> f64 {
    1.5
}

fn default_stop_loss() -> f64 {
    2.0
}

fn default_max_safety_orders() -> u32 {
    3
}

fn default_safety_order_step() -> f64 {
    2.5
}

fn default_martingale_volume() -> f64 {
    1.5
}

fn default_martingale_step() -> f64 {
    1.0
}
