//! Binance public REST source
//!
//! Reads the 24h ticker (`/api/v3/ticker/24hr`) and klines (`/api/v3/klines`).
//! Both endpoints are unauthenticated. Binance encodes decimals as strings,
//! so the response structs keep them as `String` and parsing happens here.

use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use meridian_core::{CandleSeries, Ticker};
use meridian_ports::{FetchError, FetchResult, MarketDataSource};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Index of the close price inside a kline row
const KLINE_CLOSE_INDEX: usize = 4;

#[derive(Error, Debug)]
pub enum RestError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error: {code} - {msg}")]
    Api { code: i32, msg: String },
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Client closed")]
    Closed,
}

/// Convert infrastructure RestError to domain FetchError
impl From<RestError> for FetchError {
    fn from(err: RestError) -> Self {
        match err {
            RestError::Http(e) => FetchError::Network(e.to_string()),
            RestError::Api { code, msg } => FetchError::Api { code, message: msg },
            RestError::Parse(msg) => FetchError::Parse(msg),
            RestError::Closed => FetchError::Closed,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BinanceConfig {
    pub rest_url: String,
    /// Kline interval, e.g. `1h`
    pub candle_interval: String,
    /// Number of klines requested per fetch
    pub candle_limit: u32,
    pub request_timeout: Duration,
}

impl Default for BinanceConfig {
    fn default() -> Self {
        Self {
            rest_url: "https://api.binance.com".to_string(),
            candle_interval: "1h".to_string(),
            candle_limit: 24,
            request_timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Ticker24hr {
    symbol: String,
    last_price: String,
    price_change_percent: String,
    volume: String,
    high_price: String,
    low_price: String,
}

#[derive(Deserialize)]
struct ApiError {
    code: i32,
    msg: String,
}

fn decimal(field: &str, raw: &str) -> Result<f64, RestError> {
    raw.parse::<f64>()
        .map_err(|e| RestError::Parse(format!("{} '{}': {}", field, raw, e)))
}

/// Parse a `/api/v3/ticker/24hr` body
pub fn parse_ticker(body: &str) -> Result<Ticker, RestError> {
    let raw: Ticker24hr =
        serde_json::from_str(body).map_err(|e| RestError::Parse(e.to_string()))?;

    Ok(Ticker {
        last_price: decimal("lastPrice", &raw.last_price)?,
        price_change_percent: decimal("priceChangePercent", &raw.price_change_percent)?,
        volume: decimal("volume", &raw.volume)?,
        high_price: decimal("highPrice", &raw.high_price)?,
        low_price: decimal("lowPrice", &raw.low_price)?,
        symbol: raw.symbol,
    })
}

/// Parse a `/api/v3/klines` body into its close prices, oldest first
pub fn parse_klines(body: &str) -> Result<CandleSeries, RestError> {
    let rows: Vec<Vec<serde_json::Value>> =
        serde_json::from_str(body).map_err(|e| RestError::Parse(e.to_string()))?;

    let mut closes = Vec::with_capacity(rows.len());
    for row in &rows {
        let close = row
            .get(KLINE_CLOSE_INDEX)
            .and_then(|v| v.as_str())
            .ok_or_else(|| RestError::Parse("kline row without close price".to_string()))?;
        closes.push(decimal("close", close)?);
    }

    Ok(CandleSeries::new(closes))
}

/// Market data source backed by the Binance public REST API.
///
/// The HTTP client is released on [`close`](MarketDataSource::close); any
/// request made afterwards fails with `FetchError::Closed`.
pub struct BinanceRestSource {
    client: ArcSwapOption<Client>,
    config: BinanceConfig,
}

impl BinanceRestSource {
    pub fn new(config: BinanceConfig) -> Result<Self, RestError> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self {
            client: ArcSwapOption::from_pointee(client),
            config,
        })
    }

    pub fn config(&self) -> &BinanceConfig {
        &self.config
    }

    pub fn is_closed(&self) -> bool {
        self.client.load().is_none()
    }

    async fn get_text(&self, path: &str) -> Result<String, RestError> {
        let client: Arc<Client> = self.client.load_full().ok_or(RestError::Closed)?;
        let url = format!("{}{}", self.config.rest_url, path);
        let resp = client.get(&url).send().await?;

        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            if let Ok(err) = serde_json::from_str::<ApiError>(&text) {
                return Err(RestError::Api {
                    code: err.code,
                    msg: err.msg,
                });
            }
            return Err(RestError::Parse(format!("HTTP {}: {}", status, text)));
        }

        Ok(text)
    }

    pub async fn get_ticker(&self, symbol: &str) -> Result<Ticker, RestError> {
        let path = format!("/api/v3/ticker/24hr?symbol={}", symbol);
        let body = self.get_text(&path).await?;
        parse_ticker(&body)
    }

    pub async fn get_closes(&self, symbol: &str) -> Result<CandleSeries, RestError> {
        let path = format!(
            "/api/v3/klines?symbol={}&interval={}&limit={}",
            symbol, self.config.candle_interval, self.config.candle_limit
        );
        let body = self.get_text(&path).await?;
        parse_klines(&body)
    }
}

#[async_trait]
impl MarketDataSource for BinanceRestSource {
    async fn ticker(&self, symbol: &str) -> FetchResult<Ticker> {
        self.get_ticker(symbol).await.map_err(FetchError::from)
    }

    async fn closes(&self, symbol: &str) -> FetchResult<CandleSeries> {
        self.get_closes(symbol).await.map_err(FetchError::from)
    }

    async fn close(&self) -> FetchResult<()> {
        if self.client.swap(None).is_some() {
            log::info!("[Binance] REST client closed");
        }
        Ok(())
    }
}
