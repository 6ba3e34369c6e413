//! Snapshot fetch-and-derive pipeline
//!
//! A fetch pulls the ticker and the candle closes from the data source
//! concurrently, derives a [`MarketSnapshot`] and publishes it to the cache.
//! When the source fails, the last good snapshot is served instead and the
//! outcome is marked [`FetchOutcome::Stale`].

use meridian_core::{CandleSeries, MarketSnapshot, Ticker, Timestamp};
use meridian_ports::{Clock, FetchResult, MarketDataSource, SystemClock};
use std::sync::Arc;

use crate::cache::SnapshotCache;
use crate::error::MarketDataError;
use crate::indicators;

/// Derive a snapshot from raw ticker and candle input.
///
/// Pure: the same inputs always produce the same snapshot.
pub fn derive_snapshot(
    symbol: &str,
    ticker: &Ticker,
    candles: &CandleSeries,
    timestamp: Timestamp,
) -> MarketSnapshot {
    let closes = candles.closes();
    MarketSnapshot {
        symbol: symbol.to_string(),
        current_price: ticker.last_price,
        price_change_24h: ticker.price_change_percent,
        volume_24h: ticker.volume,
        high_24h: ticker.high_price,
        low_24h: ticker.low_price,
        timestamp,
        trend: indicators::trend(closes),
        volatility: indicators::volatility(closes),
        indicators: indicators::indicators(closes),
    }
}

/// Result of a successful fetch
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// Derived from data fetched just now
    Fresh(Arc<MarketSnapshot>),
    /// The source failed; this is the last good snapshot from the cache
    Stale(Arc<MarketSnapshot>),
}

impl FetchOutcome {
    pub fn snapshot(&self) -> &Arc<MarketSnapshot> {
        match self {
            FetchOutcome::Fresh(s) | FetchOutcome::Stale(s) => s,
        }
    }

    pub fn into_snapshot(self) -> Arc<MarketSnapshot> {
        match self {
            FetchOutcome::Fresh(s) | FetchOutcome::Stale(s) => s,
        }
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, FetchOutcome::Stale(_))
    }
}

/// Fetches snapshots through a [`MarketDataSource`] with last-good fallback.
///
/// Cloning is cheap and clones share the cache, so the streaming side and the
/// orchestrator can hold their own handle.
#[derive(Clone)]
pub struct SnapshotFetcher {
    source: Arc<dyn MarketDataSource>,
    cache: SnapshotCache,
    clock: Arc<dyn Clock>,
}

impl SnapshotFetcher {
    pub fn new(source: Arc<dyn MarketDataSource>) -> Self {
        Self::with_clock(source, Arc::new(SystemClock))
    }

    pub fn with_clock(source: Arc<dyn MarketDataSource>, clock: Arc<dyn Clock>) -> Self {
        Self {
            source,
            cache: SnapshotCache::new(),
            clock,
        }
    }

    pub fn source(&self) -> &Arc<dyn MarketDataSource> {
        &self.source
    }

    pub fn cache(&self) -> &SnapshotCache {
        &self.cache
    }

    async fn fetch_inputs(&self, symbol: &str) -> FetchResult<(Ticker, CandleSeries)> {
        tokio::try_join!(self.source.ticker(symbol), self.source.closes(symbol))
    }

    /// Fetch and derive the snapshot for `symbol`.
    ///
    /// The cache is written only once both inputs arrived, so dropping this
    /// future part way through leaves the cache untouched.
    pub async fn fetch(&self, symbol: &str) -> Result<FetchOutcome, MarketDataError> {
        match self.fetch_inputs(symbol).await {
            Ok((ticker, candles)) => {
                let snapshot = Arc::new(derive_snapshot(
                    symbol,
                    &ticker,
                    &candles,
                    self.clock.now(),
                ));
                self.cache.insert(Arc::clone(&snapshot));
                log::debug!(
                    "[Fetcher] {} price={} trend={} closes={}",
                    symbol,
                    snapshot.current_price,
                    snapshot.trend,
                    candles.len()
                );
                Ok(FetchOutcome::Fresh(snapshot))
            }
            Err(e) => match self.cache.get(symbol) {
                Some(cached) => {
                    log::warn!(
                        "[Fetcher] {} fetch failed ({}), serving cached snapshot from {}",
                        symbol,
                        e,
                        cached.timestamp
                    );
                    Ok(FetchOutcome::Stale(cached))
                }
                None => {
                    log::error!("[Fetcher] {} fetch failed with no cached snapshot: {}", symbol, e);
                    Err(MarketDataError::DataUnavailable {
                        symbol: symbol.to_string(),
                        source: e,
                    })
                }
            },
        }
    }

    /// Last good snapshot without touching the source
    pub fn snapshot(&self, symbol: &str) -> Option<Arc<MarketSnapshot>> {
        self.cache.get(symbol)
    }

    /// Release the data source
    pub async fn close(&self) -> FetchResult<()> {
        self.source.close().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use meridian_core::Trend;
    use meridian_ports::{FetchError, FixedClock};
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    /// Source that serves a fixed ticker/closes until told to fail
    struct ScriptedSource {
        ticker: Mutex<Ticker>,
        closes: Vec<f64>,
        closes_delay: Option<Duration>,
        failing: AtomicBool,
    }

    impl ScriptedSource {
        fn new(price: f64, closes: Vec<f64>) -> Self {
            Self {
                ticker: Mutex::new(Ticker {
                    symbol: "BTCUSDT".to_string(),
                    last_price: price,
                    price_change_percent: 2.5,
                    volume: 1000.0,
                    high_price: price + 10.0,
                    low_price: price - 10.0,
                }),
                closes,
                closes_delay: None,
                failing: AtomicBool::new(false),
            }
        }

        fn with_closes_delay(mut self, delay: Duration) -> Self {
            self.closes_delay = Some(delay);
            self
        }

        fn fail(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl MarketDataSource for ScriptedSource {
        async fn ticker(&self, _symbol: &str) -> FetchResult<Ticker> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(FetchError::Network("connection reset".to_string()));
            }
            Ok(self.ticker.lock().clone())
        }

        async fn closes(&self, _symbol: &str) -> FetchResult<CandleSeries> {
            if let Some(delay) = self.closes_delay {
                tokio::time::sleep(delay).await;
            }
            if self.failing.load(Ordering::SeqCst) {
                return Err(FetchError::Network("connection reset".to_string()));
            }
            Ok(CandleSeries::new(self.closes.clone()))
        }

        async fn close(&self) -> FetchResult<()> {
            Ok(())
        }
    }

    fn fetcher(source: Arc<ScriptedSource>) -> SnapshotFetcher {
        let instant = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
        SnapshotFetcher::with_clock(source, Arc::new(FixedClock(instant)))
    }

    #[test]
    fn test_derive_snapshot_copies_ticker_fields() {
        let ticker = Ticker {
            symbol: "ETHUSDT".to_string(),
            last_price: 3000.0,
            price_change_percent: -1.5,
            volume: 42.0,
            high_price: 3100.0,
            low_price: 2900.0,
        };
        let candles = CandleSeries::new(vec![100.0, 100.0, 100.0, 100.0, 100.0, 102.0]);
        let snapshot = derive_snapshot("ETHUSDT", &ticker, &candles, Utc::now());

        assert_eq!(snapshot.symbol, "ETHUSDT");
        assert_eq!(snapshot.current_price, 3000.0);
        assert_eq!(snapshot.price_change_24h, -1.5);
        assert_eq!(snapshot.volume_24h, 42.0);
        assert_eq!(snapshot.high_24h, 3100.0);
        assert_eq!(snapshot.low_24h, 2900.0);
        assert_eq!(snapshot.trend, Trend::Bullish);
        // Only six closes: not enough for indicators
        assert_eq!(snapshot.indicators, meridian_core::Indicators::default());
    }

    #[tokio::test]
    async fn test_fresh_fetch_populates_cache() {
        let source = Arc::new(ScriptedSource::new(50000.0, vec![1.0; 24]));
        let fetcher = fetcher(source);

        let outcome = fetcher.fetch("BTCUSDT").await.unwrap();
        assert!(!outcome.is_stale());
        assert_eq!(outcome.snapshot().current_price, 50000.0);
        assert_eq!(fetcher.snapshot("BTCUSDT"), Some(outcome.into_snapshot()));
    }

    #[tokio::test]
    async fn test_failure_with_cache_serves_cached_snapshot_unchanged() {
        let _ = env_logger::try_init();
        let source = Arc::new(ScriptedSource::new(50000.0, vec![100.0; 24]));
        let fetcher = fetcher(Arc::clone(&source));

        let fresh = fetcher.fetch("BTCUSDT").await.unwrap().into_snapshot();

        source.fail(true);
        let outcome = fetcher.fetch("BTCUSDT").await.unwrap();

        assert!(outcome.is_stale());
        assert_eq!(**outcome.snapshot(), *fresh);
    }

    #[tokio::test]
    async fn test_failure_without_cache_is_data_unavailable() {
        let source = Arc::new(ScriptedSource::new(50000.0, vec![]));
        source.fail(true);
        let fetcher = fetcher(source);

        let err = fetcher.fetch("BTCUSDT").await.unwrap_err();
        assert_eq!(err.symbol(), "BTCUSDT");
        assert!(matches!(
            err,
            MarketDataError::DataUnavailable {
                source: FetchError::Network(_),
                ..
            }
        ));
        assert!(fetcher.snapshot("BTCUSDT").is_none());
    }

    #[tokio::test]
    async fn test_successful_fetch_replaces_entry_wholesale() {
        let source = Arc::new(ScriptedSource::new(100.0, vec![100.0; 24]));
        let fetcher = fetcher(Arc::clone(&source));

        fetcher.fetch("BTCUSDT").await.unwrap();
        {
            let mut ticker = source.ticker.lock();
            ticker.last_price = 200.0;
            ticker.volume = 7.0;
        }
        fetcher.fetch("BTCUSDT").await.unwrap();

        let cached = fetcher.snapshot("BTCUSDT").unwrap();
        assert_eq!(cached.current_price, 200.0);
        assert_eq!(cached.volume_24h, 7.0);
        assert_eq!(fetcher.cache().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_fetch_writes_nothing() {
        let source = Arc::new(
            ScriptedSource::new(50000.0, vec![100.0; 24])
                .with_closes_delay(Duration::from_secs(10)),
        );
        let fetcher = fetcher(source);

        let in_flight = {
            let fetcher = fetcher.clone();
            tokio::spawn(async move { fetcher.fetch("BTCUSDT").await })
        };
        tokio::time::sleep(Duration::from_secs(1)).await;
        in_flight.abort();
        assert!(in_flight.await.unwrap_err().is_cancelled());

        // Well past the point where the closes would have arrived
        tokio::time::sleep(Duration::from_secs(20)).await;
        assert!(fetcher.snapshot("BTCUSDT").is_none());
        assert!(fetcher.cache().is_empty());
    }
}
