//! Integration test: MarketDataSource -> StreamingAggregator -> clients
//!
//! Drives the per-symbol loops on a paused clock and checks broadcast,
//! backoff, observer isolation and shutdown.

use async_trait::async_trait;
use meridian_core::{CandleSeries, LiveTicker, Ticker};
use meridian_gateway::{
    ChannelConnection, Connection, ConnectionId, ConnectionRegistry, ObserverError,
    PriceObserver, StreamConfig, StreamingAggregator, TransportError,
};
use meridian_ports::{FetchError, FetchResult, MarketDataSource};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

/// Data source with per-symbol prices and failures
#[derive(Default)]
struct ScriptedSource {
    prices: Mutex<HashMap<String, f64>>,
    failing: Mutex<HashSet<String>>,
    calls: Mutex<HashMap<String, usize>>,
    closed: AtomicBool,
}

impl ScriptedSource {
    fn with_price(symbol: &str, price: f64) -> Arc<Self> {
        let source = Arc::new(Self::default());
        source.set_price(symbol, price);
        source
    }

    fn set_price(&self, symbol: &str, price: f64) {
        self.prices.lock().insert(symbol.to_string(), price);
    }

    fn set_failing(&self, symbol: &str, failing: bool) {
        let mut set = self.failing.lock();
        if failing {
            set.insert(symbol.to_string());
        } else {
            set.remove(symbol);
        }
    }

    fn calls(&self, symbol: &str) -> usize {
        self.calls.lock().get(symbol).copied().unwrap_or(0)
    }
}

#[async_trait]
impl MarketDataSource for ScriptedSource {
    async fn ticker(&self, symbol: &str) -> FetchResult<Ticker> {
        *self.calls.lock().entry(symbol.to_string()).or_default() += 1;
        if self.closed.load(Ordering::SeqCst) {
            return Err(FetchError::Closed);
        }
        if self.failing.lock().contains(symbol) {
            return Err(FetchError::Network("timed out".to_string()));
        }
        let price = self
            .prices
            .lock()
            .get(symbol)
            .copied()
            .ok_or_else(|| FetchError::Api {
                code: -1121,
                message: "Invalid symbol.".to_string(),
            })?;
        Ok(Ticker {
            symbol: symbol.to_string(),
            last_price: price,
            price_change_percent: 0.5,
            volume: 100.0,
            high_price: price,
            low_price: price,
        })
    }

    async fn closes(&self, _symbol: &str) -> FetchResult<CandleSeries> {
        Ok(CandleSeries::default())
    }

    async fn close(&self) -> FetchResult<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Connection that records payloads, optionally failing every send
struct RecordingConnection {
    id: ConnectionId,
    fail: bool,
    received: Mutex<Vec<String>>,
}

impl RecordingConnection {
    fn new(fail: bool) -> Arc<Self> {
        Arc::new(Self {
            id: ConnectionId::new(),
            fail,
            received: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl Connection for RecordingConnection {
    fn id(&self) -> ConnectionId {
        self.id
    }

    async fn send(&self, payload: &str) -> Result<(), TransportError> {
        if self.fail {
            return Err(TransportError::Send("broken pipe".to_string()));
        }
        self.received.lock().push(payload.to_string());
        Ok(())
    }

    async fn close(&self) -> Result<(), TransportError> {
        if self.fail {
            return Err(TransportError::Close("already reset".to_string()));
        }
        Ok(())
    }
}

#[derive(Default)]
struct CountingObserver {
    calls: AtomicUsize,
}

#[async_trait]
impl PriceObserver for CountingObserver {
    async fn on_price(&self, _ticker: &LiveTicker) -> Result<(), ObserverError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct PanickingObserver;

#[async_trait]
impl PriceObserver for PanickingObserver {
    async fn on_price(&self, _ticker: &LiveTicker) -> Result<(), ObserverError> {
        panic!("observer bug");
    }
}

fn fast_config() -> StreamConfig {
    StreamConfig {
        cadence: Duration::from_secs(1),
        backoff: Duration::from_secs(5),
    }
}

/// Broadcast to {A, B, C} where B fails: only B is removed, A and C received
#[tokio::test]
async fn test_broadcast_prunes_only_failed_connection() {
    let _ = env_logger::try_init();
    let registry = ConnectionRegistry::new();

    let a = RecordingConnection::new(false);
    let b = RecordingConnection::new(true);
    let c = RecordingConnection::new(false);

    let mut keep_alive = Vec::new();
    for conn in [&a, &b, &c] {
        let (tx, rx) = tokio::sync::mpsc::channel(1);
        keep_alive.push(tx);
        registry.accept(conn.clone(), rx);
    }
    assert_eq!(registry.len(), 3);

    let report = registry.broadcast("{\"tick\":1}").await;

    assert_eq!(report.delivered, 2);
    assert_eq!(report.failed, vec![b.id()]);
    assert!(registry.contains(a.id()));
    assert!(!registry.contains(b.id()));
    assert!(registry.contains(c.id()));
    assert_eq!(a.received.lock().as_slice(), ["{\"tick\":1}"]);
    assert_eq!(c.received.lock().as_slice(), ["{\"tick\":1}"]);

    // Pruned connections are never re-added
    registry.broadcast("{\"tick\":2}").await;
    assert_eq!(registry.len(), 2);
    assert_eq!(a.received.lock().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_subscribed_symbol_streams_to_clients() {
    let source = ScriptedSource::with_price("BTCUSDT", 50000.0);
    let aggregator = StreamingAggregator::new(source.clone(), fast_config());

    let (conn, inbound, mut client) = ChannelConnection::pair(16);
    aggregator.accept_connection(Arc::new(conn), inbound);

    aggregator.start();
    assert_eq!(aggregator.subscribe(["BTCUSDT"]), vec!["BTCUSDT".to_string()]);

    let payload = client.recv().await.unwrap();
    let value: serde_json::Value = serde_json::from_str(&payload).unwrap();
    let object = value.as_object().unwrap();
    assert_eq!(object.len(), 5);
    assert_eq!(object["symbol"], "BTCUSDT");
    assert_eq!(object["current_price"], 50000.0);

    source.set_price("BTCUSDT", 50100.0);
    let payload = client.recv().await.unwrap();
    let live: LiveTicker = serde_json::from_str(&payload).unwrap();
    assert_eq!(live.current_price, 50100.0);
    assert_eq!(aggregator.live_state("BTCUSDT").unwrap().current_price, 50100.0);

    aggregator.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_resubscribe_keeps_live_state() {
    let source = ScriptedSource::with_price("ETHUSDT", 3000.0);
    let aggregator = StreamingAggregator::new(source.clone(), fast_config());
    aggregator.start();
    aggregator.subscribe(["ETHUSDT"]);

    tokio::time::sleep(Duration::from_millis(10)).await;
    let before = aggregator.live_state("ETHUSDT").unwrap();
    assert_eq!(before.current_price, 3000.0);

    source.set_price("ETHUSDT", 1.0);
    assert!(aggregator.subscribe(["ETHUSDT"]).is_empty());

    let after = aggregator.live_state("ETHUSDT").unwrap();
    assert!(Arc::ptr_eq(&before, &after));
    assert_eq!(aggregator.active_loops(), 1);

    aggregator.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_subscribe_before_start_waits_for_start() {
    let source = ScriptedSource::with_price("BTCUSDT", 1.0);
    let aggregator = StreamingAggregator::new(source.clone(), fast_config());

    aggregator.subscribe(["BTCUSDT"]);
    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(source.calls("BTCUSDT"), 0);
    assert!(aggregator.live_state("BTCUSDT").is_none());

    aggregator.start();
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(source.calls("BTCUSDT"), 1);

    aggregator.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_fetch_failure_backs_off_and_recovers() {
    let _ = env_logger::try_init();
    let source = ScriptedSource::with_price("BTCUSDT", 42.0);
    source.set_failing("BTCUSDT", true);

    let aggregator = StreamingAggregator::new(source.clone(), fast_config());
    aggregator.start();
    aggregator.subscribe(["BTCUSDT"]);

    tokio::time::sleep(Duration::from_millis(4900)).await;
    assert_eq!(source.calls("BTCUSDT"), 1);

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(source.calls("BTCUSDT"), 2);
    assert!(aggregator.live_state("BTCUSDT").is_none());

    source.set_failing("BTCUSDT", false);
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(aggregator.live_state("BTCUSDT").unwrap().current_price, 42.0);

    aggregator.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_backoff_on_one_symbol_does_not_stall_others() {
    let source = ScriptedSource::with_price("GOODUSDT", 10.0);
    source.set_failing("BADUSDT", true);

    let aggregator = StreamingAggregator::new(source.clone(), fast_config());
    aggregator.start();
    aggregator.subscribe(["BADUSDT", "GOODUSDT"]);

    tokio::time::sleep(Duration::from_millis(3500)).await;
    assert_eq!(source.calls("BADUSDT"), 1);
    assert_eq!(source.calls("GOODUSDT"), 4);

    aggregator.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_observer_panic_does_not_stop_loop() {
    let source = ScriptedSource::with_price("BTCUSDT", 1.0);
    let aggregator = StreamingAggregator::new(source.clone(), fast_config());

    let panicking: Arc<dyn PriceObserver> = Arc::new(PanickingObserver);
    let counter = Arc::new(CountingObserver::default());
    let counting: Arc<dyn PriceObserver> = counter.clone();
    aggregator.add_observer(&panicking);
    let id = aggregator.add_observer(&counting);

    aggregator.start();
    aggregator.subscribe(["BTCUSDT"]);
    tokio::time::sleep(Duration::from_millis(2500)).await;

    assert_eq!(counter.calls.load(Ordering::SeqCst), 3);
    assert_eq!(aggregator.active_loops(), 1);

    assert!(aggregator.remove_observer(id));
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(counter.calls.load(Ordering::SeqCst), 3);

    aggregator.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_stop_tears_everything_down() {
    let source = ScriptedSource::with_price("BTCUSDT", 1.0);
    let aggregator = StreamingAggregator::new(source.clone(), fast_config());

    let (conn, inbound, mut client) = ChannelConnection::pair(64);
    aggregator.accept_connection(Arc::new(conn), inbound);
    // A connection whose close fails must not block the rest of the teardown
    let broken = RecordingConnection::new(true);
    let (_keep, broken_in) = tokio::sync::mpsc::channel(1);
    aggregator.accept_connection(broken, broken_in);

    aggregator.start();
    aggregator.subscribe(["BTCUSDT"]);
    tokio::time::sleep(Duration::from_millis(10)).await;

    aggregator.stop().await;

    assert!(!aggregator.is_running());
    assert_eq!(aggregator.active_loops(), 0);
    assert!(aggregator.registry().is_empty());
    assert!(source.closed.load(Ordering::SeqCst));

    // Drain whatever was pushed before the stop; then the stream ends
    while client.recv().await.is_some() {}

    let calls = source.calls("BTCUSDT");
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(source.calls("BTCUSDT"), calls);
}

#[tokio::test]
async fn test_latest_price_falls_back_to_source() {
    let source = ScriptedSource::with_price("SOLUSDT", 150.0);
    let aggregator = StreamingAggregator::new(source.clone(), fast_config());

    assert_eq!(aggregator.latest_price("SOLUSDT").await, Some(150.0));
    assert_eq!(aggregator.latest_price("UNKNOWN").await, None);
    assert!(!aggregator.is_subscribed("SOLUSDT"));
}
