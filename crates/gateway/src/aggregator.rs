//! Streaming aggregator
//!
//! Owns one polling task per subscribed symbol. Each iteration fetches the
//! lightweight ticker, replaces the symbol's live record, notifies observers
//! and broadcasts the record to every connected client. Failures back off and
//! retry; a loop only ends on [`StreamingAggregator::stop`].

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use meridian_core::{LiveTicker, Price, Symbol};
use meridian_ports::{Clock, MarketDataSource, SystemClock};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::connection::{Connection, ConnectionId};
use crate::observer::{ObserverId, ObserverSet, PriceObserver};
use crate::registry::ConnectionRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConfig {
    /// Pause between successful iterations
    pub cadence: Duration,
    /// Pause after a failed fetch
    pub backoff: Duration,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            cadence: Duration::from_secs(1),
            backoff: Duration::from_secs(5),
        }
    }
}

struct Inner {
    source: Arc<dyn MarketDataSource>,
    clock: Arc<dyn Clock>,
    config: StreamConfig,
    running: AtomicBool,
    /// Subscribed symbols; `None` until the first tick arrives
    live: DashMap<Symbol, Option<Arc<LiveTicker>>>,
    tasks: Mutex<HashMap<Symbol, JoinHandle<()>>>,
    observers: ObserverSet,
    registry: Arc<ConnectionRegistry>,
}

/// Per-symbol live ticker streaming with fan-out to observers and clients.
///
/// Cheap to clone; clones drive the same loops.
#[derive(Clone)]
pub struct StreamingAggregator {
    inner: Arc<Inner>,
}

impl StreamingAggregator {
    pub fn new(source: Arc<dyn MarketDataSource>, config: StreamConfig) -> Self {
        Self::with_clock(source, config, Arc::new(SystemClock))
    }

    pub fn with_clock(
        source: Arc<dyn MarketDataSource>,
        config: StreamConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                source,
                clock,
                config,
                running: AtomicBool::new(false),
                live: DashMap::new(),
                tasks: Mutex::new(HashMap::new()),
                observers: ObserverSet::new(),
                registry: ConnectionRegistry::new(),
            }),
        }
    }

    /// Start streaming. Symbols subscribed before start get their loops now.
    pub fn start(&self) {
        if self.inner.running.swap(true, Ordering::SeqCst) {
            return;
        }

        let symbols: Vec<Symbol> = self.inner.live.iter().map(|e| e.key().clone()).collect();
        for symbol in symbols {
            self.spawn_loop(symbol);
        }
        log::info!(
            "[Stream] started with {} symbol(s)",
            self.inner.live.len()
        );
    }

    pub fn is_running(&self) -> bool {
        self.inner.running.load(Ordering::SeqCst)
    }

    /// Subscribe to symbols.
    ///
    /// Idempotent per symbol: an already subscribed symbol keeps its live
    /// record and its loop. Returns the symbols that were newly added.
    pub fn subscribe<I, S>(&self, symbols: I) -> Vec<Symbol>
    where
        I: IntoIterator<Item = S>,
        S: Into<Symbol>,
    {
        let mut added = Vec::new();
        for symbol in symbols {
            let symbol = symbol.into();
            let inserted = match self.inner.live.entry(symbol.clone()) {
                Entry::Occupied(_) => false,
                Entry::Vacant(slot) => {
                    slot.insert(None);
                    true
                }
            };

            if !inserted {
                log::debug!("[Stream] {} already subscribed", symbol);
                continue;
            }

            log::info!("[Stream] subscribed {}", symbol);
            if self.is_running() {
                self.spawn_loop(symbol.clone());
            }
            added.push(symbol);
        }
        added
    }

    fn spawn_loop(&self, symbol: Symbol) {
        let mut tasks = self.inner.tasks.lock();
        if tasks.get(&symbol).is_some_and(|t| !t.is_finished()) {
            return;
        }

        let inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(run_symbol(inner, symbol.clone()));
        tasks.insert(symbol, handle);
    }

    /// Stop streaming.
    ///
    /// Every step runs even if an earlier one failed: stop the loops, close
    /// all client connections, release the data source, then clear the task
    /// and connection sets.
    pub async fn stop(&self) {
        self.inner.running.store(false, Ordering::SeqCst);

        let handles: Vec<(Symbol, JoinHandle<()>)> = self.inner.tasks.lock().drain().collect();
        for (_, handle) in &handles {
            handle.abort();
        }
        for (symbol, handle) in handles {
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    log::error!("[Stream] {} loop ended abnormally: {}", symbol, e);
                }
            }
        }

        let failed_closes = self.inner.registry.close_all().await;
        if failed_closes > 0 {
            log::warn!("[Stream] {} connection(s) failed to close", failed_closes);
        }

        if let Err(e) = self.inner.source.close().await {
            log::error!("[Stream] failed to release data source: {}", e);
        }

        self.inner.tasks.lock().clear();
        log::info!("[Stream] stopped");
    }

    /// Current live record for a symbol
    pub fn live_state(&self, symbol: &str) -> Option<Arc<LiveTicker>> {
        self.inner.live.get(symbol).and_then(|e| e.value().clone())
    }

    /// Latest known price, fetching the ticker once if no live record exists
    pub async fn latest_price(&self, symbol: &str) -> Option<Price> {
        if let Some(live) = self.live_state(symbol) {
            return Some(live.current_price);
        }

        match self.inner.source.ticker(symbol).await {
            Ok(ticker) => Some(ticker.last_price),
            Err(e) => {
                log::warn!("[Stream] price lookup for {} failed: {}", symbol, e);
                None
            }
        }
    }

    pub fn subscribed(&self) -> Vec<Symbol> {
        self.inner.live.iter().map(|e| e.key().clone()).collect()
    }

    pub fn is_subscribed(&self, symbol: &str) -> bool {
        self.inner.live.contains_key(symbol)
    }

    /// Number of symbol loops currently alive
    pub fn active_loops(&self) -> usize {
        self.inner
            .tasks
            .lock()
            .values()
            .filter(|t| !t.is_finished())
            .count()
    }

    pub fn add_observer(&self, observer: &Arc<dyn PriceObserver>) -> ObserverId {
        self.inner.observers.add(observer)
    }

    pub fn remove_observer(&self, id: ObserverId) -> bool {
        self.inner.observers.remove(id)
    }

    /// Register a streaming client
    pub fn accept_connection(
        &self,
        connection: Arc<dyn Connection>,
        inbound: mpsc::Receiver<String>,
    ) -> ConnectionId {
        self.inner.registry.accept(connection, inbound)
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.inner.registry
    }
}

async fn run_symbol(inner: Arc<Inner>, symbol: Symbol) {
    log::info!("[Stream] {} loop started", symbol);

    while inner.running.load(Ordering::SeqCst) {
        let ticker = match inner.source.ticker(&symbol).await {
            Ok(ticker) => ticker,
            Err(e) => {
                log::warn!(
                    "[Stream] {} ticker fetch failed: {}, retrying in {:?}",
                    symbol,
                    e,
                    inner.config.backoff
                );
                tokio::time::sleep(inner.config.backoff).await;
                continue;
            }
        };

        let live = Arc::new(LiveTicker::from_ticker(&ticker, inner.clock.now()));
        inner.live.insert(symbol.clone(), Some(Arc::clone(&live)));

        inner.observers.notify(&live).await;

        match serde_json::to_string(live.as_ref()) {
            Ok(payload) => {
                let report = inner.registry.broadcast(&payload).await;
                log::trace!(
                    "[Stream] {} @ {} -> {} client(s)",
                    symbol,
                    live.current_price,
                    report.delivered
                );
            }
            Err(e) => log::error!("[Stream] {} payload encoding failed: {}", symbol, e),
        }

        tokio::time::sleep(inner.config.cadence).await;
    }

    log::info!("[Stream] {} loop exited", symbol);
}
