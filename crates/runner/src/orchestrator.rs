//! Orchestrator - the per-pair decision cycle
//!
//! Each cycle walks the configured pairs in order:
//! snapshot -> recommendation -> bot -> apply -> stats -> status record.
//! Every pair runs inside its own failure boundary, so one broken pair never
//! keeps the others from being processed.

use futures_util::FutureExt;
use meridian_core::{StatusRecord, Symbol};
use meridian_market_data::SnapshotFetcher;
use meridian_ports::{Analyzer, BotRegistry, StatusSink};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// How a pair's step ended
#[derive(Debug, Clone, PartialEq)]
pub enum PairOutcome {
    /// No snapshot: fetch failed and nothing was cached
    NoData,
    /// The analyzer had no signal
    NoRecommendation,
    /// No active bot for the pair
    NoBot,
    /// The bot declined the recommendation
    Declined,
    /// Applied; the emitted status record
    Applied(StatusRecord),
    /// The step failed unexpectedly
    Failed(String),
}

pub struct Orchestrator {
    pairs: Vec<Symbol>,
    fetcher: SnapshotFetcher,
    analyzer: Arc<dyn Analyzer>,
    bots: Box<dyn BotRegistry>,
    sink: Arc<dyn StatusSink>,
    interval: Duration,
    cycles: u64,
}

impl Orchestrator {
    pub fn new(
        pairs: Vec<Symbol>,
        fetcher: SnapshotFetcher,
        analyzer: Arc<dyn Analyzer>,
        bots: Box<dyn BotRegistry>,
        sink: Arc<dyn StatusSink>,
        interval: Duration,
    ) -> Self {
        Self {
            pairs,
            fetcher,
            analyzer,
            bots,
            sink,
            interval,
            cycles: 0,
        }
    }

    pub fn pairs(&self) -> &[Symbol] {
        &self.pairs
    }

    pub fn bots(&self) -> &dyn BotRegistry {
        self.bots.as_ref()
    }

    /// Completed cycles
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Create a bot for every configured pair. Returns how many were created.
    pub async fn setup_bots(&mut self) -> usize {
        let mut created = 0;
        for pair in &self.pairs {
            match self.bots.create_bot(pair).await {
                Some(handle) => {
                    log::info!("[Orchestrator] {} -> bot {}", pair, handle.id);
                    created += 1;
                }
                None => log::error!("[Orchestrator] failed to create bot for {}", pair),
            }
        }
        created
    }

    /// Run one pass over all pairs
    pub async fn run_cycle(&mut self) -> Vec<(Symbol, PairOutcome)> {
        let pairs = self.pairs.clone();
        let mut outcomes = Vec::with_capacity(pairs.len());

        for pair in pairs {
            let outcome = match AssertUnwindSafe(self.process_pair(&pair))
                .catch_unwind()
                .await
            {
                Ok(outcome) => outcome,
                Err(panic) => {
                    let message = panic
                        .downcast_ref::<&str>()
                        .map(|s| s.to_string())
                        .or_else(|| panic.downcast_ref::<String>().cloned())
                        .unwrap_or_else(|| "unknown panic".to_string());
                    log::error!("[Orchestrator] {} step failed: {}", pair, message);
                    PairOutcome::Failed(message)
                }
            };
            outcomes.push((pair, outcome));
        }

        self.cycles += 1;
        outcomes
    }

    async fn process_pair(&mut self, pair: &str) -> PairOutcome {
        let snapshot = match self.fetcher.fetch(pair).await {
            Ok(outcome) => {
                if outcome.is_stale() {
                    log::warn!(
                        "[Orchestrator] {} using stale snapshot from {}",
                        pair,
                        outcome.snapshot().timestamp
                    );
                }
                outcome.into_snapshot()
            }
            Err(e) => {
                log::warn!("[Orchestrator] {} skipped: {}", pair, e);
                return PairOutcome::NoData;
            }
        };

        let Some(recommendation) = self.analyzer.analyze(&snapshot).await else {
            log::info!("[Orchestrator] {} no recommendation from {}", pair, self.analyzer.name());
            return PairOutcome::NoRecommendation;
        };

        let Some(bot_id) = self.bots.active_bot(pair) else {
            log::warn!("[Orchestrator] {} has no active bot", pair);
            return PairOutcome::NoBot;
        };

        if !self.bots.apply_recommendation(bot_id, &recommendation).await {
            log::info!(
                "[Orchestrator] {} recommendation declined by bot {}",
                pair,
                bot_id
            );
            return PairOutcome::Declined;
        }

        let stats = self.bots.get_stats(bot_id).await;
        let record = StatusRecord::join(&snapshot, &recommendation, stats.as_ref());
        self.sink.emit(&record);
        PairOutcome::Applied(record)
    }

    /// Run cycles until `shutdown` flips to true (or its sender is dropped).
    ///
    /// The shutdown signal is checked between cycles and interrupts the
    /// pause; a cycle in progress always completes. Returns the orchestrator
    /// so its state can be inspected.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> Self {
        log::info!(
            "[Orchestrator] running {} pair(s) every {:?}",
            self.pairs.len(),
            self.interval
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            let outcomes = self.run_cycle().await;
            let applied = outcomes
                .iter()
                .filter(|(_, o)| matches!(o, PairOutcome::Applied(_)))
                .count();
            log::debug!(
                "[Orchestrator] cycle {} done: {}/{} applied",
                self.cycles,
                applied,
                outcomes.len()
            );

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        log::info!("[Orchestrator] stopped after {} cycle(s)", self.cycles);
        self
    }
}
