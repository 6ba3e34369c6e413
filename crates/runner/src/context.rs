//! Runtime context
//!
//! One explicitly constructed object owning every component for the life of
//! the process. `start` sets the bots up and launches the streaming loops
//! and the orchestrator; `stop` tears them down in reverse order.

use meridian_bots::create_bot_registry;
use meridian_gateway::StreamingAggregator;
use meridian_market_data::{BinanceRestSource, SnapshotFetcher};
use meridian_ports::{Analyzer, BotRegistry, Clock, MarketDataSource, StatusSink, SystemClock};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::analyzer::RuleBasedAnalyzer;
use crate::config::RunnerConfig;
use crate::error::{Result, RunnerError};
use crate::orchestrator::Orchestrator;
use crate::status::LogStatusSink;

enum OrchestratorState {
    Idle(Orchestrator),
    Running(JoinHandle<Orchestrator>),
    Stopped,
}

pub struct Context {
    config: RunnerConfig,
    fetcher: SnapshotFetcher,
    aggregator: StreamingAggregator,
    orchestrator: OrchestratorState,
    shutdown: watch::Sender<bool>,
}

impl Context {
    /// Assemble a context from explicit components
    pub fn new(
        config: RunnerConfig,
        source: Arc<dyn MarketDataSource>,
        analyzer: Arc<dyn Analyzer>,
        bots: Box<dyn BotRegistry>,
        sink: Arc<dyn StatusSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let fetcher = SnapshotFetcher::with_clock(Arc::clone(&source), Arc::clone(&clock));
        let aggregator = StreamingAggregator::with_clock(source, config.stream_config(), clock);
        let orchestrator = Orchestrator::new(
            config.trading_pairs.clone(),
            fetcher.clone(),
            analyzer,
            bots,
            sink,
            config.update_interval(),
        );
        let (shutdown, _) = watch::channel(false);

        Self {
            config,
            fetcher,
            aggregator,
            orchestrator: OrchestratorState::Idle(orchestrator),
            shutdown,
        }
    }

    /// Production wiring: Binance market data, the configured bot backend,
    /// the rule-based analyzer and a logging status sink
    pub fn from_config(config: RunnerConfig) -> Result<Self> {
        config.validate()?;

        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let source: Arc<dyn MarketDataSource> =
            Arc::new(BinanceRestSource::new(config.binance_config())?);
        let bots = create_bot_registry(
            config.mode,
            &config.remote_bot_config(),
            Arc::clone(&clock),
        )?;

        Ok(Self::new(
            config,
            source,
            Arc::new(RuleBasedAnalyzer::default()),
            bots,
            Arc::new(LogStatusSink),
            clock,
        ))
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    pub fn fetcher(&self) -> &SnapshotFetcher {
        &self.fetcher
    }

    pub fn aggregator(&self) -> &StreamingAggregator {
        &self.aggregator
    }

    pub fn is_running(&self) -> bool {
        matches!(self.orchestrator, OrchestratorState::Running(_))
    }

    /// Create bots, start streaming and launch the orchestrator
    pub async fn start(&mut self) -> Result<()> {
        let mut orchestrator =
            match std::mem::replace(&mut self.orchestrator, OrchestratorState::Stopped) {
                OrchestratorState::Idle(orchestrator) => orchestrator,
                other => {
                    self.orchestrator = other;
                    return Err(RunnerError::AlreadyStarted);
                }
            };

        let created = orchestrator.setup_bots().await;
        log::info!(
            "[Context] {}/{} bot(s) created",
            created,
            orchestrator.pairs().len()
        );

        self.aggregator.start();
        self.aggregator
            .subscribe(self.config.stream_symbols().iter().cloned());

        self.shutdown.send_replace(false);
        let handle = tokio::spawn(orchestrator.run(self.shutdown.subscribe()));
        self.orchestrator = OrchestratorState::Running(handle);

        log::info!("[Context] started");
        Ok(())
    }

    /// Stop the orchestrator, then streaming (which releases the data source).
    ///
    /// Returns the orchestrator once its last cycle finished.
    pub async fn stop(&mut self) -> Result<Option<Orchestrator>> {
        self.shutdown.send_replace(true);

        let state = std::mem::replace(&mut self.orchestrator, OrchestratorState::Stopped);
        let result = match state {
            OrchestratorState::Running(handle) => handle
                .await
                .map(Some)
                .map_err(|e| RunnerError::Join(e.to_string())),
            OrchestratorState::Idle(orchestrator) => Ok(Some(orchestrator)),
            OrchestratorState::Stopped => Ok(None),
        };

        if let Err(e) = &result {
            log::error!("[Context] orchestrator did not stop cleanly: {}", e);
        }

        self.aggregator.stop().await;
        log::info!("[Context] stopped");
        result
    }
}
