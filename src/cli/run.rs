//! Run command implementation

use crate::config::{Config, ExecutionMode};
use crate::execution::{BridgeVenue, LogReconciler, PaperVenue, Venue};
use crate::feed::{CandleRequest, DerivFeed};
use crate::ledger::{JsonFileStore, PerformanceLedger};
use crate::observer::{Greeting, ObserverHub, ObserverServer, ServerConfig};
use crate::position::PositionStateMachine;
use crate::scheduler::{CycleOutcome, EngineParts, Scheduler, SessionWindows, TradingEngine};
use crate::signal::SignalEvaluator;
use chrono::Utc;
use clap::Args;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Run a single evaluation cycle and exit
    #[arg(long)]
    pub once: bool,

    /// Force paper execution regardless of the configured mode
    #[arg(long)]
    pub paper: bool,

    /// Ignore trading sessions and evaluate on every tick
    #[arg(long)]
    pub always_on: bool,
}

impl RunArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let hub = ObserverHub::new(
            config.observer.channel_capacity,
            Greeting {
                stats: Default::default(),
                lot_size: config.risk.default_lot,
            },
        );
        let engine = self.build_engine(config, hub.clone())?;

        if self.once {
            match engine_once(engine).await {
                CycleOutcome::Completed(report) => {
                    println!(
                        "price={} ema_fast={:.2} ema_slow={:.2} rsi={:.2} signal={:?} opened={:?}",
                        report.price,
                        report.snapshot.ema_fast,
                        report.snapshot.ema_slow,
                        report.snapshot.rsi,
                        report.signal,
                        report.opened
                    );
                }
                CycleOutcome::OutsideSession => println!("Outside trading sessions"),
                CycleOutcome::Aborted(e) => anyhow::bail!("Cycle aborted: {e}"),
            }
            return Ok(());
        }

        let (control_tx, control_rx) = mpsc::channel(64);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let server = ObserverServer::new(
            ServerConfig {
                bind: config.observer.bind.clone(),
                heartbeat: Duration::from_secs(config.observer.heartbeat_secs.max(1)),
            },
            hub,
            control_tx,
        );
        let listener = server.bind().await?;
        let server_task = tokio::spawn(server.serve(listener, shutdown_rx.clone()));

        let scheduler = Scheduler::new(engine, config.scheduler.period());

        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => tracing::info!("Shutdown requested"),
                Err(e) => tracing::error!(error = %e, "Failed to listen for ctrl-c"),
            }
            let _ = shutdown_tx.send(true);
        });

        scheduler.run(control_rx, shutdown_rx).await;
        server_task.await?;

        Ok(())
    }

    fn build_engine(&self, config: &Config, hub: ObserverHub) -> anyhow::Result<TradingEngine> {
        let venue: Arc<dyn Venue> = match (config.execution.mode, self.paper) {
            (ExecutionMode::Live, false) => {
                tracing::info!(url = %config.execution.bridge_url, "Live execution via bridge");
                Arc::new(BridgeVenue::new(
                    config.execution.bridge_url.clone(),
                    config.execution.timeout(),
                )?)
            }
            _ => {
                tracing::info!("Paper execution");
                Arc::new(PaperVenue::new())
            }
        };

        let sessions = if self.always_on {
            SessionWindows::default()
        } else {
            SessionWindows::new(config.scheduler.sessions.clone())
        };

        let ledger = PerformanceLedger::load(
            Box::new(JsonFileStore::new(&config.ledger.path)),
            config.instrument.contract_multiplier,
        );

        Ok(TradingEngine::new(EngineParts {
            feed: Arc::new(DerivFeed::new(config.feed.url.clone())),
            venue,
            reconciler: Arc::new(LogReconciler),
            indicators: config.strategy.indicators(),
            evaluator: SignalEvaluator::new(config.strategy.thresholds()),
            machine: PositionStateMachine::new(config.position_params()),
            ledger,
            hub,
            sessions,
            candle_request: CandleRequest {
                symbol: config.instrument.feed_symbol.clone(),
                granularity_secs: config.feed.granularity_secs,
                count: config.feed.candle_count,
            },
            min_candles: config.feed.min_candles,
            feed_timeout: config.feed.timeout(),
            lot_size: config.risk.default_lot,
        }))
    }
}

async fn engine_once(mut engine: TradingEngine) -> CycleOutcome {
    engine.run_cycle(Utc::now()).await
}
