//! Evaluation scheduler
//!
//! Fires one trading cycle per period inside the configured sessions and
//! never lets two cycles overlap

mod engine;
mod session;
mod types;

pub use engine::{EngineParts, TradingEngine};
pub use session::{SessionParseError, SessionWindow, SessionWindows};
pub use types::{CycleError, CycleOutcome, CycleReport};

use crate::observer::ControlCommand;
use crate::telemetry::{self, CounterMetric};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch, Mutex, Semaphore};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Periodic driver for a [`TradingEngine`]
pub struct Scheduler {
    engine: Arc<Mutex<TradingEngine>>,
    period: Duration,
    in_flight: Arc<Semaphore>,
}

impl Scheduler {
    pub fn new(engine: TradingEngine, period: Duration) -> Self {
        Self {
            engine: Arc::new(Mutex::new(engine)),
            period,
            in_flight: Arc::new(Semaphore::new(1)),
        }
    }

    /// Shared handle to the engine
    pub fn engine(&self) -> Arc<Mutex<TradingEngine>> {
        Arc::clone(&self.engine)
    }

    /// Start a cycle unless one is still running.
    ///
    /// Returns `None` when the tick was dropped.
    pub fn try_fire(&self) -> Option<JoinHandle<CycleOutcome>> {
        let permit = match Arc::clone(&self.in_flight).try_acquire_owned() {
            Ok(permit) => permit,
            Err(_) => {
                telemetry::increment(CounterMetric::TicksDropped);
                tracing::warn!("Previous cycle still running, dropping tick");
                return None;
            }
        };

        let engine = Arc::clone(&self.engine);
        Some(tokio::spawn(async move {
            let _permit = permit;
            let mut engine = engine.lock().await;
            let outcome = engine.run_cycle(Utc::now()).await;
            match &outcome {
                CycleOutcome::Aborted(e) => tracing::warn!(error = %e, "Cycle aborted"),
                CycleOutcome::Completed(report) => tracing::debug!(
                    price = %report.price,
                    commands = report.commands_sent,
                    failed = report.commands_failed,
                    booked = report.slices_booked,
                    "Cycle completed"
                ),
                CycleOutcome::OutsideSession => {}
            }
            outcome
        }))
    }

    /// Tick until `shutdown` flips to true, applying control messages between cycles
    pub async fn run(
        &self,
        mut control_rx: mpsc::Receiver<ControlCommand>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        let mut ticker = tokio::time::interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tracing::info!(period = ?self.period, "Scheduler started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.try_fire();
                }
                Some(command) = control_rx.recv() => {
                    // waits for any running cycle to release the engine
                    self.engine.lock().await.handle_control(command);
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        // let an in-flight cycle finish before returning
        let _ = self.in_flight.acquire().await;
        tracing::info!("Scheduler stopped");
    }
}
