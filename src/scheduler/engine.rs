//! One evaluation cycle: fetch, evaluate, manage, execute, book, broadcast

use super::session::SessionWindows;
use super::types::{CycleError, CycleOutcome, CycleReport};
use crate::execution::{Reconciler, Venue, VenueCommand};
use crate::feed::{CandleRequest, CandleSource};
use crate::indicator::IndicatorEngine;
use crate::ledger::{self, PerformanceLedger};
use crate::observer::{ControlCommand, ObserverEvent, ObserverHub};
use crate::position::{PositionStateMachine, RealizedSlice};
use crate::signal::SignalEvaluator;
use crate::telemetry::{self, CounterMetric, GaugeMetric, LatencyMetric};
use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Collaborators and tunables for a [`TradingEngine`]
pub struct EngineParts {
    pub feed: Arc<dyn CandleSource>,
    pub venue: Arc<dyn Venue>,
    pub reconciler: Arc<dyn Reconciler>,
    pub indicators: IndicatorEngine,
    pub evaluator: SignalEvaluator,
    pub machine: PositionStateMachine,
    pub ledger: PerformanceLedger,
    pub hub: ObserverHub,
    pub sessions: SessionWindows,
    pub candle_request: CandleRequest,
    /// Cycles with fewer candles are skipped
    pub min_candles: usize,
    pub feed_timeout: Duration,
    /// Lot size for newly opened positions
    pub lot_size: Decimal,
}

/// Owns all mutable trading state; driven by the scheduler one cycle at a time
pub struct TradingEngine {
    feed: Arc<dyn CandleSource>,
    venue: Arc<dyn Venue>,
    reconciler: Arc<dyn Reconciler>,
    indicators: IndicatorEngine,
    evaluator: SignalEvaluator,
    machine: PositionStateMachine,
    ledger: PerformanceLedger,
    hub: ObserverHub,
    sessions: SessionWindows,
    candle_request: CandleRequest,
    min_candles: usize,
    feed_timeout: Duration,
    lot_size: Decimal,
}

impl TradingEngine {
    pub fn new(parts: EngineParts) -> Self {
        parts.hub.set_stats(parts.ledger.snapshot());
        parts.hub.set_lot_size(parts.lot_size);
        Self {
            feed: parts.feed,
            venue: parts.venue,
            reconciler: parts.reconciler,
            indicators: parts.indicators,
            evaluator: parts.evaluator,
            machine: parts.machine,
            ledger: parts.ledger,
            hub: parts.hub,
            sessions: parts.sessions,
            candle_request: parts.candle_request,
            min_candles: parts.min_candles,
            feed_timeout: parts.feed_timeout,
            lot_size: parts.lot_size,
        }
    }

    /// Run one evaluation cycle as of `now`
    pub async fn run_cycle(&mut self, now: DateTime<Utc>) -> CycleOutcome {
        let started = Instant::now();

        if !self.sessions.is_active(now) {
            tracing::debug!(%now, "Outside trading sessions");
            self.publish_performance();
            return CycleOutcome::OutsideSession;
        }

        let outcome = match self.evaluate_and_manage().await {
            Ok(report) => {
                telemetry::increment(CounterMetric::CyclesCompleted);
                CycleOutcome::Completed(report)
            }
            Err(e) => {
                telemetry::increment(CounterMetric::CyclesAborted);
                CycleOutcome::Aborted(e)
            }
        };

        self.publish_performance();
        telemetry::record_latency(LatencyMetric::Cycle, started.elapsed());
        outcome
    }

    async fn evaluate_and_manage(&mut self) -> Result<CycleReport, CycleError> {
        let closes = self.fetch_closes().await?;

        if closes.len() < self.min_candles {
            tracing::info!(got = closes.len(), needed = self.min_candles, "Insufficient candles");
            self.hub
                .publish(ObserverEvent::status(format!("Insufficient candles ({})", closes.len())));
            return Err(CycleError::InsufficientData {
                got: closes.len(),
                needed: self.min_candles,
            });
        }

        let series: Vec<f64> = closes.iter().filter_map(|c| c.to_f64()).collect();
        let (Some(&price), Some(snapshot)) = (closes.last(), self.indicators.snapshot(&series)) else {
            tracing::info!(got = series.len(), needed = self.indicators.required_len(), "Not enough data for indicators");
            self.hub
                .publish(ObserverEvent::status("Not enough data for indicators"));
            return Err(CycleError::InsufficientData {
                got: series.len(),
                needed: self.indicators.required_len(),
            });
        };

        let raw = self.evaluator.evaluate(&snapshot);
        let signal = self.evaluator.forward(raw);

        tracing::info!(
            %price,
            ema_fast = snapshot.ema_fast,
            ema_slow = snapshot.ema_slow,
            rsi = snapshot.rsi,
            raw_signal = ?raw,
            signal = ?signal,
            "Cycle evaluated"
        );

        let advance = self.machine.advance(price, signal, self.lot_size);

        let commands_sent = advance.venue_commands.len();
        let mut commands_failed = 0;
        for command in &advance.venue_commands {
            if let Err(e) = self.execute(command).await {
                commands_failed += 1;
                self.hub.publish(ObserverEvent::error(e.to_string()));
            }
        }

        self.hub.publish_all(advance.broadcast_events.iter().cloned());

        for slice in &advance.ledger_events {
            self.book(slice);
        }

        if let Some(side) = advance.opened {
            self.evaluator.acknowledge(side);
        } else if self.machine.position().is_none() {
            self.hub.publish(ObserverEvent::status(format!(
                "No new signal. EMA{}={:.2} EMA{}={:.2} RSI={:.2}",
                self.indicators.fast_period(),
                snapshot.ema_fast,
                self.indicators.slow_period(),
                snapshot.ema_slow,
                snapshot.rsi
            )));
        }

        self.update_position_gauges();

        Ok(CycleReport {
            price,
            snapshot,
            signal,
            opened: advance.opened,
            commands_sent,
            commands_failed,
            slices_booked: advance.ledger_events.len(),
        })
    }

    async fn fetch_closes(&self) -> Result<Vec<Decimal>, CycleError> {
        let started = Instant::now();
        let fetched =
            tokio::time::timeout(self.feed_timeout, self.feed.fetch_candles(&self.candle_request)).await;
        telemetry::record_latency(LatencyMetric::CandleFetch, started.elapsed());

        let candles = match fetched {
            Ok(Ok(candles)) => candles,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Candle fetch failed");
                self.hub.publish(ObserverEvent::error(format!("Candle fetch failed: {e}")));
                return Err(e.into());
            }
            Err(_) => {
                tracing::warn!(timeout = ?self.feed_timeout, "Candle fetch timed out");
                self.hub.publish(ObserverEvent::status("Candle fetch timed out, skipping cycle"));
                return Err(CycleError::FeedTimeout(self.feed_timeout));
            }
        };

        Ok(candles.into_iter().map(|c| c.close).collect())
    }

    async fn execute(&self, command: &VenueCommand) -> Result<(), CycleError> {
        let started = Instant::now();
        let result = self.venue.execute(command).await;
        telemetry::record_latency(LatencyMetric::VenueCommand, started.elapsed());

        match result {
            Ok(receipt) => {
                tracing::info!(action = command.action(), status = %receipt.status, "Venue command executed");
                Ok(())
            }
            Err(e) => {
                telemetry::increment(CounterMetric::VenueFailures);
                tracing::error!(action = command.action(), error = %e, "Venue command failed");
                self.reconciler.venue_failed(command, &e, self.machine.position());
                Err(CycleError::VenueCommand {
                    action: command.action(),
                    source: e,
                })
            }
        }
    }

    fn book(&mut self, slice: &RealizedSlice) {
        let recorded = self
            .ledger
            .record_trade(slice.entry, slice.exit, slice.side, slice.lot);
        self.hub.publish(ObserverEvent::from(&recorded.trade));

        if let Some(e) = recorded.persist_error {
            telemetry::increment(CounterMetric::PersistFailures);
            self.hub
                .publish(ObserverEvent::error(CycleError::Persistence(e).to_string()));
        }
    }

    /// Apply an observer control message
    pub fn handle_control(&mut self, command: ControlCommand) {
        match command {
            ControlCommand::LotSize(lot) => {
                self.lot_size = lot;
                self.hub.set_lot_size(lot);
                telemetry::set_gauge(GaugeMetric::LotSize, ledger::to_f64(lot));
                tracing::info!(%lot, "Lot size updated");
                self.hub
                    .publish(ObserverEvent::status(format!("Lot size updated to {lot}")));
            }
            ControlCommand::ResetStats => match self.ledger.reset() {
                Ok(()) => {
                    self.hub.publish(ObserverEvent::status("Performance stats reset"));
                }
                Err(e) => {
                    telemetry::increment(CounterMetric::PersistFailures);
                    self.hub
                        .publish(ObserverEvent::error(CycleError::Persistence(e).to_string()));
                }
            },
        }
        self.publish_performance();
    }

    fn publish_performance(&self) {
        let stats = self.ledger.snapshot();
        telemetry::set_gauge(GaugeMetric::NetProfit, ledger::to_f64(stats.net_profit));
        telemetry::set_gauge(GaugeMetric::WinRate, stats.win_rate);
        telemetry::set_gauge(GaugeMetric::TotalTrades, stats.total_trades as f64);
        telemetry::set_gauge(GaugeMetric::Observers, self.hub.observer_count() as f64);
        self.hub.publish(ObserverEvent::performance(stats));
    }

    fn update_position_gauges(&self) {
        let (open, lot) = match self.machine.position() {
            Some(position) => (1.0, ledger::to_f64(position.lot_remaining)),
            None => (0.0, 0.0),
        };
        telemetry::set_gauge(GaugeMetric::OpenPosition, open);
        telemetry::set_gauge(GaugeMetric::LotRemaining, lot);
    }

    pub fn lot_size(&self) -> Decimal {
        self.lot_size
    }

    pub fn machine(&self) -> &PositionStateMachine {
        &self.machine
    }

    pub fn ledger(&self) -> &PerformanceLedger {
        &self.ledger
    }

    pub fn evaluator(&self) -> &SignalEvaluator {
        &self.evaluator
    }

    pub fn hub(&self) -> &ObserverHub {
        &self.hub
    }
}
