//! Scheduler types

use crate::execution::VenueError;
use crate::feed::FeedError;
use crate::indicator::IndicatorSnapshot;
use crate::ledger::LedgerError;
use crate::signal::Side;
use rust_decimal::Decimal;
use std::time::Duration;
use thiserror::Error;

/// Reasons a cycle ended early or partly failed
#[derive(Debug, Error)]
pub enum CycleError {
    #[error("Candle fetch timed out after {0:?}")]
    FeedTimeout(Duration),
    #[error(transparent)]
    Feed(#[from] FeedError),
    #[error("Insufficient candles ({got} < {needed})")]
    InsufficientData { got: usize, needed: usize },
    #[error("Venue {action} failed: {source}")]
    VenueCommand {
        action: &'static str,
        #[source]
        source: VenueError,
    },
    #[error(transparent)]
    Persistence(#[from] LedgerError),
}

/// Summary of a completed cycle
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    /// Close of the latest candle
    pub price: Decimal,
    pub snapshot: IndicatorSnapshot,
    /// Signal after deduplication
    pub signal: Option<Side>,
    /// Side of a position opened this cycle
    pub opened: Option<Side>,
    pub commands_sent: usize,
    pub commands_failed: usize,
    pub slices_booked: usize,
}

/// Result of one scheduler tick
#[derive(Debug)]
pub enum CycleOutcome {
    /// Outside every trading session; only performance was published
    OutsideSession,
    Completed(CycleReport),
    /// Ended before the position was touched
    Aborted(CycleError),
}

impl CycleOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, CycleOutcome::Completed(_))
    }
}
