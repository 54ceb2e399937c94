//! Position types

use crate::signal::Side;
use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Decimal places kept on lot quantities
pub const LOT_DECIMALS: u32 = 6;

/// Round a lot quantity to [`LOT_DECIMALS`], half away from zero
pub fn round_lot(lot: Decimal) -> Decimal {
    lot.round_dp_with_strategy(LOT_DECIMALS, RoundingStrategy::MidpointAwayFromZero)
}

/// The single open position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Position identifier
    pub id: Uuid,
    /// Direction, fixed for the position's lifetime
    pub side: Side,
    /// Entry price
    pub entry_price: Decimal,
    /// Hard stop-loss level
    pub stop_loss: Decimal,
    /// Partial take-profit target; `None` once the partial close has fired
    pub take_profit: Option<Decimal>,
    /// Lots still open
    pub lot_remaining: Decimal,
    /// Trailing stop level, meaningful only when `trailing_active`
    pub trailing_stop: Decimal,
    pub trailing_active: bool,
    pub partially_closed: bool,
    /// Open timestamp
    pub opened_at: DateTime<Utc>,
}

impl Position {
    /// Open a position at `entry` with percentage stop/target offsets
    pub fn open(
        side: Side,
        entry: Decimal,
        lot: Decimal,
        stop_loss_pct: Decimal,
        take_profit_pct: Decimal,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            side,
            entry_price: entry,
            stop_loss: side.protective_level(entry, stop_loss_pct),
            take_profit: Some(side.target_level(entry, take_profit_pct)),
            lot_remaining: round_lot(lot),
            trailing_stop: Decimal::ZERO,
            trailing_active: false,
            partially_closed: false,
            opened_at: Utc::now(),
        }
    }

    /// Midpoint between entry and the take-profit target
    pub fn halfway_to_target(&self) -> Option<Decimal> {
        self.take_profit
            .map(|tp| self.entry_price + (tp - self.entry_price) / dec!(2))
    }
}

/// Why lots were closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CloseReason {
    /// Hard stop-loss hit
    #[serde(rename = "SL")]
    StopLoss,
    /// Trailing stop hit
    #[serde(rename = "TRAIL")]
    TrailingStop,
    /// Partial take-profit target reached
    #[serde(rename = "PARTIAL_TP")]
    PartialTakeProfit,
}

/// A closed lot slice to be booked by the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealizedSlice {
    /// Position the slice came from
    pub position_id: Uuid,
    pub side: Side,
    pub entry: Decimal,
    pub exit: Decimal,
    pub lot: Decimal,
    pub reason: CloseReason,
}

/// Position management parameters
#[derive(Debug, Clone, PartialEq)]
pub struct PositionParams {
    /// Venue symbol (e.g. "XAUUSD")
    pub symbol: String,
    /// Stop-loss distance as a fraction of entry
    pub stop_loss_pct: Decimal,
    /// Take-profit distance as a fraction of entry
    pub take_profit_pct: Decimal,
    /// Trailing distance as a fraction of price
    pub trailing_pct: Decimal,
    /// Fraction of the remaining lot closed at the take-profit target
    pub partial_close_pct: Decimal,
    /// Remainders below this are reported as dust
    pub min_remaining_lot: Decimal,
}

impl Default for PositionParams {
    fn default() -> Self {
        Self {
            symbol: "XAUUSD".to_string(),
            stop_loss_pct: dec!(0.002),
            take_profit_pct: dec!(0.005),
            trailing_pct: dec!(0.003),
            partial_close_pct: dec!(0.8),
            min_remaining_lot: dec!(0.0001),
        }
    }
}
