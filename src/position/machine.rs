//! Position state machine
//!
//! Owns the single open position and decides, once per evaluation cycle,
//! whether to trail, partially close, fully close, or open.

use super::types::{round_lot, CloseReason, Position, PositionParams, RealizedSlice};
use crate::execution::VenueCommand;
use crate::observer::ObserverEvent;
use crate::signal::Side;
use rust_decimal::Decimal;

/// Everything one `advance` call decided
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Advance {
    /// Commands for the venue, in issue order
    pub venue_commands: Vec<VenueCommand>,
    /// Closed slices for the ledger
    pub ledger_events: Vec<RealizedSlice>,
    /// Events for observers
    pub broadcast_events: Vec<ObserverEvent>,
    /// Side of a position opened this cycle
    pub opened: Option<Side>,
}

/// Outcome of managing an open position for one price
enum Step {
    Hold,
    Exit(CloseReason),
    /// Nothing left after a partial close
    Flat,
}

/// Single-position risk manager
#[derive(Debug, Clone)]
pub struct PositionStateMachine {
    params: PositionParams,
    position: Option<Position>,
}

impl PositionStateMachine {
    /// Create a state machine with no open position
    pub fn new(params: PositionParams) -> Self {
        Self {
            params,
            position: None,
        }
    }

    /// Current open position
    pub fn position(&self) -> Option<&Position> {
        self.position.as_ref()
    }

    /// Manage the open position against `price`, then open a new one on `signal`
    /// if nothing is left open.
    ///
    /// `lot` sizes a newly opened position only.
    pub fn advance(&mut self, price: Decimal, signal: Option<Side>, lot: Decimal) -> Advance {
        let mut out = Advance::default();

        self.manage(price, &mut out);

        if self.position.is_none() {
            if let Some(side) = signal {
                self.open(side, price, lot, &mut out);
            }
        }

        out
    }

    fn manage(&mut self, price: Decimal, out: &mut Advance) {
        let params = &self.params;
        let Some(position) = self.position.as_mut() else {
            return;
        };

        match Self::step(position, params, price, out) {
            Step::Hold => {}
            Step::Exit(reason) => {
                if let Some(position) = self.position.take() {
                    Self::close_all(position, params, price, reason, out);
                }
            }
            Step::Flat => {
                tracing::info!(position_id = %position.id, "Position fully closed by partial take-profit");
                self.position = None;
            }
        }
    }

    fn step(
        position: &mut Position,
        params: &PositionParams,
        price: Decimal,
        out: &mut Advance,
    ) -> Step {
        let side = position.side;

        tracing::debug!(
            %side,
            entry = %position.entry_price,
            lot = %position.lot_remaining,
            trail = %position.trailing_stop,
            trailing_active = position.trailing_active,
            %price,
            "Managing position"
        );

        if !position.trailing_active {
            if let Some(halfway) = position.halfway_to_target() {
                if side.reached(price, halfway) {
                    Self::activate_trailing(position, params, price);
                    tracing::info!(%price, trail = %position.trailing_stop, "Early trailing activated halfway to target");
                    out.broadcast_events.push(ObserverEvent::status(format!(
                        "Early trailing activated @ {:.2}",
                        position.trailing_stop
                    )));
                }
            }
        }

        if let Some(take_profit) = position.take_profit {
            if side.reached(price, take_profit)
                && !position.partially_closed
                && position.lot_remaining > Decimal::ZERO
            {
                let close_lot = round_lot(position.lot_remaining * params.partial_close_pct);
                if close_lot > Decimal::ZERO {
                    return Self::partial_close(position, params, price, close_lot, out);
                }
                tracing::warn!(lot = %position.lot_remaining, "Partial close lot rounds to zero, skipping");
            }
        }

        if side.breached(price, position.stop_loss) {
            tracing::warn!(%price, stop_loss = %position.stop_loss, "Stop-loss hit");
            return Step::Exit(CloseReason::StopLoss);
        }

        if position.trailing_active {
            let trail = position.trailing_stop;
            if (price - trail) * side.sign() >= trail * params.trailing_pct {
                let candidate = side.protective_level(price, params.trailing_pct);
                if (candidate - trail) * side.sign() > Decimal::ZERO {
                    position.trailing_stop = candidate;
                    out.venue_commands.push(VenueCommand::Modify {
                        symbol: params.symbol.clone(),
                        lot: position.lot_remaining,
                        stop: candidate,
                        take_profit: position.take_profit,
                    });
                    tracing::info!(%side, trail = %candidate, %price, "Trailing stop moved");
                    out.broadcast_events.push(ObserverEvent::status(format!(
                        "Trailing moved to {:.2}",
                        candidate
                    )));
                }
            }

            if side.breached(price, position.trailing_stop) {
                tracing::warn!(%price, trail = %position.trailing_stop, "Trailing stop triggered");
                return Step::Exit(CloseReason::TrailingStop);
            }
        }

        Step::Hold
    }

    fn activate_trailing(position: &mut Position, params: &PositionParams, price: Decimal) {
        position.trailing_active = true;
        position.trailing_stop = position.side.protective_level(price, params.trailing_pct);
    }

    fn partial_close(
        position: &mut Position,
        params: &PositionParams,
        price: Decimal,
        close_lot: Decimal,
        out: &mut Advance,
    ) -> Step {
        let side = position.side;
        let remaining = round_lot(position.lot_remaining - close_lot);

        out.venue_commands.push(VenueCommand::ClosePartial {
            symbol: params.symbol.clone(),
            lot: close_lot,
        });
        out.broadcast_events.push(ObserverEvent::Trade {
            side: side.opposite(),
            price,
            reason: CloseReason::PartialTakeProfit,
            lot: Some(close_lot),
        });
        out.ledger_events.push(RealizedSlice {
            position_id: position.id,
            side,
            entry: position.entry_price,
            exit: price,
            lot: close_lot,
            reason: CloseReason::PartialTakeProfit,
        });

        position.lot_remaining = remaining;
        position.partially_closed = true;
        position.take_profit = None;
        if !position.trailing_active {
            Self::activate_trailing(position, params, price);
        }

        tracing::info!(closed = %close_lot, %remaining, %price, trail = %position.trailing_stop, "Partial take-profit");

        if remaining.is_zero() {
            return Step::Flat;
        }
        if remaining < params.min_remaining_lot {
            tracing::warn!(
                %remaining,
                min = %params.min_remaining_lot,
                "Remaining lot below venue minimum; partial_close_pct leaves dust"
            );
        }

        out.broadcast_events.push(ObserverEvent::status(format!(
            "Partial TP closed {} lots, remaining {} lots. Trail={:.2}",
            close_lot, remaining, position.trailing_stop
        )));
        Step::Hold
    }

    fn close_all(
        position: Position,
        params: &PositionParams,
        price: Decimal,
        reason: CloseReason,
        out: &mut Advance,
    ) {
        let exit_side = position.side.opposite();
        out.venue_commands.push(VenueCommand::Close {
            side: exit_side,
            symbol: params.symbol.clone(),
            lot: position.lot_remaining,
        });
        out.broadcast_events.push(ObserverEvent::Trade {
            side: exit_side,
            price,
            reason,
            lot: Some(position.lot_remaining),
        });
        out.ledger_events.push(RealizedSlice {
            position_id: position.id,
            side: position.side,
            entry: position.entry_price,
            exit: price,
            lot: position.lot_remaining,
            reason,
        });
    }

    fn open(&mut self, side: Side, price: Decimal, lot: Decimal, out: &mut Advance) {
        if round_lot(lot) <= Decimal::ZERO {
            tracing::warn!(%lot, "Refusing to open with a lot size that rounds to zero");
            return;
        }

        let position = Position::open(
            side,
            price,
            lot,
            self.params.stop_loss_pct,
            self.params.take_profit_pct,
        );
        // take_profit is always set on a fresh position
        let take_profit = position.take_profit.unwrap_or(price);

        out.venue_commands.push(VenueCommand::Open {
            side,
            symbol: self.params.symbol.clone(),
            lot: position.lot_remaining,
            stop_loss: position.stop_loss,
            take_profit,
        });
        out.broadcast_events.push(ObserverEvent::TradeOpened {
            side,
            price,
            lot: position.lot_remaining,
            sl: position.stop_loss,
            tp: take_profit,
        });
        out.opened = Some(side);

        tracing::info!(
            position_id = %position.id,
            %side,
            entry = %price,
            sl = %position.stop_loss,
            tp = %take_profit,
            lot = %position.lot_remaining,
            "Opened position"
        );
        self.position = Some(position);
    }
}
