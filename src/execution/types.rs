//! Execution types

use crate::signal::Side;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A command for the execution venue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum VenueCommand {
    /// Open a position with protective levels
    Open {
        side: Side,
        symbol: String,
        lot: Decimal,
        stop_loss: Decimal,
        take_profit: Decimal,
    },
    /// Close part of the open position
    ClosePartial { symbol: String, lot: Decimal },
    /// Flatten with a market order on `side`
    Close {
        side: Side,
        symbol: String,
        lot: Decimal,
    },
    /// Move the stop (and optionally the target) of the open position
    Modify {
        symbol: String,
        lot: Decimal,
        stop: Decimal,
        take_profit: Option<Decimal>,
    },
}

impl VenueCommand {
    /// Bridge action name
    pub fn action(&self) -> &'static str {
        match self {
            VenueCommand::Open { side, .. } | VenueCommand::Close { side, .. } => side.as_action(),
            VenueCommand::ClosePartial { .. } => "CLOSE_PARTIAL",
            VenueCommand::Modify { .. } => "MODIFY",
        }
    }

    /// Instrument the command targets
    pub fn symbol(&self) -> &str {
        match self {
            VenueCommand::Open { symbol, .. }
            | VenueCommand::ClosePartial { symbol, .. }
            | VenueCommand::Close { symbol, .. }
            | VenueCommand::Modify { symbol, .. } => symbol,
        }
    }

    /// Lot the command carries
    pub fn lot(&self) -> Decimal {
        match self {
            VenueCommand::Open { lot, .. }
            | VenueCommand::ClosePartial { lot, .. }
            | VenueCommand::Close { lot, .. }
            | VenueCommand::Modify { lot, .. } => *lot,
        }
    }
}

/// Venue acknowledgement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VenueReceipt {
    /// Venue status string (e.g. "success", "partial_closed", "modified")
    pub status: String,
    /// Raw venue details, if any
    pub details: Option<serde_json::Value>,
}

/// Venue connectivity report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VenueHealth {
    pub connected: bool,
    pub balance: Option<Decimal>,
    pub login: Option<i64>,
    pub server: Option<String>,
}

/// Venue errors
#[derive(Debug, Error)]
pub enum VenueError {
    /// No answer within the command timeout
    #[error("Venue timed out")]
    Timeout,
    /// Venue answered with a failure
    #[error("Venue rejected {action}: {reason}")]
    Rejected { action: String, reason: String },
    /// Transport-level failure
    #[error("Venue unreachable: {0}")]
    Transport(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_command_actions() {
        let open = VenueCommand::Open {
            side: Side::Buy,
            symbol: "XAUUSD".to_string(),
            lot: dec!(0.01),
            stop_loss: dec!(1996),
            take_profit: dec!(2008),
        };
        assert_eq!(open.action(), "BUY");
        assert_eq!(open.symbol(), "XAUUSD");
        assert_eq!(open.lot(), dec!(0.01));

        let close = VenueCommand::Close {
            side: Side::Sell,
            symbol: "XAUUSD".to_string(),
            lot: dec!(0.002),
        };
        assert_eq!(close.action(), "SELL");

        let partial = VenueCommand::ClosePartial {
            symbol: "XAUUSD".to_string(),
            lot: dec!(0.008),
        };
        assert_eq!(partial.action(), "CLOSE_PARTIAL");

        let modify = VenueCommand::Modify {
            symbol: "XAUUSD".to_string(),
            lot: dec!(0.002),
            stop: dec!(2002),
            take_profit: None,
        };
        assert_eq!(modify.action(), "MODIFY");
    }

    #[test]
    fn test_venue_error_display() {
        let err = VenueError::Rejected {
            action: "BUY".to_string(),
            reason: "No tick data available".to_string(),
        };
        assert_eq!(err.to_string(), "Venue rejected BUY: No tick data available");
        assert_eq!(VenueError::Timeout.to_string(), "Venue timed out");
    }
}
