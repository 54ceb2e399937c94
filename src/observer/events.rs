//! Observer wire messages

use crate::ledger::{ClosedTrade, PerformanceStats};
use crate::position::{round_lot, CloseReason};
use crate::signal::Side;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Event pushed to every connected observer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ObserverEvent {
    /// Current ledger totals
    Performance { stats: PerformanceStats },
    /// A position was opened
    TradeOpened {
        side: Side,
        #[serde(with = "rust_decimal::serde::float")]
        price: Decimal,
        #[serde(with = "rust_decimal::serde::float")]
        lot: Decimal,
        #[serde(with = "rust_decimal::serde::float")]
        sl: Decimal,
        #[serde(with = "rust_decimal::serde::float")]
        tp: Decimal,
    },
    /// Lots were closed; `side` is the executed order side
    Trade {
        side: Side,
        #[serde(with = "rust_decimal::serde::float")]
        price: Decimal,
        reason: CloseReason,
        #[serde(
            default,
            with = "rust_decimal::serde::float_option",
            skip_serializing_if = "Option::is_none"
        )]
        lot: Option<Decimal>,
    },
    /// A slice was booked by the ledger
    ClosedTrade {
        side: Side,
        #[serde(with = "rust_decimal::serde::float")]
        entry: Decimal,
        #[serde(with = "rust_decimal::serde::float")]
        exit: Decimal,
        #[serde(with = "rust_decimal::serde::float")]
        lot: Decimal,
        #[serde(with = "rust_decimal::serde::float")]
        pnl: Decimal,
    },
    /// Free-form progress message
    Status { text: String },
    /// Something went wrong
    Error { text: String },
}

impl ObserverEvent {
    pub fn status(text: impl Into<String>) -> Self {
        Self::Status { text: text.into() }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::Error { text: text.into() }
    }

    pub fn performance(stats: PerformanceStats) -> Self {
        Self::Performance { stats }
    }

    /// JSON text frame for the wire
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            format!(r#"{{"type":"error","text":"failed to encode event: {e}"}}"#)
        })
    }
}

impl From<&ClosedTrade> for ObserverEvent {
    fn from(trade: &ClosedTrade) -> Self {
        Self::ClosedTrade {
            side: trade.side,
            entry: trade.entry,
            exit: trade.exit,
            lot: trade.lot,
            pnl: trade.pnl,
        }
    }
}

/// Control message received from an observer
#[derive(Debug, Clone, PartialEq)]
pub enum ControlCommand {
    /// Lot size for positions opened from now on
    LotSize(Decimal),
    /// Zero the performance ledger
    ResetStats,
}

/// Rejected control message
#[derive(Debug, Error, PartialEq)]
pub enum ControlError {
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),
    #[error("Unknown message type: {0}")]
    UnknownType(String),
    #[error("Missing message type")]
    MissingType,
    #[error("Invalid lot size: {0}")]
    InvalidLotSize(String),
}

impl ControlCommand {
    /// Parse a text frame
    pub fn parse(text: &str) -> Result<Self, ControlError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| ControlError::InvalidJson(e.to_string()))?;

        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or(ControlError::MissingType)?;

        match kind {
            "lotSize" => Self::parse_lot(value.get("value")).map(Self::LotSize),
            "resetStats" => Ok(Self::ResetStats),
            other => Err(ControlError::UnknownType(other.to_string())),
        }
    }

    fn parse_lot(raw: Option<&Value>) -> Result<Decimal, ControlError> {
        let lot = match raw {
            Some(Value::Number(n)) => {
                let text = n.to_string();
                text.parse::<Decimal>()
                    .or_else(|_| Decimal::from_scientific(&text))
                    .ok()
            }
            Some(Value::String(s)) => s.trim().parse::<Decimal>().ok(),
            _ => None,
        };

        match lot.map(round_lot) {
            Some(lot) if lot > Decimal::ZERO => Ok(lot),
            _ => Err(ControlError::InvalidLotSize(
                raw.map(Value::to_string).unwrap_or_else(|| "missing".to_string()),
            )),
        }
    }
}
