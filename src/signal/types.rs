//! Signal types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Trading direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Long
    Buy,
    /// Short
    Sell,
}

impl Side {
    /// +1 for buy, -1 for sell
    pub fn sign(self) -> Decimal {
        match self {
            Side::Buy => Decimal::ONE,
            Side::Sell => Decimal::NEGATIVE_ONE,
        }
    }

    /// The order side that flattens a position on this side
    pub fn opposite(self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }

    /// Price has reached or passed `level` in this side's profit direction
    pub fn reached(self, price: Decimal, level: Decimal) -> bool {
        match self {
            Side::Buy => price >= level,
            Side::Sell => price <= level,
        }
    }

    /// Price has reached or passed `level` in this side's loss direction
    pub fn breached(self, price: Decimal, level: Decimal) -> bool {
        match self {
            Side::Buy => price <= level,
            Side::Sell => price >= level,
        }
    }

    /// Level `pct` away from `price` on the protective side (below for buy)
    pub fn protective_level(self, price: Decimal, pct: Decimal) -> Decimal {
        price - self.sign() * price * pct
    }

    /// Level `pct` away from `price` in the profit direction (above for buy)
    pub fn target_level(self, price: Decimal, pct: Decimal) -> Decimal {
        price + self.sign() * price * pct
    }

    /// Uppercase venue action name
    pub fn as_action(self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "buy"),
            Side::Sell => write!(f, "sell"),
        }
    }
}
