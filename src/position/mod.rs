//! Position management module
//!
//! Single-position state machine with partial take-profit, trailing stop and
//! hard stop-loss

mod machine;
mod types;

pub use machine::{Advance, PositionStateMachine};
pub use types::{round_lot, CloseReason, Position, PositionParams, RealizedSlice, LOT_DECIMALS};
