//! Signal generation module
//!
//! Turns EMA/RSI readings into a deduplicated buy/sell bias

mod evaluator;
mod types;

pub use evaluator::{SignalEvaluator, SignalThresholds};
pub use types::Side;
