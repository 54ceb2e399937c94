//! xau-trader: Signal-driven trading bot for a single XAU/USD instrument
//!
//! This library provides the core components for:
//! - Completed-candle feed from the Deriv WebSocket API
//! - EMA/RSI indicators and deduplicated directional signals
//! - Single-position management with partial take-profit and trailing stop
//! - Paper or HTTP-bridge execution
//! - Durable performance ledger
//! - WebSocket observer broadcast with lot-size and reset controls
//! - Session-gated, non-overlapping evaluation scheduler
//! - Structured logging and Prometheus metrics

pub mod cli;
pub mod config;
pub mod execution;
pub mod feed;
pub mod indicator;
pub mod ledger;
pub mod observer;
pub mod position;
pub mod scheduler;
pub mod signal;
pub mod telemetry;
