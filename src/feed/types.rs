//! Candle feed types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A completed OHLCV candle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Bucket open time
    pub open_time: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    /// Closing price, the only field the strategy consumes
    pub close: Decimal,
    /// Tick count for feeds that do not report traded volume
    pub volume: Decimal,
}

/// Parameters for a candle request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandleRequest {
    /// Feed-side instrument code (e.g. "frxXAUUSD")
    pub symbol: String,
    /// Bucket size in seconds
    pub granularity_secs: u32,
    /// Number of most recent candles to return
    pub count: usize,
}

/// Candle feed errors
#[derive(Debug, Error)]
pub enum FeedError {
    /// Could not reach the feed
    #[error("Feed connection failed: {0}")]
    Connection(String),
    /// Feed answered with an error payload
    #[error("Feed rejected request: {0}")]
    Rejected(String),
    /// Response could not be decoded
    #[error("Malformed feed response: {0}")]
    Malformed(String),
    /// Connection closed before candles arrived
    #[error("Feed closed before responding")]
    Closed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_error_display() {
        let err = FeedError::Rejected("Unknown symbol".to_string());
        assert_eq!(err.to_string(), "Feed rejected request: Unknown symbol");
        assert_eq!(FeedError::Closed.to_string(), "Feed closed before responding");
    }
}
