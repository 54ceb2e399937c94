//! Candle feed module
//!
//! Provides completed XAU/USD candles from the Deriv WebSocket API

mod deriv;
mod types;

pub use deriv::{DerivFeed, DERIV_WS_URL};
pub use types::{Candle, CandleRequest, FeedError};

use async_trait::async_trait;

/// Trait for candle source implementations
#[async_trait]
pub trait CandleSource: Send + Sync {
    /// Fetch the most recent completed candles, oldest first
    async fn fetch_candles(&self, request: &CandleRequest) -> Result<Vec<Candle>, FeedError>;
}
