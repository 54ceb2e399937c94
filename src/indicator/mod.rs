//! Indicator module
//!
//! Fast/slow EMA and RSI over a close-price series

mod ema;
mod rsi;

pub use ema::ema;
pub use rsi::rsi;

use serde::{Deserialize, Serialize};

/// Latest indicator values for one evaluation cycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub ema_fast: f64,
    pub ema_slow: f64,
    pub rsi: f64,
}

/// Indicator periods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorEngine {
    fast_period: usize,
    slow_period: usize,
    rsi_period: usize,
}

impl IndicatorEngine {
    /// Create an engine with the given periods
    pub fn new(fast_period: usize, slow_period: usize, rsi_period: usize) -> Self {
        Self {
            fast_period,
            slow_period,
            rsi_period,
        }
    }

    pub fn fast_period(&self) -> usize {
        self.fast_period
    }

    pub fn slow_period(&self) -> usize {
        self.slow_period
    }

    /// Shortest series that yields every indicator
    pub fn required_len(&self) -> usize {
        self.fast_period
            .max(self.slow_period)
            .max(self.rsi_period + 1)
    }

    /// Compute the latest snapshot.
    ///
    /// Returns `None` if any indicator lacks data; callers treat that as
    /// insufficient data rather than using partial values.
    pub fn snapshot(&self, closes: &[f64]) -> Option<IndicatorSnapshot> {
        let ema_fast = *ema(closes, self.fast_period).last()?;
        let ema_slow = *ema(closes, self.slow_period).last()?;
        let rsi = *rsi(closes, self.rsi_period).last()?;
        Some(IndicatorSnapshot {
            ema_fast,
            ema_slow,
            rsi,
        })
    }
}

impl Default for IndicatorEngine {
    fn default() -> Self {
        Self::new(50, 200, 14)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_len() {
        assert_eq!(IndicatorEngine::default().required_len(), 200);
        assert_eq!(IndicatorEngine::new(3, 5, 14).required_len(), 15);
    }

    #[test]
    fn test_snapshot_insufficient() {
        let engine = IndicatorEngine::default();
        let closes = vec![2000.0; 199];
        assert!(engine.snapshot(&closes).is_none());
    }

    #[test]
    fn test_snapshot_uptrend() {
        let engine = IndicatorEngine::default();
        let closes: Vec<f64> = (0..250).map(|i| 2000.0 + i as f64 * 0.5).collect();
        let snap = engine.snapshot(&closes).unwrap();
        assert!(snap.ema_fast > snap.ema_slow);
        assert!(snap.rsi > 55.0);
    }

    #[test]
    fn test_snapshot_downtrend() {
        let engine = IndicatorEngine::default();
        let closes: Vec<f64> = (0..250).map(|i| 2200.0 - i as f64 * 0.5).collect();
        let snap = engine.snapshot(&closes).unwrap();
        assert!(snap.ema_fast < snap.ema_slow);
        assert!(snap.rsi < 45.0);
    }

    #[test]
    fn test_snapshot_flat_series_is_neutral() {
        let engine = IndicatorEngine::default();
        let snap = engine.snapshot(&vec![2000.0; 250]).unwrap();
        assert_eq!(snap.ema_fast, snap.ema_slow);
        assert_eq!(snap.ema_fast, 2000.0);
        assert_eq!(snap.rsi, 50.0);
    }
}
