//! Directional signal evaluation

use super::Side;
use crate::indicator::IndicatorSnapshot;

/// RSI thresholds around the dead zone
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalThresholds {
    /// Buy requires RSI strictly above this
    pub rsi_upper: f64,
    /// Sell requires RSI strictly below this
    pub rsi_lower: f64,
}

impl Default for SignalThresholds {
    fn default() -> Self {
        Self {
            rsi_upper: 55.0,
            rsi_lower: 45.0,
        }
    }
}

/// Derives a bias from indicators and suppresses repeats of the last acted-on signal
#[derive(Debug, Clone)]
pub struct SignalEvaluator {
    thresholds: SignalThresholds,
    /// Direction of the most recently opened position
    last_signal: Option<Side>,
}

impl SignalEvaluator {
    /// Create an evaluator with no signal history
    pub fn new(thresholds: SignalThresholds) -> Self {
        Self {
            thresholds,
            last_signal: None,
        }
    }

    /// Raw bias for a snapshot, before deduplication
    pub fn evaluate(&self, snapshot: &IndicatorSnapshot) -> Option<Side> {
        if snapshot.ema_fast > snapshot.ema_slow && snapshot.rsi > self.thresholds.rsi_upper {
            Some(Side::Buy)
        } else if snapshot.ema_fast < snapshot.ema_slow && snapshot.rsi < self.thresholds.rsi_lower
        {
            Some(Side::Sell)
        } else {
            None
        }
    }

    /// Drop a signal that repeats the last acted-on direction
    pub fn forward(&self, raw: Option<Side>) -> Option<Side> {
        match raw {
            Some(side) if Some(side) == self.last_signal => {
                tracing::debug!(%side, "Suppressing repeated signal");
                None
            }
            other => other,
        }
    }

    /// Record that a forwarded signal opened a position
    pub fn acknowledge(&mut self, side: Side) {
        self.last_signal = Some(side);
    }

    /// Most recently acted-on direction
    pub fn last_signal(&self) -> Option<Side> {
        self.last_signal
    }
}

impl Default for SignalEvaluator {
    fn default() -> Self {
        Self::new(SignalThresholds::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(ema_fast: f64, ema_slow: f64, rsi: f64) -> IndicatorSnapshot {
        IndicatorSnapshot {
            ema_fast,
            ema_slow,
            rsi,
        }
    }

    #[test]
    fn test_buy_signal() {
        let eval = SignalEvaluator::default();
        assert_eq!(eval.evaluate(&snap(2010.0, 2000.0, 60.0)), Some(Side::Buy));
    }

    #[test]
    fn test_sell_signal() {
        let eval = SignalEvaluator::default();
        assert_eq!(eval.evaluate(&snap(1990.0, 2000.0, 40.0)), Some(Side::Sell));
    }

    #[test]
    fn test_dead_zone() {
        let eval = SignalEvaluator::default();
        assert_eq!(eval.evaluate(&snap(2010.0, 2000.0, 50.0)), None);
        assert_eq!(eval.evaluate(&snap(1990.0, 2000.0, 50.0)), None);
        // thresholds are strict
        assert_eq!(eval.evaluate(&snap(2010.0, 2000.0, 55.0)), None);
        assert_eq!(eval.evaluate(&snap(1990.0, 2000.0, 45.0)), None);
    }

    #[test]
    fn test_equal_averages_never_signal() {
        let eval = SignalEvaluator::default();
        assert_eq!(eval.evaluate(&snap(2000.0, 2000.0, 80.0)), None);
        assert_eq!(eval.evaluate(&snap(2000.0, 2000.0, 20.0)), None);
    }

    #[test]
    fn test_misaligned_trend_and_momentum() {
        let eval = SignalEvaluator::default();
        assert_eq!(eval.evaluate(&snap(2010.0, 2000.0, 30.0)), None);
        assert_eq!(eval.evaluate(&snap(1990.0, 2000.0, 70.0)), None);
    }

    #[test]
    fn test_dedup_after_acknowledge() {
        let mut eval = SignalEvaluator::default();
        assert_eq!(eval.forward(Some(Side::Buy)), Some(Side::Buy));

        eval.acknowledge(Side::Buy);
        assert_eq!(eval.forward(Some(Side::Buy)), None);
        assert_eq!(eval.forward(Some(Side::Sell)), Some(Side::Sell));
        assert_eq!(eval.forward(None), None);
    }

    #[test]
    fn test_forward_without_acknowledge_repeats() {
        let eval = SignalEvaluator::default();
        // Not acted on, so a repeat still passes
        assert_eq!(eval.forward(Some(Side::Sell)), Some(Side::Sell));
        assert_eq!(eval.forward(Some(Side::Sell)), Some(Side::Sell));
        assert_eq!(eval.last_signal(), None);
    }
}
