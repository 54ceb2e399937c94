//! Relative strength index with Wilder smoothing.
//!
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss). avg_loss == 0 gives 100, or 50
//! when there were no gains either.

/// Compute the RSI series of `values`.
///
/// Needs `period + 1` inputs; the result has `values.len() - period` entries.
pub fn rsi(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() <= period {
        return Vec::new();
    }

    let changes: Vec<f64> = values.windows(2).map(|w| w[1] - w[0]).collect();

    let mut avg_gain = changes[..period].iter().map(|c| c.max(0.0)).sum::<f64>() / period as f64;
    let mut avg_loss = changes[..period].iter().map(|c| (-c).max(0.0)).sum::<f64>() / period as f64;

    let p = period as f64;
    let mut out = Vec::with_capacity(changes.len() - period + 1);
    out.push(strength(avg_gain, avg_loss));

    for &change in &changes[period..] {
        avg_gain = (avg_gain * (p - 1.0) + change.max(0.0)) / p;
        avg_loss = (avg_loss * (p - 1.0) + (-change).max(0.0)) / p;
        out.push(strength(avg_gain, avg_loss));
    }
    out
}

fn strength(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        if avg_gain == 0.0 {
            return 50.0;
        }
        return 100.0;
    }
    100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
}
