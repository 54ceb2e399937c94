//! Exponential moving average
//!
//! EMA[t] = EMA[t-1] + alpha * (close[t] - EMA[t-1]), alpha = 2 / (period + 1).
//! Seeded with the SMA of the first `period` values.

/// Compute the EMA series of `values`.
///
/// The result holds one value per input from index `period - 1` onward, so its
/// length is `values.len() - period + 1`. Empty when the input is shorter than
/// `period` or `period` is zero.
pub fn ema(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }

    let alpha = 2.0 / (period as f64 + 1.0);
    let seed = values[..period].iter().sum::<f64>() / period as f64;

    let mut out = Vec::with_capacity(values.len() - period + 1);
    out.push(seed);

    let mut prev = seed;
    for &v in &values[period..] {
        prev += alpha * (v - prev);
        out.push(prev);
    }
    out
}
