//! Series-level indicator math
//!
//! Every function returns a new vector aligned by index with its input.
//! Leading positions that a trailing window cannot fill are `None`.

use serde::{Deserialize, Serialize};

/// How RSI averages gains and losses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RsiSmoothing {
    /// Trailing arithmetic mean over the period
    Simple,
    /// Wilder's recursive smoothing, seeded with the first simple mean
    Wilder,
}

impl Default for RsiSmoothing {
    fn default() -> Self {
        RsiSmoothing::Simple
    }
}

/// Trailing arithmetic mean, undefined until `window` values are available
pub fn sma_series(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }

    let mut out = Vec::with_capacity(values.len());
    let mut sum = 0.0;
    for (i, v) in values.iter().enumerate() {
        sum += v;
        if i >= window {
            sum -= values[i - window];
        }
        if i + 1 >= window {
            out.push(Some(sum / window as f64));
        } else {
            out.push(None);
        }
    }
    out
}

/// Exponential moving average without bias adjustment.
///
/// alpha = 2 / (span + 1); the first value seeds the recursion, so the output
/// is defined from index 0.
pub fn ema_series(values: &[f64], span: usize) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len());
    let Some(&first) = values.first() else {
        return out;
    };

    let alpha = 2.0 / (span as f64 + 1.0);
    let mut ema = first;
    out.push(ema);
    for v in values.iter().skip(1) {
        ema = alpha * v + (1.0 - alpha) * ema;
        out.push(ema);
    }
    out
}

/// MACD line and its signal line
pub fn macd_series(closes: &[f64], fast: usize, slow: usize, signal: usize) -> (Vec<f64>, Vec<f64>) {
    let ema_fast = ema_series(closes, fast);
    let ema_slow = ema_series(closes, slow);
    let macd: Vec<f64> = ema_fast
        .iter()
        .zip(ema_slow.iter())
        .map(|(f, s)| f - s)
        .collect();
    let signal_line = ema_series(&macd, signal);
    (macd, signal_line)
}

/// RSI for each bar; first defined at index `period`.
///
/// An average loss of zero yields 100 rather than a division error.
pub fn rsi_series(closes: &[f64], period: usize, smoothing: RsiSmoothing) -> Vec<Option<f64>> {
    let mut out = vec![None; closes.len()];
    if period == 0 || closes.len() < period + 1 {
        return out;
    }

    let changes: Vec<(f64, f64)> = closes
        .windows(2)
        .map(|w| {
            let change = w[1] - w[0];
            if change > 0.0 {
                (change, 0.0)
            } else {
                (0.0, -change)
            }
        })
        .collect();

    let p = period as f64;
    let (mut avg_gain, mut avg_loss) = changes
        .iter()
        .take(period)
        .fold((0.0, 0.0), |(g, l), (gain, loss)| (g + gain, l + loss));
    avg_gain /= p;
    avg_loss /= p;
    out[period] = Some(rsi_from_averages(avg_gain, avg_loss));

    for i in period..changes.len() {
        let (gain, loss) = changes[i];
        match smoothing {
            RsiSmoothing::Simple => {
                let (old_gain, old_loss) = changes[i - period];
                avg_gain += (gain - old_gain) / p;
                avg_loss += (loss - old_loss) / p;
            }
            RsiSmoothing::Wilder => {
                avg_gain = (avg_gain * (p - 1.0) + gain) / p;
                avg_loss = (avg_loss * (p - 1.0) + loss) / p;
            }
        }
        // closes index is one past the change index
        out[i + 1] = Some(rsi_from_averages(avg_gain.max(0.0), avg_loss.max(0.0)));
    }

    out
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    // running sums can leave tiny residue instead of an exact zero
    if avg_loss <= f64::EPSILON * avg_gain.abs().max(1.0) {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}

/// Simple returns `c[i] / c[i-1] - 1`, one shorter than the input
pub fn pct_returns(closes: &[f64]) -> Vec<f64> {
    closes.windows(2).map(|w| w[1] / w[0] - 1.0).collect()
}

/// Sample standard deviation (n - 1 denominator)
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    Some(variance.max(0.0).sqrt())
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
