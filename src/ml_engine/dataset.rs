//! Dataset - feature rows for next-day range regression

use crate::features::indicators::{pct_returns, sample_std, sma_series};
use crate::types::PriceSeries;

/// Short moving average window used as a feature
pub const SMA_FAST: usize = 5;
/// Slow moving average and return-stdev window
pub const SMA_SLOW: usize = 20;

/// Feature vector of one bar
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureRow {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub sma_5: f64,
    pub sma_20: f64,
    /// Stdev of the last 20 daily returns (not annualized)
    pub return_std_20: f64,
}

impl FeatureRow {
    pub const NUM_FEATURES: usize = 8;

    pub fn to_vec(&self) -> Vec<f64> {
        vec![
            self.open,
            self.high,
            self.low,
            self.close,
            self.volume,
            self.sma_5,
            self.sma_20,
            self.return_std_20,
        ]
    }
}

/// Training pairs plus the row to predict from
#[derive(Debug, Clone, Default)]
pub struct RangeDataset {
    /// Features of bar t
    pub features: Vec<FeatureRow>,
    /// Low of bar t + 1
    pub next_lows: Vec<f64>,
    /// High of bar t + 1
    pub next_highs: Vec<f64>,
    /// Features of the last bar, when complete
    pub latest: Option<FeatureRow>,
}

impl RangeDataset {
    /// Rows with any undefined feature are skipped.
    pub fn from_series(series: &PriceSeries) -> Self {
        let bars = series.bars();
        let closes = series.closes();
        let sma_5 = sma_series(&closes, SMA_FAST);
        let sma_20 = sma_series(&closes, SMA_SLOW);
        let returns = pct_returns(&closes);

        // return i is the change into bar i + 1
        let return_std = |t: usize| -> Option<f64> {
            if t < SMA_SLOW {
                return None;
            }
            sample_std(&returns[t - SMA_SLOW..t])
        };

        let row_at = |t: usize| -> Option<FeatureRow> {
            let bar = bars.get(t)?;
            Some(FeatureRow {
                open: bar.open,
                high: bar.high,
                low: bar.low,
                close: bar.close,
                volume: bar.volume,
                sma_5: sma_5[t]?,
                sma_20: sma_20[t]?,
                return_std_20: return_std(t)?,
            })
        };

        let mut dataset = RangeDataset::default();
        for t in 0..bars.len().saturating_sub(1) {
            if let Some(row) = row_at(t) {
                dataset.features.push(row);
                dataset.next_lows.push(bars[t + 1].low);
                dataset.next_highs.push(bars[t + 1].high);
            }
        }
        dataset.latest = bars.len().checked_sub(1).and_then(row_at);
        dataset
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}
