//! Volatility Regime Classifier
//!
//! Annualized realized volatility, drawdown against a trailing running
//! maximum, and a regime label relative to the security's own rolling
//! volatility range. The black-swan table adds context only.

pub mod black_swan;

pub use black_swan::{BlackSwanEvent, EventComparison, BLACK_SWAN_EVENTS};

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::features::indicators::{mean, pct_returns, sample_std};
use crate::types::{PriceSeries, VolatilityRegime};

/// Volatility classifier configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VolatilityConfig {
    /// Trading days per year used for annualization
    pub trading_days: f64,
    /// Window of the rolling volatility series
    pub rolling_window: usize,
    /// Trailing rolling-volatility values defining the regime range
    pub history_window: usize,
    /// Percentile above which the regime is High
    pub high_percentile: f64,
    /// Percentile below which the regime is Low
    pub low_percentile: f64,
    /// Running-maximum lookback for drawdown
    pub drawdown_window: usize,
}

impl Default for VolatilityConfig {
    fn default() -> Self {
        Self {
            trading_days: 252.0,
            rolling_window: 20,
            history_window: 252,
            high_percentile: 0.7,
            low_percentile: 0.3,
            drawdown_window: 252,
        }
    }
}

impl VolatilityConfig {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.trading_days <= 0.0 {
            return Err(AnalysisError::InvalidConfig(
                "trading_days must be > 0".to_string(),
            ));
        }
        if self.rolling_window < 2 || self.history_window == 0 || self.drawdown_window == 0 {
            return Err(AnalysisError::InvalidConfig(
                "rolling_window must be >= 2, history and drawdown windows > 0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.low_percentile)
            || !(0.0..=1.0).contains(&self.high_percentile)
            || self.low_percentile > self.high_percentile
        {
            return Err(AnalysisError::InvalidConfig(format!(
                "regime percentiles must satisfy 0 <= low ({}) <= high ({}) <= 1",
                self.low_percentile, self.high_percentile
            )));
        }
        Ok(())
    }
}

/// Volatility classifier output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolatilityProfile {
    /// Sample stdev of daily returns x sqrt(trading days)
    pub annualized_volatility: f64,
    /// Mean of the rolling volatility over the history window
    pub historical_average_volatility: Option<f64>,
    pub rolling_min: Option<f64>,
    pub rolling_max: Option<f64>,
    /// Position of the current volatility inside [rolling_min, rolling_max],
    /// clamped to [0, 1]; `None` when the range is empty or degenerate
    pub percentile: Option<f64>,
    pub regime: VolatilityRegime,
    /// Last close vs trailing running maximum, percent (<= 0)
    pub current_drawdown_pct: f64,
    /// Worst drawdown over the series, percent (<= 0)
    pub max_drawdown_pct: f64,
    /// Current volatility as percent of the mean black-swan volatility
    pub black_swan_reference_ratio: f64,
    pub event_comparisons: Vec<EventComparison>,
}

/// Volatility Regime Classifier
#[derive(Debug, Clone, Default)]
pub struct VolatilityClassifier {
    config: VolatilityConfig,
}

impl VolatilityClassifier {
    pub fn new(config: VolatilityConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &VolatilityConfig {
        &self.config
    }

    /// Rolling annualized volatility aligned with `returns`
    pub fn rolling_volatility(&self, returns: &[f64]) -> Vec<Option<f64>> {
        let window = self.config.rolling_window;
        let annualize = self.config.trading_days.sqrt();
        (0..returns.len())
            .map(|i| {
                if i + 1 < window {
                    None
                } else {
                    sample_std(&returns[i + 1 - window..=i]).map(|s| s * annualize)
                }
            })
            .collect()
    }

    /// Classify a percentile inside a rolling range.
    /// Returns the clamped percentile (`None` when degenerate) and the regime.
    pub fn classify(
        &self,
        current: f64,
        range: Option<(f64, f64)>,
    ) -> (Option<f64>, VolatilityRegime) {
        let Some((min, max)) = range else {
            return (None, VolatilityRegime::Normal);
        };

        let span = max - min;
        if !(span > f64::EPSILON * max.abs().max(1.0)) {
            // degenerate range: min == max
            return (None, VolatilityRegime::Normal);
        }

        let percentile = ((current - min) / span).clamp(0.0, 1.0);
        let regime = if percentile > self.config.high_percentile {
            VolatilityRegime::High
        } else if percentile < self.config.low_percentile {
            VolatilityRegime::Low
        } else {
            VolatilityRegime::Normal
        };
        (Some(percentile), regime)
    }

    /// Drawdowns against the trailing running maximum: (current, worst), percent
    pub fn drawdowns(&self, closes: &[f64]) -> (f64, f64) {
        let window = self.config.drawdown_window;
        let mut current = 0.0;
        let mut worst: f64 = 0.0;
        for i in 0..closes.len() {
            let start = (i + 1).saturating_sub(window);
            let running_max = closes[start..=i]
                .iter()
                .copied()
                .fold(f64::MIN, f64::max);
            let drawdown = (closes[i] - running_max) / running_max * 100.0;
            worst = worst.min(drawdown);
            current = drawdown;
        }
        (current, worst)
    }

    pub fn analyze(&self, series: &PriceSeries) -> Result<VolatilityProfile, AnalysisError> {
        // two returns are the minimum for a sample standard deviation
        if series.len() < 3 {
            return Err(AnalysisError::insufficient("volatility", 3, series.len()));
        }

        let closes = series.closes();
        let returns = pct_returns(&closes);
        let annualized_volatility = sample_std(&returns)
            .map(|s| s * self.config.trading_days.sqrt())
            .ok_or_else(|| AnalysisError::insufficient("volatility", 3, series.len()))?;

        let rolling: Vec<f64> = self
            .rolling_volatility(&returns)
            .into_iter()
            .flatten()
            .collect();
        let history_start = rolling.len().saturating_sub(self.config.history_window);
        let history = &rolling[history_start..];

        let range = if history.is_empty() {
            None
        } else {
            let min = history.iter().copied().fold(f64::INFINITY, f64::min);
            let max = history.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            Some((min, max))
        };
        let (percentile, regime) = self.classify(annualized_volatility, range);
        let (current_drawdown_pct, max_drawdown_pct) = self.drawdowns(&closes);

        let profile = VolatilityProfile {
            annualized_volatility,
            historical_average_volatility: mean(history),
            rolling_min: range.map(|r| r.0),
            rolling_max: range.map(|r| r.1),
            percentile,
            regime,
            current_drawdown_pct,
            max_drawdown_pct,
            black_swan_reference_ratio: black_swan::reference_ratio(annualized_volatility),
            event_comparisons: black_swan::compare_events(annualized_volatility),
        };

        tracing::debug!(
            symbol = %series.symbol(),
            volatility = profile.annualized_volatility,
            percentile = ?profile.percentile,
            regime = %profile.regime,
            drawdown_pct = profile.current_drawdown_pct,
            black_swan_ratio = profile.black_swan_reference_ratio,
            "Volatility classifier completed"
        );

        Ok(profile)
    }
}
