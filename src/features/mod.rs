//! Indicator Engine - Technical indicators and directional signals
//!
//! Computes from a daily price series:
//! - RSI (14, simple or Wilder averaging)
//! - MACD (EMA12 - EMA26) with EMA9 signal line
//! - SMA 20 / 50 / 200
//! - Volume trend (recent bars vs whole window)
//! - Price action (daily / weekly / monthly change)
//!
//! and reduces three directional rules to a Bullish/Bearish technical label.

pub mod indicators;
pub mod price_action;

pub use indicators::{ema_series, macd_series, rsi_series, sma_series, RsiSmoothing};
pub use price_action::PriceAction;

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::types::{Bias, PriceSeries, VolumeTrend};

pub const SMA_SHORT: usize = 20;
pub const SMA_MEDIUM: usize = 50;
pub const SMA_LONG: usize = 200;

/// Indicator Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    /// RSI period
    pub rsi_period: usize,
    /// RSI averaging method
    pub rsi_smoothing: RsiSmoothing,
    /// MACD fast period
    pub macd_fast: usize,
    /// MACD slow period
    pub macd_slow: usize,
    /// MACD signal period
    pub macd_signal: usize,
    /// Number of most recent bars compared against the window average volume
    pub volume_recent_window: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            rsi_smoothing: RsiSmoothing::Simple,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            volume_recent_window: 5,
        }
    }
}

impl IndicatorConfig {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.rsi_period == 0 || self.macd_fast == 0 || self.macd_slow == 0 || self.macd_signal == 0
        {
            return Err(AnalysisError::InvalidConfig(
                "indicator periods must be > 0".to_string(),
            ));
        }
        if self.macd_fast >= self.macd_slow {
            return Err(AnalysisError::InvalidConfig(format!(
                "macd_fast ({}) must be shorter than macd_slow ({})",
                self.macd_fast, self.macd_slow
            )));
        }
        if self.volume_recent_window == 0 {
            return Err(AnalysisError::InvalidConfig(
                "volume_recent_window must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Latest indicator values. `None` means insufficient data, never zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    /// RSI (0-100)
    pub rsi: Option<f64>,
    /// MACD line
    pub macd: Option<f64>,
    /// MACD signal line
    pub macd_signal: Option<f64>,
    /// MACD minus signal
    pub macd_histogram: Option<f64>,
    pub sma_20: Option<f64>,
    pub sma_50: Option<f64>,
    pub sma_200: Option<f64>,
    pub volume_trend: Option<VolumeTrend>,
}

/// The three directional rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalRule {
    PriceVsSma20,
    PriceVsSma50,
    MacdVsSignal,
}

/// Outcome of one directional rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSignal {
    pub rule: SignalRule,
    /// Human readable form, e.g. "Above 20-day MA"
    pub description: String,
    pub bias: Bias,
}

/// Full Indicator Engine output for one invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalAnalysis {
    pub current_price: f64,
    pub snapshot: IndicatorSnapshot,
    pub price_action: PriceAction,
    /// Rules that could be evaluated; a rule with undefined input is omitted
    pub signals: Vec<MarketSignal>,
    pub bullish_count: usize,
    pub bearish_count: usize,
    /// Bullish only with a strict majority of bullish rules
    pub technical_sentiment: Bias,
}

/// Indicator Engine
#[derive(Debug, Clone, Default)]
pub struct IndicatorEngine {
    config: IndicatorConfig,
}

impl IndicatorEngine {
    pub fn new(config: IndicatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &IndicatorConfig {
        &self.config
    }

    /// Compute the latest indicator values
    pub fn snapshot(&self, series: &PriceSeries) -> IndicatorSnapshot {
        let closes = series.closes();

        let rsi = rsi_series(&closes, self.config.rsi_period, self.config.rsi_smoothing)
            .last()
            .copied()
            .flatten();

        let (macd, macd_signal) = if closes.is_empty() {
            (None, None)
        } else {
            let (macd, signal) = macd_series(
                &closes,
                self.config.macd_fast,
                self.config.macd_slow,
                self.config.macd_signal,
            );
            (macd.last().copied(), signal.last().copied())
        };
        let macd_histogram = match (macd, macd_signal) {
            (Some(m), Some(s)) => Some(m - s),
            _ => None,
        };

        let last_sma = |window: usize| sma_series(&closes, window).last().copied().flatten();

        IndicatorSnapshot {
            rsi,
            macd,
            macd_signal,
            macd_histogram,
            sma_20: last_sma(SMA_SHORT),
            sma_50: last_sma(SMA_MEDIUM),
            sma_200: last_sma(SMA_LONG),
            volume_trend: self.volume_trend(&series.volumes()),
        }
    }

    /// "Increasing" when the mean of the most recent volumes beats the mean of
    /// the whole window
    fn volume_trend(&self, volumes: &[f64]) -> Option<VolumeTrend> {
        let window_mean = indicators::mean(volumes)?;
        let recent_start = volumes.len().saturating_sub(self.config.volume_recent_window);
        let recent_mean = indicators::mean(&volumes[recent_start..])?;

        Some(if recent_mean > window_mean {
            VolumeTrend::Increasing
        } else {
            VolumeTrend::Decreasing
        })
    }

    /// Run the engine: snapshot, price action and technical label
    pub fn analyze(&self, series: &PriceSeries) -> Result<TechnicalAnalysis, AnalysisError> {
        let current_price = series
            .last_close()
            .ok_or_else(|| AnalysisError::insufficient("indicators", 1, 0))?;

        let snapshot = self.snapshot(series);
        let signals = directional_signals(current_price, &snapshot);
        if signals.is_empty() {
            return Err(AnalysisError::insufficient("indicators", SMA_SHORT, series.len()));
        }

        let bullish_count = signals.iter().filter(|s| s.bias == Bias::Bullish).count();
        let bearish_count = signals.len() - bullish_count;
        let technical_sentiment = technical_bias(bullish_count, bearish_count);

        tracing::debug!(
            symbol = %series.symbol(),
            bars = series.len(),
            rsi = ?snapshot.rsi,
            macd = ?snapshot.macd,
            bullish_count,
            bearish_count,
            technical_sentiment = %technical_sentiment,
            "Indicator engine completed"
        );

        Ok(TechnicalAnalysis {
            current_price,
            price_action: PriceAction::from_closes(&series.closes()),
            snapshot,
            signals,
            bullish_count,
            bearish_count,
            technical_sentiment,
        })
    }
}

/// Evaluate price vs SMA20, price vs SMA50 and MACD vs signal.
/// Equality counts as the bearish side of each rule.
/// Majority vote over the signal tally; ties resolve to Bearish
pub fn technical_bias(bullish_count: usize, bearish_count: usize) -> Bias {
    if bullish_count > bearish_count {
        Bias::Bullish
    } else {
        Bias::Bearish
    }
}

pub fn directional_signals(price: f64, snapshot: &IndicatorSnapshot) -> Vec<MarketSignal> {
    let mut signals = Vec::with_capacity(3);

    for (rule, sma, label) in [
        (SignalRule::PriceVsSma20, snapshot.sma_20, "20-day MA"),
        (SignalRule::PriceVsSma50, snapshot.sma_50, "50-day MA"),
    ] {
        if let Some(sma) = sma {
            let (bias, side) = if price > sma {
                (Bias::Bullish, "Above")
            } else {
                (Bias::Bearish, "Below")
            };
            signals.push(MarketSignal {
                rule,
                description: format!("{} {}", side, label),
                bias,
            });
        }
    }

    if let (Some(macd), Some(signal)) = (snapshot.macd, snapshot.macd_signal) {
        let (bias, side) = if macd > signal {
            (Bias::Bullish, "Above")
        } else {
            (Bias::Bearish, "Below")
        };
        signals.push(MarketSignal {
            rule: SignalRule::MacdVsSignal,
            description: format!("MACD {} Signal", side),
            bias,
        });
    }

    signals
}
