//! Core types used throughout TradeLens
//!
//! Defines the price series consumed by the analysis core, the text items fed
//! to the sentiment aggregator and the discrete labels shared between modules.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::AnalysisError;

/// One daily OHLCV bar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    /// Trading date
    pub date: NaiveDate,
    /// Open price
    pub open: f64,
    /// High price
    pub high: f64,
    /// Low price
    pub low: f64,
    /// Close price
    pub close: f64,
    /// Volume in shares
    pub volume: f64,
}

/// Ordered daily series for a single security.
///
/// Construction validates the invariants once; afterwards the series is
/// read-only and every derived column is a new vector aligned by index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    symbol: String,
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Build a validated series.
    ///
    /// Dates must be strictly increasing, prices strictly positive and finite,
    /// volume non-negative. An empty series is accepted; the components report
    /// it as insufficient data.
    pub fn new(symbol: impl Into<String>, bars: Vec<PriceBar>) -> Result<Self, AnalysisError> {
        for (i, bar) in bars.iter().enumerate() {
            let prices = [bar.open, bar.high, bar.low, bar.close];
            if prices.iter().any(|p| !p.is_finite() || *p <= 0.0) {
                return Err(AnalysisError::InvalidSeries(format!(
                    "bar {} ({}) has a non-positive price",
                    i, bar.date
                )));
            }
            if !bar.volume.is_finite() || bar.volume < 0.0 {
                return Err(AnalysisError::InvalidSeries(format!(
                    "bar {} ({}) has negative volume",
                    i, bar.date
                )));
            }
            if i > 0 && bars[i - 1].date >= bar.date {
                return Err(AnalysisError::InvalidSeries(format!(
                    "dates not strictly increasing at bar {} ({} after {})",
                    i,
                    bar.date,
                    bars[i - 1].date
                )));
            }
        }

        Ok(Self {
            symbol: symbol.into(),
            bars,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Close prices, aligned with `bars()`
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Volumes, aligned with `bars()`
    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume).collect()
    }

    pub fn last(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    pub fn last_close(&self) -> Option<f64> {
        self.bars.last().map(|b| b.close)
    }
}

/// Timestamped text snippet (headline, comment) from an external source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextItem {
    pub timestamp: DateTime<Utc>,
    pub text: String,
}

/// Tag attached to a single directional rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Bias {
    Bullish,
    Bearish,
}

impl fmt::Display for Bias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bias::Bullish => write!(f, "Bullish"),
            Bias::Bearish => write!(f, "Bearish"),
        }
    }
}

/// Volume trend of the most recent bars against the whole window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VolumeTrend {
    Increasing,
    Decreasing,
}

impl fmt::Display for VolumeTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VolumeTrend::Increasing => write!(f, "Increasing"),
            VolumeTrend::Decreasing => write!(f, "Decreasing"),
        }
    }
}

/// Volatility regime relative to the security's own trailing history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VolatilityRegime {
    #[serde(rename = "Low Volatility")]
    Low,
    Normal,
    #[serde(rename = "High Volatility")]
    High,
}

impl fmt::Display for VolatilityRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VolatilityRegime::Low => write!(f, "Low Volatility"),
            VolatilityRegime::Normal => write!(f, "Normal"),
            VolatilityRegime::High => write!(f, "High Volatility"),
        }
    }
}

/// Fused directional verdict label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FusedLabel {
    #[serde(rename = "Strong Bullish")]
    StrongBullish,
    #[serde(rename = "Moderately Bullish")]
    ModeratelyBullish,
    Neutral,
    #[serde(rename = "Moderately Bearish")]
    ModeratelyBearish,
    #[serde(rename = "Strong Bearish")]
    StrongBearish,
}

impl FusedLabel {
    pub fn is_bearish(&self) -> bool {
        matches!(self, FusedLabel::StrongBearish | FusedLabel::ModeratelyBearish)
    }

    pub fn is_bullish(&self) -> bool {
        matches!(self, FusedLabel::StrongBullish | FusedLabel::ModeratelyBullish)
    }

    pub fn is_strong(&self) -> bool {
        matches!(self, FusedLabel::StrongBullish | FusedLabel::StrongBearish)
    }

    /// Direction implied by the label, `None` for Neutral
    pub fn bias(&self) -> Option<Bias> {
        if self.is_bullish() {
            Some(Bias::Bullish)
        } else if self.is_bearish() {
            Some(Bias::Bearish)
        } else {
            None
        }
    }
}

impl fmt::Display for FusedLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FusedLabel::StrongBullish => write!(f, "Strong Bullish"),
            FusedLabel::ModeratelyBullish => write!(f, "Moderately Bullish"),
            FusedLabel::Neutral => write!(f, "Neutral"),
            FusedLabel::ModeratelyBearish => write!(f, "Moderately Bearish"),
            FusedLabel::StrongBearish => write!(f, "Strong Bearish"),
        }
    }
}
