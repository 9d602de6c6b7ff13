//! Signal Fusion
//!
//! Weighted sum of three component scores:
//! - technical: +1 Bullish / -1 Bearish
//! - sentiment: mean polarity
//! - volatility: Low +0.5, Normal 0, High -0.5 (or -1 beyond the black-swan ratio)
//!
//! The total maps to a five-level label by symmetric thresholds.

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::types::{Bias, FusedLabel, VolatilityRegime};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionWeights {
    pub technical: f64,
    pub sentiment: f64,
    pub volatility: f64,
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self {
            technical: 0.4,
            sentiment: 0.3,
            volatility: 0.3,
        }
    }
}

impl FusionWeights {
    pub fn sum(&self) -> f64 {
        self.technical + self.sentiment + self.volatility
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    pub weights: FusionWeights,
    /// |total| above this is Strong
    pub strong_threshold: f64,
    /// |total| above this is Moderate
    pub moderate_threshold: f64,
    /// Black-swan reference ratio (percent) beyond which High volatility scores -1
    pub black_swan_high_ratio: f64,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            weights: FusionWeights::default(),
            strong_threshold: 0.3,
            moderate_threshold: 0.1,
            black_swan_high_ratio: 50.0,
        }
    }
}

impl FusionConfig {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        let w = &self.weights;
        if w.technical < 0.0 || w.sentiment < 0.0 || w.volatility < 0.0 {
            return Err(AnalysisError::InvalidConfig(
                "fusion weights must be non-negative".to_string(),
            ));
        }
        if (w.sum() - 1.0).abs() > 1e-9 {
            return Err(AnalysisError::InvalidConfig(format!(
                "fusion weights must sum to 1, got {}",
                w.sum()
            )));
        }
        if !(0.0 <= self.moderate_threshold && self.moderate_threshold <= self.strong_threshold) {
            return Err(AnalysisError::InvalidConfig(format!(
                "fusion thresholds must satisfy 0 <= moderate ({}) <= strong ({})",
                self.moderate_threshold, self.strong_threshold
            )));
        }
        Ok(())
    }
}

/// Unweighted component scores
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FusionComponents {
    pub technical: f64,
    pub sentiment: f64,
    pub volatility: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusedVerdict {
    pub label: FusedLabel,
    /// Weighted total, in [-1, 1]
    pub score: f64,
    pub weights: FusionWeights,
    pub components: FusionComponents,
    pub regime: VolatilityRegime,
}

#[derive(Debug, Clone, Default)]
pub struct SignalFusion {
    config: FusionConfig,
}

impl SignalFusion {
    pub fn new(config: FusionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FusionConfig {
        &self.config
    }

    pub fn volatility_score(&self, regime: VolatilityRegime, black_swan_ratio: f64) -> f64 {
        match regime {
            VolatilityRegime::Low => 0.5,
            VolatilityRegime::Normal => 0.0,
            VolatilityRegime::High if black_swan_ratio > self.config.black_swan_high_ratio => -1.0,
            VolatilityRegime::High => -0.5,
        }
    }

    pub fn label_for(&self, total: f64) -> FusedLabel {
        let strong = self.config.strong_threshold;
        let moderate = self.config.moderate_threshold;
        if total > strong {
            FusedLabel::StrongBullish
        } else if total > moderate {
            FusedLabel::ModeratelyBullish
        } else if total < -strong {
            FusedLabel::StrongBearish
        } else if total < -moderate {
            FusedLabel::ModeratelyBearish
        } else {
            FusedLabel::Neutral
        }
    }

    pub fn fuse(
        &self,
        technical: Bias,
        sentiment_score: f64,
        regime: VolatilityRegime,
        black_swan_ratio: f64,
    ) -> FusedVerdict {
        let components = FusionComponents {
            technical: match technical {
                Bias::Bullish => 1.0,
                Bias::Bearish => -1.0,
            },
            sentiment: sentiment_score.clamp(-1.0, 1.0),
            volatility: self.volatility_score(regime, black_swan_ratio),
        };

        let w = self.config.weights;
        let score = (w.technical * components.technical
            + w.sentiment * components.sentiment
            + w.volatility * components.volatility)
            .clamp(-1.0, 1.0);
        let label = self.label_for(score);

        tracing::debug!(
            technical = %technical,
            sentiment = components.sentiment,
            volatility = components.volatility,
            score,
            label = %label,
            "Signals fused"
        );

        FusedVerdict {
            label,
            score,
            weights: w,
            components,
            regime,
        }
    }
}

/// Agreement of independent signals with the fused direction, 0-100.
///
/// RSI counts as a factor when defined: above 70 supports bearish, below 30
/// supports bullish. Sentiment always counts: its sign supports the matching
/// direction. A firing signal scores +1 when it matches the verdict's
/// direction and -1 otherwise (a Neutral verdict matches nothing).
pub fn alignment_confidence(rsi: Option<f64>, sentiment_score: f64, label: FusedLabel) -> f64 {
    let direction = label.bias();
    let vote = |supports: Bias| if direction == Some(supports) { 1.0 } else { -1.0 };

    let mut score = 0.0;
    let mut factors = 0usize;

    if let Some(rsi) = rsi {
        if rsi > 70.0 {
            score += vote(Bias::Bearish);
        } else if rsi < 30.0 {
            score += vote(Bias::Bullish);
        }
        factors += 1;
    }

    if sentiment_score > 0.0 {
        score += vote(Bias::Bullish);
    } else if sentiment_score < 0.0 {
        score += vote(Bias::Bearish);
    }
    factors += 1;

    ((score / factors as f64 + 1.0) * 50.0).clamp(0.0, 100.0)
}
