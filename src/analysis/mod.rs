//! Analyzer - the deterministic per-symbol pipeline
//!
//! Indicators and volatility run over the same price series, sentiment over
//! the text stream; all three feed fusion, the verdict feeds the strategy
//! selector. Every stage either completes or the whole report fails with an
//! `AnalysisError`: partial reports are never returned. Dropped strategy
//! horizons are the one expected degraded mode and are carried in the menu.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AnalysisError;
use crate::features::{IndicatorConfig, IndicatorEngine, TechnicalAnalysis};
use crate::fusion::{alignment_confidence, FusedVerdict, FusionConfig, SignalFusion};
use crate::ml_engine::{MlConfig, PriceRange, PriceRangePredictor};
use crate::sentiment::{SentimentAggregator, SentimentConfig, SentimentSummary};
use crate::strategy::{StrategyConfig, StrategyMenu, StrategySelector};
use crate::types::{PriceSeries, TextItem};
use crate::volatility::{VolatilityClassifier, VolatilityConfig, VolatilityProfile};

/// Settings of every pipeline stage
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub features: IndicatorConfig,
    pub volatility: VolatilityConfig,
    pub sentiment: SentimentConfig,
    pub fusion: FusionConfig,
    pub strategy: StrategyConfig,
    pub ml: MlConfig,
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        self.features.validate()?;
        self.volatility.validate()?;
        self.sentiment.validate()?;
        self.fusion.validate()?;
        self.strategy.validate()?;
        self.ml.validate()?;
        Ok(())
    }
}

/// Full result of one symbol analysis
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub id: Uuid,
    pub symbol: String,
    pub as_of: NaiveDate,
    pub generated_at: DateTime<Utc>,
    pub last_close: f64,
    pub technical: TechnicalAnalysis,
    pub volatility: VolatilityProfile,
    pub sentiment: SentimentSummary,
    pub verdict: FusedVerdict,
    /// 0-100 agreement of RSI and sentiment with the verdict
    pub alignment_confidence: f64,
    pub strategies: StrategyMenu,
    pub price_range: Option<PriceRange>,
}

#[derive(Debug)]
pub struct Analyzer {
    indicators: IndicatorEngine,
    volatility: VolatilityClassifier,
    sentiment: SentimentAggregator,
    fusion: SignalFusion,
    strategy: StrategySelector,
    predictor: PriceRangePredictor,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::from_parts(
            IndicatorEngine::default(),
            VolatilityClassifier::default(),
            SentimentAggregator::default(),
            SignalFusion::default(),
            StrategySelector::default(),
            PriceRangePredictor::default(),
        )
    }
}

impl Analyzer {
    /// Validates every section before building the stages
    pub fn new(config: PipelineConfig) -> Result<Self, AnalysisError> {
        config.validate()?;
        Ok(Self::from_parts(
            IndicatorEngine::new(config.features),
            VolatilityClassifier::new(config.volatility),
            SentimentAggregator::new(config.sentiment),
            SignalFusion::new(config.fusion),
            StrategySelector::new(config.strategy),
            PriceRangePredictor::new(config.ml),
        ))
    }

    pub fn from_parts(
        indicators: IndicatorEngine,
        volatility: VolatilityClassifier,
        sentiment: SentimentAggregator,
        fusion: SignalFusion,
        strategy: StrategySelector,
        predictor: PriceRangePredictor,
    ) -> Self {
        Self {
            indicators,
            volatility,
            sentiment,
            fusion,
            strategy,
            predictor,
        }
    }

    pub fn analyze(
        &self,
        series: &PriceSeries,
        texts: &[TextItem],
        as_of: NaiveDate,
    ) -> Result<AnalysisReport, AnalysisError> {
        let last_close = series
            .last_close()
            .ok_or_else(|| AnalysisError::insufficient("price series", 1, 0))?;

        let technical = self.indicators.analyze(series)?;
        let volatility = self.volatility.analyze(series)?;
        let sentiment = self.sentiment.aggregate(texts);

        let verdict = self.fusion.fuse(
            technical.technical_sentiment,
            sentiment.average_score,
            volatility.regime,
            volatility.black_swan_reference_ratio,
        );
        let alignment_confidence =
            alignment_confidence(technical.snapshot.rsi, sentiment.average_score, verdict.label);

        let strategies = self
            .strategy
            .recommend(last_close, &verdict, sentiment.average_score, as_of);
        let price_range = self.predictor.predict(series);

        tracing::debug!(
            symbol = %series.symbol(),
            verdict = %verdict.label,
            score = verdict.score,
            regime = %volatility.regime,
            strategies = strategies.recommendations.len(),
            dropped = strategies.dropped.len(),
            "Analysis completed"
        );

        Ok(AnalysisReport {
            id: Uuid::new_v4(),
            symbol: series.symbol().to_string(),
            as_of,
            generated_at: Utc::now(),
            last_close,
            technical,
            volatility,
            sentiment,
            verdict,
            alignment_confidence,
            strategies,
            price_range,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PriceBar;

    fn series(closes: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PriceBar {
                date: start + chrono::Duration::days(i as i64),
                open: close,
                high: close * 1.01,
                low: close * 0.99,
                close,
                volume: 5_000.0,
            })
            .collect();
        PriceSeries::new("IWM", bars).unwrap()
    }

    #[test]
    fn test_empty_series_is_insufficient() {
        let err = Analyzer::default()
            .analyze(&series(&[]), &[], NaiveDate::from_ymd_opt(2024, 2, 1).unwrap())
            .unwrap_err();
        assert!(err.is_insufficient_data());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = PipelineConfig::default();
        config.fusion.weights.technical = 0.9;
        assert!(matches!(Analyzer::new(config), Err(AnalysisError::InvalidConfig(_))));
    }

    #[test]
    fn test_report_is_complete() {
        let closes: Vec<f64> = (0..80).map(|i| 100.0 + (i as f64 * 0.4).sin() * 2.0 + i as f64 * 0.1).collect();
        let as_of = NaiveDate::from_ymd_opt(2024, 3, 21).unwrap();
        let report = Analyzer::default().analyze(&series(&closes), &[], as_of).unwrap();

        assert_eq!(report.symbol, "IWM");
        assert_eq!(report.last_close, *closes.last().unwrap());
        assert_eq!(report.sentiment.average_score, 0.0);
        assert!((0.0..=100.0).contains(&report.alignment_confidence));
        assert_eq!(
            report.strategies.recommendations.len() + report.strategies.dropped.len(),
            4
        );
        // 80 bars leave 59 training rows
        assert!(report.price_range.is_some());
    }
}
