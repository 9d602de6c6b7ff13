//! ML Engine - next-day price range prediction
//!
//! Two random-forest regressors (SmartCore) fitted on the feature row of bar
//! t against the low and high of bar t + 1, then applied to the last bar.
//! Trees split on thresholds, so features are used unscaled.
//!
//! The prediction is advisory and never feeds the fusion or strategy stages.

pub mod dataset;

pub use dataset::{FeatureRow, RangeDataset};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use smartcore::ensemble::random_forest_regressor::{
    RandomForestRegressor, RandomForestRegressorParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;

use crate::error::AnalysisError;
use crate::types::PriceSeries;

/// Range predictor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MlConfig {
    pub enabled: bool,
    pub n_trees: u16,
    pub max_depth: u16,
    pub seed: u64,
    /// Minimum training pairs before a model is fitted
    pub min_training_rows: usize,
}

impl Default for MlConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            n_trees: 100,
            max_depth: 12,
            seed: 42,
            min_training_rows: 30,
        }
    }
}

impl MlConfig {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.n_trees == 0 || self.max_depth == 0 {
            return Err(AnalysisError::InvalidConfig(
                "ml.n_trees and ml.max_depth must be > 0".to_string(),
            ));
        }
        if self.min_training_rows < 2 {
            return Err(AnalysisError::InvalidConfig(
                "ml.min_training_rows must be >= 2".to_string(),
            ));
        }
        Ok(())
    }
}

/// Predicted next-day trading range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub low: f64,
    pub high: f64,
    pub training_rows: usize,
}

type Regressor = RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>;

#[derive(Debug, Clone, Default)]
pub struct PriceRangePredictor {
    config: MlConfig,
}

impl PriceRangePredictor {
    pub fn new(config: MlConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MlConfig {
        &self.config
    }

    /// `None` when disabled, data is insufficient or fitting fails
    pub fn predict(&self, series: &PriceSeries) -> Option<PriceRange> {
        if !self.config.enabled {
            return None;
        }

        let dataset = RangeDataset::from_series(series);
        if dataset.len() < self.config.min_training_rows {
            tracing::debug!(
                symbol = %series.symbol(),
                rows = dataset.len(),
                required = self.config.min_training_rows,
                "Not enough rows for range prediction"
            );
            return None;
        }

        match self.fit_and_predict(&dataset) {
            Ok(range) => {
                tracing::debug!(
                    symbol = %series.symbol(),
                    low = range.low,
                    high = range.high,
                    rows = range.training_rows,
                    "Next-day range predicted"
                );
                Some(range)
            }
            Err(e) => {
                tracing::warn!(symbol = %series.symbol(), error = %e, "Range prediction failed");
                None
            }
        }
    }

    fn fit_and_predict(&self, dataset: &RangeDataset) -> Result<PriceRange> {
        let latest = dataset
            .latest
            .context("last bar has undefined features")?;

        let x = to_matrix(&dataset.features)?;
        let low_model = self.fit(&x, &dataset.next_lows).context("low model")?;
        let high_model = self.fit(&x, &dataset.next_highs).context("high model")?;

        let query = to_matrix(&[latest])?;
        let low = predict_one(&low_model, &query)?;
        let high = predict_one(&high_model, &query)?;

        Ok(PriceRange {
            low: low.min(high),
            high: low.max(high),
            training_rows: dataset.len(),
        })
    }

    fn fit(&self, x: &DenseMatrix<f64>, y: &Vec<f64>) -> Result<Regressor> {
        let params = RandomForestRegressorParameters::default()
            .with_n_trees(self.config.n_trees.into())
            .with_max_depth(self.config.max_depth)
            .with_seed(self.config.seed);

        RandomForestRegressor::fit(x, y, params)
            .map_err(|e| anyhow!("Random Forest training failed: {:?}", e))
    }
}

fn to_matrix(rows: &[FeatureRow]) -> Result<DenseMatrix<f64>> {
    let vecs: Vec<Vec<f64>> = rows.iter().map(FeatureRow::to_vec).collect();
    let slices: Vec<&[f64]> = vecs.iter().map(|v| v.as_slice()).collect();
    DenseMatrix::from_2d_array(&slices).map_err(|e| anyhow!("feature matrix: {:?}", e))
}

fn predict_one(model: &Regressor, query: &DenseMatrix<f64>) -> Result<f64> {
    let predictions = model
        .predict(query)
        .map_err(|e| anyhow!("Random Forest prediction failed: {:?}", e))?;
    predictions
        .first()
        .copied()
        .context("empty prediction")
}
