//! Error taxonomy of the analysis core
//!
//! Application layers (config, sources, persistence) wrap these in
//! `anyhow::Error`; the core itself only ever returns `AnalysisError`.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// Series too short (or empty) for the named computation
    #[error("insufficient data for {component}: need {required}, have {available}")]
    InsufficientData {
        component: &'static str,
        required: usize,
        available: usize,
    },

    /// PriceSeries invariant violated at construction
    #[error("invalid price series: {0}")]
    InvalidSeries(String),

    /// Constructed strikes fail the ordering invariant of their variant
    #[error("invalid {strategy} geometry: {reason}")]
    InvalidStrategyGeometry {
        strategy: &'static str,
        reason: String,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl AnalysisError {
    pub fn insufficient(component: &'static str, required: usize, available: usize) -> Self {
        AnalysisError::InsufficientData {
            component,
            required,
            available,
        }
    }

    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, AnalysisError::InsufficientData { .. })
    }
}
