//! TradeLens Library
//!
//! Technical, volatility and sentiment signals fused into a directional
//! verdict, mapped to defined-risk option spreads over fixed horizons

pub mod analysis;
pub mod cache;
pub mod config;
pub mod error;
pub mod features;
pub mod fusion;
pub mod ml_engine;
pub mod persistence;
pub mod runner;
pub mod sentiment;
pub mod sources;
pub mod strategy;
pub mod types;
pub mod volatility;

pub use analysis::{AnalysisReport, Analyzer, PipelineConfig};
pub use error::AnalysisError;
pub use types::{Bias, FusedLabel, PriceBar, PriceSeries, TextItem, VolatilityRegime, VolumeTrend};
