//! Configuration management for TradeLens
//!
//! Layered: built-in defaults, then `config/default.*`, `config/local.*`,
//! then environment variables (`TRADELENS__SECTION__KEY`), with `.env` loaded first.

use anyhow::{bail, Context, Result};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::analysis::PipelineConfig;
use crate::features::IndicatorConfig;
use crate::fusion::FusionConfig;
use crate::ml_engine::MlConfig;
use crate::sentiment::SentimentConfig;
use crate::strategy::StrategyConfig;
use crate::volatility::VolatilityConfig;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub analysis: AnalysisSettings,
    #[serde(default)]
    pub features: IndicatorConfig,
    #[serde(default)]
    pub volatility: VolatilityConfig,
    #[serde(default)]
    pub sentiment: SentimentConfig,
    #[serde(default)]
    pub fusion: FusionConfig,
    #[serde(default)]
    pub strategy: StrategyConfig,
    #[serde(default)]
    pub ml: MlConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisSettings {
    /// Symbols analyzed on each run
    pub symbols: Vec<String>,
    /// Directory holding `<SYMBOL>.csv` and `<SYMBOL>_news.csv`
    pub data_dir: String,
    /// Directory receiving JSON reports and the recommendation log
    pub output_dir: String,
    /// Text stream lookback in days
    pub lookback_days: u32,
    /// Seconds between runs, 0 = run once
    pub refresh_secs: u64,
    /// Report cache TTL in seconds, 0 disables the cache
    pub cache_ttl_secs: u64,
    /// Write reports to `output_dir`
    pub write_reports: bool,
}

impl AnalysisSettings {
    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.data_dir)
    }

    pub fn output_dir(&self) -> PathBuf {
        PathBuf::from(&self.output_dir)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// `None` when running once
    pub fn refresh_interval(&self) -> Option<Duration> {
        (self.refresh_secs > 0).then(|| Duration::from_secs(self.refresh_secs))
    }
}

impl AppConfig {
    fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>> {
        let builder = Config::builder()
            // Analysis defaults
            .set_default("analysis.symbols", vec!["IWM"])?
            .set_default("analysis.data_dir", "./data")?
            .set_default("analysis.output_dir", "./output")?
            .set_default("analysis.lookback_days", 7)?
            .set_default("analysis.refresh_secs", 0)?
            .set_default("analysis.cache_ttl_secs", 3600)?
            .set_default("analysis.write_reports", true)?
            // Features defaults
            .set_default("features.rsi_period", 14)?
            .set_default("features.rsi_smoothing", "simple")?
            .set_default("features.macd_fast", 12)?
            .set_default("features.macd_slow", 26)?
            .set_default("features.macd_signal", 9)?
            // Volatility defaults
            .set_default("volatility.trading_days", 252.0)?
            .set_default("volatility.rolling_window", 20)?
            .set_default("volatility.history_window", 252)?
            // Strategy defaults
            .set_default("strategy.horizons_days", vec![7, 14, 21, 28])?
            .set_default("strategy.mode", "directional")?
            // ML defaults
            .set_default("ml.enabled", true)?
            .set_default("ml.n_trees", 100)?
            .set_default("ml.seed", 42)?;
        Ok(builder)
    }

    /// Load configuration from default files and environment
    pub fn load() -> Result<Self> {
        // Load .env file first
        dotenvy::dotenv().ok();

        let config = Self::builder_with_defaults()?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // Override with environment variables (TRADELENS__*)
            .add_source(
                Environment::with_prefix("TRADELENS")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("analysis.symbols")
                    .with_list_parse_key("strategy.horizons_days")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to build configuration")?;

        Self::finish(config)
    }

    /// Load defaults overlaid with a single file, ignoring the environment
    pub fn load_from(path: &Path) -> Result<Self> {
        let config = Self::builder_with_defaults()?
            .add_source(File::from(path).required(true))
            .build()
            .with_context(|| format!("Failed to build configuration from {}", path.display()))?;

        Self::finish(config)
    }

    fn finish(config: Config) -> Result<Self> {
        let app_config: AppConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        app_config.validate()?;
        Ok(app_config)
    }

    /// Check every section
    pub fn validate(&self) -> Result<()> {
        if self.analysis.symbols.is_empty() {
            bail!("analysis.symbols must list at least one symbol");
        }
        if self.analysis.symbols.iter().any(|s| s.trim().is_empty()) {
            bail!("analysis.symbols contains an empty symbol");
        }
        self.pipeline()
            .validate()
            .context("Invalid analysis configuration")?;
        Ok(())
    }

    pub fn pipeline(&self) -> PipelineConfig {
        PipelineConfig {
            features: self.features.clone(),
            volatility: self.volatility.clone(),
            sentiment: self.sentiment.clone(),
            fusion: self.fusion.clone(),
            strategy: self.strategy.clone(),
            ml: self.ml.clone(),
        }
    }

    /// Generate a digest of the config for logging
    pub fn digest(&self) -> String {
        format!(
            "symbols={:?} horizons={:?} mode={:?} weights=({:.2},{:.2},{:.2}) refresh={}s ml={}",
            self.analysis.symbols,
            self.strategy.horizons_days,
            self.strategy.mode,
            self.fusion.weights.technical,
            self.fusion.weights.sentiment,
            self.fusion.weights.volatility,
            self.analysis.refresh_secs,
            self.ml.enabled
        )
    }
}

impl std::fmt::Display for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.digest())
    }
}
