//! Report Persistence Module
//!
//! - `<output_dir>/<SYMBOL>_analysis.json`: latest full report per symbol
//! - `<output_dir>/recommendations.csv`: one appended row per recommendation

use anyhow::{Context, Result};
use csv::WriterBuilder;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex as AsyncMutex;
use tracing::info;

use crate::analysis::AnalysisReport;
use crate::strategy::{StrategyRecommendation, StrategySetup};

pub const RECOMMENDATIONS_FILE: &str = "recommendations.csv";

/// Recommendation row for CSV storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationRecord {
    pub generated_at: String,
    pub report_id: String,
    pub symbol: String,
    pub as_of: String,
    pub verdict: String,
    pub regime: String,
    pub strategy: String,
    pub days_to_expiry: u32,
    pub expiry_date: String,
    pub last_close: f64,
    /// Long put strike (bear put / condor)
    #[serde(default)]
    pub buy_put: Option<f64>,
    #[serde(default)]
    pub sell_put: Option<f64>,
    /// Long call strike (bull call / condor)
    #[serde(default)]
    pub buy_call: Option<f64>,
    #[serde(default)]
    pub sell_call: Option<f64>,
    pub max_profit: f64,
    pub max_loss: f64,
    pub pop_low: f64,
    pub pop_high: f64,
    /// Semicolon-separated
    pub breakevens: String,
}

impl RecommendationRecord {
    pub fn from_recommendation(report: &AnalysisReport, rec: &StrategyRecommendation) -> Self {
        let (buy_put, sell_put, buy_call, sell_call) = match rec.setup {
            StrategySetup::BullCallSpread {
                buy_strike,
                sell_strike,
            } => (None, None, Some(buy_strike), Some(sell_strike)),
            StrategySetup::BearPutSpread {
                buy_strike,
                sell_strike,
            } => (Some(buy_strike), Some(sell_strike), None, None),
            StrategySetup::IronCondor {
                buy_put,
                sell_put,
                sell_call,
                buy_call,
            } => (Some(buy_put), Some(sell_put), Some(buy_call), Some(sell_call)),
        };

        Self {
            generated_at: report.generated_at.to_rfc3339(),
            report_id: report.id.to_string(),
            symbol: report.symbol.clone(),
            as_of: report.as_of.to_string(),
            verdict: report.verdict.label.to_string(),
            regime: report.volatility.regime.to_string(),
            strategy: rec.setup.name().to_string(),
            days_to_expiry: rec.days_to_expiry,
            expiry_date: rec.expiry_date.to_string(),
            last_close: report.last_close,
            buy_put,
            sell_put,
            buy_call,
            sell_call,
            max_profit: rec.risk_reward.max_profit,
            max_loss: rec.risk_reward.max_loss,
            pop_low: rec.risk_reward.probability_of_profit.low,
            pop_high: rec.risk_reward.probability_of_profit.high,
            breakevens: rec
                .breakevens
                .iter()
                .map(|b| format!("{:.4}", b))
                .collect::<Vec<_>>()
                .join(";"),
        }
    }
}

/// Writes analysis reports to the output directory
pub struct ReportWriter {
    output_dir: PathBuf,
    recommendation_writer: AsyncMutex<csv::Writer<std::fs::File>>,
}

impl ReportWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Result<Self> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir).with_context(|| {
            format!("Failed to create output directory {}", output_dir.display())
        })?;
        let recommendation_writer = Self::create_writer(&output_dir, RECOMMENDATIONS_FILE)?;

        info!("📁 Report output at {}", output_dir.display());

        Ok(Self {
            output_dir,
            recommendation_writer: AsyncMutex::new(recommendation_writer),
        })
    }

    fn create_writer(dir: &Path, filename: &str) -> Result<csv::Writer<std::fs::File>> {
        let path = dir.join(filename);
        let file_has_data =
            path.exists() && fs::metadata(&path).map(|m| m.len() > 0).unwrap_or(false);

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .context("Failed to open CSV file")?;

        let writer = WriterBuilder::new()
            .has_headers(!file_has_data)
            .from_writer(file);

        Ok(writer)
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn report_path(&self, symbol: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}_analysis.json", symbol.to_uppercase()))
    }

    /// Overwrite the symbol's JSON report
    pub fn write_report(&self, report: &AnalysisReport) -> Result<PathBuf> {
        let path = self.report_path(&report.symbol);
        let json = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to write report {}", path.display()))?;
        Ok(path)
    }

    /// Append one CSV row per recommendation, returning the row count
    pub async fn append_recommendations(&self, report: &AnalysisReport) -> Result<usize> {
        let mut writer = self.recommendation_writer.lock().await;
        for rec in &report.strategies.recommendations {
            writer
                .serialize(RecommendationRecord::from_recommendation(report, rec))
                .context("Failed to write recommendation record")?;
        }
        writer
            .flush()
            .context("Failed to flush recommendation writer")?;
        Ok(report.strategies.recommendations.len())
    }

    pub async fn save_report(&self, report: &AnalysisReport) -> Result<PathBuf> {
        let path = self.write_report(report)?;
        let rows = self.append_recommendations(report).await?;
        info!(
            "💾 {} report saved ({} recommendations) -> {}",
            report.symbol,
            rows,
            path.display()
        );
        Ok(path)
    }
}
