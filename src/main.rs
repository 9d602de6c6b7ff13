//! TradeLens binary
//!
//! Loads the layered configuration, analyzes every configured symbol and
//! writes the reports. With `analysis.refresh_secs > 0` the batch repeats on
//! an interval until Ctrl-C.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use tradelens::cache::AnalysisCache;
use tradelens::config::AppConfig;
use tradelens::persistence::ReportWriter;
use tradelens::runner::BatchRunner;
use tradelens::sources::{CsvPriceSource, CsvTextSource};
use tradelens::Analyzer;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("TRADELENS_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env before the subscriber so RUST_LOG can live there
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::load().context("Failed to load configuration")?;
    info!("🚀 TradeLens starting: {}", config);

    let analyzer = Analyzer::new(config.pipeline()).context("Failed to build analyzer")?;
    let runner = BatchRunner::new(
        analyzer,
        Arc::new(CsvPriceSource::new(config.analysis.data_dir())),
        Arc::new(CsvTextSource::new(config.analysis.data_dir())),
        AnalysisCache::new(config.analysis.cache_ttl()),
        config.analysis.lookback_days,
    );
    let writer = if config.analysis.write_reports {
        Some(ReportWriter::new(config.analysis.output_dir())?)
    } else {
        None
    };

    let Some(period) = config.analysis.refresh_interval() else {
        let failed = run_once(&runner, writer.as_ref(), &config).await;
        if failed > 0 {
            warn!("{} of {} symbols failed", failed, config.analysis.symbols.len());
        }
        return Ok(());
    };

    info!("⏱️ Refreshing every {}s, Ctrl-C to stop", period.as_secs());
    let mut interval = tokio::time::interval(period);
    loop {
        tokio::select! {
            _ = interval.tick() => {
                run_once(&runner, writer.as_ref(), &config).await;
            }
            result = tokio::signal::ctrl_c() => {
                result.context("Failed to listen for Ctrl-C")?;
                info!("🛑 Shutting down");
                break;
            }
        }
    }

    Ok(())
}

/// One batch over all symbols; returns the failure count
async fn run_once(runner: &BatchRunner, writer: Option<&ReportWriter>, config: &AppConfig) -> usize {
    let as_of = Utc::now().date_naive();
    let outcome = runner.analyze_batch(&config.analysis.symbols, as_of).await;

    if let Some(writer) = writer {
        for report in outcome.fresh() {
            if let Err(e) = writer.save_report(report).await {
                error!(symbol = %report.symbol, "Failed to save report: {:#}", e);
            }
        }
    }

    for report in &outcome.reports {
        let menu = &report.report.strategies;
        if menu.is_empty() {
            warn!(symbol = %report.report.symbol, "No strategy could be built for any horizon");
        } else if menu.is_partial() {
            warn!(
                symbol = %report.report.symbol,
                dropped = menu.dropped.len(),
                "Some strategy horizons unavailable"
            );
        }
    }

    outcome.failures.len()
}
