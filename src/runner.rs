//! Batch runner
//!
//! Fans a symbol list out over blocking tasks. Each task fetches its inputs,
//! consults the cache and runs the analyzer; a failing symbol is logged and
//! reported in the outcome while the others complete.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::{debug, error, info};

use crate::analysis::{AnalysisReport, Analyzer};
use crate::cache::{AnalysisCache, CacheKey};
use crate::sources::{PriceSource, TextSource};

/// Report produced for one symbol
#[derive(Debug, Clone)]
pub struct SymbolReport {
    pub report: Arc<AnalysisReport>,
    /// Served from the cache instead of a fresh analysis
    pub cached: bool,
}

#[derive(Debug, Clone)]
pub struct SymbolFailure {
    pub symbol: String,
    pub error: String,
}

/// Result of one batch, in input symbol order
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    pub reports: Vec<SymbolReport>,
    pub failures: Vec<SymbolFailure>,
}

impl BatchOutcome {
    pub fn fresh(&self) -> impl Iterator<Item = &AnalysisReport> {
        self.reports
            .iter()
            .filter(|r| !r.cached)
            .map(|r| r.report.as_ref())
    }

    pub fn cache_hits(&self) -> usize {
        self.reports.iter().filter(|r| r.cached).count()
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct BatchRunner {
    analyzer: Arc<Analyzer>,
    prices: Arc<dyn PriceSource>,
    texts: Arc<dyn TextSource>,
    cache: Arc<AnalysisCache<Arc<AnalysisReport>>>,
    lookback_days: u32,
}

impl BatchRunner {
    pub fn new(
        analyzer: Analyzer,
        prices: Arc<dyn PriceSource>,
        texts: Arc<dyn TextSource>,
        cache: AnalysisCache<Arc<AnalysisReport>>,
        lookback_days: u32,
    ) -> Self {
        Self {
            analyzer: Arc::new(analyzer),
            prices,
            texts,
            cache: Arc::new(cache),
            lookback_days,
        }
    }

    pub fn cache(&self) -> &AnalysisCache<Arc<AnalysisReport>> {
        &self.cache
    }

    /// Analyze one symbol on the calling thread
    pub fn analyze_symbol(&self, symbol: &str, as_of: NaiveDate) -> Result<SymbolReport> {
        analyze_one(
            &self.analyzer,
            self.prices.as_ref(),
            self.texts.as_ref(),
            &self.cache,
            symbol,
            as_of,
            self.lookback_days,
        )
    }

    /// Analyze every symbol, one blocking task each
    pub async fn analyze_batch(&self, symbols: &[String], as_of: NaiveDate) -> BatchOutcome {
        let started = Instant::now();
        info!(
            "🔍 Analyzing {} symbols (as of {}, prices: {}, texts: {})",
            symbols.len(),
            as_of,
            self.prices.name(),
            self.texts.name()
        );

        let handles: Vec<_> = symbols
            .iter()
            .map(|symbol| {
                let analyzer = Arc::clone(&self.analyzer);
                let prices = Arc::clone(&self.prices);
                let texts = Arc::clone(&self.texts);
                let cache = Arc::clone(&self.cache);
                let lookback_days = self.lookback_days;
                let task_symbol = symbol.clone();
                let handle = tokio::task::spawn_blocking(move || {
                    analyze_one(
                        &analyzer,
                        prices.as_ref(),
                        texts.as_ref(),
                        &cache,
                        &task_symbol,
                        as_of,
                        lookback_days,
                    )
                });
                (symbol.clone(), handle)
            })
            .collect();

        let mut outcome = BatchOutcome::default();
        for (symbol, handle) in handles {
            let result = handle
                .await
                .context("Analysis task panicked")
                .and_then(|r| r);
            match result {
                Ok(report) => outcome.reports.push(report),
                Err(e) => {
                    error!(symbol = %symbol, "❌ Analysis failed: {:#}", e);
                    outcome.failures.push(SymbolFailure {
                        symbol,
                        error: format!("{:#}", e),
                    });
                }
            }
        }

        self.cache.purge_expired();

        info!(
            "✅ Batch done in {:.2?}: {} ok ({} cached), {} failed",
            started.elapsed(),
            outcome.reports.len(),
            outcome.cache_hits(),
            outcome.failures.len()
        );
        outcome
    }
}

fn analyze_one(
    analyzer: &Analyzer,
    prices: &dyn PriceSource,
    texts: &dyn TextSource,
    cache: &AnalysisCache<Arc<AnalysisReport>>,
    symbol: &str,
    as_of: NaiveDate,
    lookback_days: u32,
) -> Result<SymbolReport> {
    let series = prices
        .price_series(symbol)
        .with_context(|| format!("Failed to load prices for {}", symbol))?;
    let items = texts
        .text_stream(symbol, as_of, lookback_days)
        .with_context(|| format!("Failed to load text stream for {}", symbol))?;

    let key = CacheKey::new(&series, as_of, &items);
    if let Some(report) = cache.get(&key) {
        debug!(symbol, "Cache hit");
        return Ok(SymbolReport {
            report,
            cached: true,
        });
    }

    let report = analyzer
        .analyze(&series, &items, as_of)
        .with_context(|| format!("Analysis failed for {}", symbol))?;
    let report = Arc::new(report);
    cache.insert(key, Arc::clone(&report));

    info!(
        symbol,
        verdict = %report.verdict.label,
        regime = %report.volatility.regime,
        strategies = report.strategies.recommendations.len(),
        "📊 {} analyzed",
        symbol
    );

    Ok(SymbolReport {
        report,
        cached: false,
    })
}
