//! CSV file sources
//!
//! - `<data_dir>/<SYMBOL>.csv`: `date,open,high,low,close,volume`
//! - `<data_dir>/<SYMBOL>_news.csv`: `timestamp,text` (RFC 3339 timestamps)

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use csv::ReaderBuilder;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{PriceSource, TextSource};
use crate::sentiment::within_lookback;
use crate::types::{PriceBar, PriceSeries, TextItem};

/// Price row as exported by common market-data tools (capitalized headers accepted)
#[derive(Debug, Deserialize)]
struct PriceRow {
    #[serde(alias = "Date")]
    date: NaiveDate,
    #[serde(alias = "Open")]
    open: f64,
    #[serde(alias = "High")]
    high: f64,
    #[serde(alias = "Low")]
    low: f64,
    #[serde(alias = "Close")]
    close: f64,
    #[serde(alias = "Volume")]
    volume: f64,
}

#[derive(Debug, Deserialize)]
struct NewsRow {
    timestamp: DateTime<Utc>,
    text: String,
}

fn symbol_file(data_dir: &Path, symbol: &str, suffix: &str) -> PathBuf {
    data_dir.join(format!("{}{}.csv", symbol.to_uppercase(), suffix))
}

#[derive(Debug, Clone)]
pub struct CsvPriceSource {
    data_dir: PathBuf,
}

impl CsvPriceSource {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn path_for(&self, symbol: &str) -> PathBuf {
        symbol_file(&self.data_dir, symbol, "")
    }
}

impl PriceSource for CsvPriceSource {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn price_series(&self, symbol: &str) -> Result<PriceSeries> {
        let path = self.path_for(symbol);
        let file = std::fs::File::open(&path)
            .with_context(|| format!("Failed to open price file {}", path.display()))?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let mut bars = Vec::new();
        for (i, result) in reader.deserialize().enumerate() {
            let row: PriceRow = result
                .with_context(|| format!("Failed to parse row {} of {}", i + 1, path.display()))?;
            bars.push(PriceBar {
                date: row.date,
                open: row.open,
                high: row.high,
                low: row.low,
                close: row.close,
                volume: row.volume,
            });
        }
        bars.sort_by_key(|b| b.date);

        debug!(symbol, bars = bars.len(), path = %path.display(), "Loaded price history");

        PriceSeries::new(symbol.to_uppercase(), bars)
            .with_context(|| format!("Invalid price history in {}", path.display()))
    }
}

#[derive(Debug, Clone)]
pub struct CsvTextSource {
    data_dir: PathBuf,
}

impl CsvTextSource {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn path_for(&self, symbol: &str) -> PathBuf {
        symbol_file(&self.data_dir, symbol, "_news")
    }
}

impl TextSource for CsvTextSource {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn text_stream(&self, symbol: &str, as_of: NaiveDate, lookback_days: u32) -> Result<Vec<TextItem>> {
        let path = self.path_for(symbol);
        if !path.exists() {
            warn!(symbol, path = %path.display(), "No news file, using empty text stream");
            return Ok(Vec::new());
        }

        let file = std::fs::File::open(&path)
            .with_context(|| format!("Failed to open news file {}", path.display()))?;
        let mut reader = ReaderBuilder::new().has_headers(true).from_reader(file);

        let mut items = Vec::new();
        for (i, result) in reader.deserialize().enumerate() {
            let row: NewsRow = result
                .with_context(|| format!("Failed to parse row {} of {}", i + 1, path.display()))?;
            items.push(TextItem {
                timestamp: row.timestamp,
                text: row.text,
            });
        }
        items.sort_by_key(|item| item.timestamp);

        let items = within_lookback(&items, as_of, lookback_days);
        debug!(symbol, items = items.len(), lookback_days, "Loaded text stream");
        Ok(items)
    }
}
