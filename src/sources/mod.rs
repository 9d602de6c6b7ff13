//! Data sources feeding the analysis pipeline
//!
//! Retrieval happens before the core runs; the analyzer only ever sees
//! materialized `PriceSeries` and `TextItem` values.

mod csv_files;

pub use csv_files::{CsvPriceSource, CsvTextSource};

use anyhow::Result;
use chrono::NaiveDate;

use crate::types::{PriceSeries, TextItem};

/// Daily OHLCV history for a symbol, ascending by date
pub trait PriceSource: Send + Sync {
    fn name(&self) -> &'static str;

    fn price_series(&self, symbol: &str) -> Result<PriceSeries>;
}

/// Timestamped text items about a symbol dated within
/// `(as_of - lookback_days, as_of]`
pub trait TextSource: Send + Sync {
    fn name(&self) -> &'static str;

    fn text_stream(&self, symbol: &str, as_of: NaiveDate, lookback_days: u32) -> Result<Vec<TextItem>>;
}
