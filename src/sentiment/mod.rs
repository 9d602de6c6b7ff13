//! Sentiment Aggregator
//!
//! Scores each text item with a polarity in [-1, 1] and aggregates:
//! - mean polarity (0 for an empty stream)
//! - positive / negative tallies (0 counts in neither)
//! - most recent items, newest first
//! - per-day mean polarity
//!
//! Independent of price data.

pub mod lexicon;

pub use lexicon::LexiconScorer;

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::types::TextItem;

/// Polarity of a single text, in [-1, 1]
pub trait PolarityScorer: Send + Sync {
    fn polarity(&self, text: &str) -> f64;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SentimentConfig {
    /// Size of the recent-items view
    pub recent_items: usize,
}

impl Default for SentimentConfig {
    fn default() -> Self {
        Self { recent_items: 5 }
    }
}

impl SentimentConfig {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.recent_items == 0 {
            return Err(AnalysisError::InvalidConfig(
                "sentiment.recent_items must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentSample {
    pub timestamp: DateTime<Utc>,
    pub polarity: f64,
    pub source_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySentiment {
    pub date: NaiveDate,
    pub mean_polarity: f64,
    pub item_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentSummary {
    pub average_score: f64,
    pub positive_count: usize,
    pub negative_count: usize,
    pub total_count: usize,
    /// Newest first
    pub recent: Vec<SentimentSample>,
    /// Ascending by date
    pub daily: Vec<DailySentiment>,
}

impl SentimentSummary {
    pub fn is_empty(&self) -> bool {
        self.total_count == 0
    }
}

/// Items dated within `(as_of - lookback_days, as_of]`
pub fn within_lookback(items: &[TextItem], as_of: NaiveDate, lookback_days: u32) -> Vec<TextItem> {
    let start = as_of - Duration::days(i64::from(lookback_days));
    items
        .iter()
        .filter(|item| {
            let date = item.timestamp.date_naive();
            date > start && date <= as_of
        })
        .cloned()
        .collect()
}

pub struct SentimentAggregator {
    config: SentimentConfig,
    scorer: Box<dyn PolarityScorer>,
}

impl Default for SentimentAggregator {
    fn default() -> Self {
        Self::new(SentimentConfig::default())
    }
}

impl std::fmt::Debug for SentimentAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SentimentAggregator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SentimentAggregator {
    pub fn new(config: SentimentConfig) -> Self {
        Self::with_scorer(config, Box::new(LexiconScorer::new()))
    }

    pub fn with_scorer(config: SentimentConfig, scorer: Box<dyn PolarityScorer>) -> Self {
        Self { config, scorer }
    }

    pub fn score(&self, items: &[TextItem]) -> Vec<SentimentSample> {
        items
            .iter()
            .map(|item| SentimentSample {
                timestamp: item.timestamp,
                polarity: self.scorer.polarity(&item.text).clamp(-1.0, 1.0),
                source_text: item.text.clone(),
            })
            .collect()
    }

    pub fn aggregate(&self, items: &[TextItem]) -> SentimentSummary {
        self.summarize(self.score(items))
    }

    /// Aggregate already-scored samples
    pub fn summarize(&self, samples: Vec<SentimentSample>) -> SentimentSummary {
        let total_count = samples.len();
        let average_score = if total_count == 0 {
            0.0
        } else {
            samples.iter().map(|s| s.polarity).sum::<f64>() / total_count as f64
        };
        let positive_count = samples.iter().filter(|s| s.polarity > 0.0).count();
        let negative_count = samples.iter().filter(|s| s.polarity < 0.0).count();

        let mut by_day: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
        for sample in &samples {
            let entry = by_day.entry(sample.timestamp.date_naive()).or_default();
            entry.0 += sample.polarity;
            entry.1 += 1;
        }
        let daily = by_day
            .into_iter()
            .map(|(date, (sum, count))| DailySentiment {
                date,
                mean_polarity: sum / count as f64,
                item_count: count,
            })
            .collect();

        let mut recent = samples;
        // stable sort keeps input order among equal timestamps
        recent.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        recent.truncate(self.config.recent_items);

        tracing::debug!(
            items = total_count,
            average = average_score,
            positive = positive_count,
            negative = negative_count,
            "Sentiment aggregated"
        );

        SentimentSummary {
            average_score,
            positive_count,
            negative_count,
            total_count,
            recent,
            daily,
        }
    }
}
