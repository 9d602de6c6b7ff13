//! Analysis cache
//!
//! Keyed memoization of finished reports, owned by the runner. The analysis
//! core never reads or writes it. A key changes whenever the inputs change
//! (new bar, revised close, different text content, new as-of date), so
//! entries only go stale by age.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::RwLock;
use std::time::{Duration, Instant};

use chrono::NaiveDate;

use crate::types::{PriceSeries, TextItem};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub symbol: String,
    pub as_of: NaiveDate,
    pub last_bar: Option<NaiveDate>,
    pub text_items: usize,
    /// Hash of the last close and every text item's timestamp and body
    pub fingerprint: u64,
}

impl CacheKey {
    pub fn new(series: &PriceSeries, as_of: NaiveDate, items: &[TextItem]) -> Self {
        Self {
            symbol: series.symbol().to_string(),
            as_of,
            last_bar: series.last().map(|b| b.date),
            text_items: items.len(),
            fingerprint: fingerprint(series, items),
        }
    }
}

fn fingerprint(series: &PriceSeries, items: &[TextItem]) -> u64 {
    let mut hasher = DefaultHasher::new();
    series.last().map(|b| b.close.to_bits()).hash(&mut hasher);
    for item in items {
        item.timestamp.hash(&mut hasher);
        item.text.hash(&mut hasher);
    }
    hasher.finish()
}

#[derive(Debug)]
pub struct AnalysisCache<V> {
    ttl: Duration,
    entries: RwLock<HashMap<CacheKey, (Instant, V)>>,
}

impl<V: Clone> AnalysisCache<V> {
    /// A zero TTL disables caching
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get(&self, key: &CacheKey) -> Option<V> {
        self.get_at(key, Instant::now())
    }

    fn get_at(&self, key: &CacheKey, now: Instant) -> Option<V> {
        if self.ttl.is_zero() {
            return None;
        }
        // a poisoned lock still holds consistent entries
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries
            .get(key)
            .filter(|(stored, _)| now.saturating_duration_since(*stored) < self.ttl)
            .map(|(_, value)| value.clone())
    }

    pub fn insert(&self, key: CacheKey, value: V) {
        self.insert_at(key, value, Instant::now());
    }

    fn insert_at(&self, key: CacheKey, value: V, now: Instant) {
        if self.ttl.is_zero() {
            return;
        }
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(key, (now, value));
    }

    /// Drop expired entries, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let before = entries.len();
        entries.retain(|_, (stored, _)| now.saturating_duration_since(*stored) < self.ttl);
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }
}
