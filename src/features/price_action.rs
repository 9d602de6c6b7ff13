//! Price action summary: percent change of the last close over fixed lookbacks

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceAction {
    pub current_price: f64,
    /// vs the previous close
    pub daily_change_pct: Option<f64>,
    /// vs the close five bars from the end (inclusive of the last bar)
    pub weekly_change_pct: Option<f64>,
    /// vs the close twenty bars from the end (inclusive of the last bar)
    pub monthly_change_pct: Option<f64>,
}

impl PriceAction {
    /// Returns an all-`None` summary with price 0 for an empty slice; callers
    /// reject empty series before getting here.
    pub fn from_closes(closes: &[f64]) -> Self {
        let current_price = closes.last().copied().unwrap_or(0.0);
        let change_from = |bars_from_end: usize| -> Option<f64> {
            if closes.len() < bars_from_end {
                return None;
            }
            let base = closes[closes.len() - bars_from_end];
            Some((current_price - base) / base * 100.0)
        };

        Self {
            current_price,
            daily_change_pct: change_from(2),
            weekly_change_pct: change_from(5),
            monthly_change_pct: change_from(20),
        }
    }
}
