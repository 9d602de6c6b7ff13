//! Reference table of historical extreme-volatility events
//!
//! Figures are broad-market (S&P 500 / VIX) approximations. Volatility impact
//! is the peak annualized implied volatility as a fraction (0.83 = 83%).
//! The table is context only: nothing triggers on it.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BlackSwanEvent {
    pub name: &'static str,
    /// ISO date of the volatility peak
    pub date: &'static str,
    /// Peak-to-trough index move in percent (negative)
    pub price_impact_pct: f64,
    pub volatility_impact: f64,
    /// Trading days to recover the pre-event high
    pub recovery_days: u32,
}

pub const BLACK_SWAN_EVENTS: [BlackSwanEvent; 5] = [
    BlackSwanEvent {
        name: "COVID-19 Pandemic Crash",
        date: "2020-03-16",
        price_impact_pct: -33.9,
        volatility_impact: 0.827,
        recovery_days: 103,
    },
    BlackSwanEvent {
        name: "Global Financial Crisis",
        date: "2008-11-20",
        price_impact_pct: -56.8,
        volatility_impact: 0.809,
        recovery_days: 1_021,
    },
    BlackSwanEvent {
        name: "Flash Crash",
        date: "2010-05-06",
        price_impact_pct: -9.2,
        volatility_impact: 0.409,
        recovery_days: 84,
    },
    BlackSwanEvent {
        name: "Brexit Referendum",
        date: "2016-06-24",
        price_impact_pct: -5.3,
        volatility_impact: 0.259,
        recovery_days: 9,
    },
    BlackSwanEvent {
        name: "US Sovereign Downgrade",
        date: "2011-08-08",
        price_impact_pct: -19.4,
        volatility_impact: 0.480,
        recovery_days: 110,
    },
];

/// Mean volatility impact across the reference table
pub fn mean_volatility_impact() -> f64 {
    BLACK_SWAN_EVENTS
        .iter()
        .map(|e| e.volatility_impact)
        .sum::<f64>()
        / BLACK_SWAN_EVENTS.len() as f64
}

/// Current volatility measured against one reference event
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventComparison {
    pub name: String,
    pub date: String,
    /// current / event volatility, in percent
    pub volatility_ratio_pct: f64,
    pub price_impact_pct: f64,
    pub recovery_days: u32,
}

/// Percent of the mean reference volatility
pub fn reference_ratio(current_volatility: f64) -> f64 {
    current_volatility / mean_volatility_impact() * 100.0
}

pub fn compare_events(current_volatility: f64) -> Vec<EventComparison> {
    BLACK_SWAN_EVENTS
        .iter()
        .map(|e| EventComparison {
            name: e.name.to_string(),
            date: e.date.to_string(),
            volatility_ratio_pct: current_volatility / e.volatility_impact * 100.0,
            price_impact_pct: e.price_impact_pct,
            recovery_days: e.recovery_days,
        })
        .collect()
}
