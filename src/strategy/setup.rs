//! Option strategy setups and their strike-ordering invariants

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// Leg strikes of a supported strategy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StrategySetup {
    /// Long call at `buy_strike`, short call at `sell_strike`
    BullCallSpread { buy_strike: f64, sell_strike: f64 },
    /// Long put at `buy_strike`, short put at `sell_strike`
    BearPutSpread { buy_strike: f64, sell_strike: f64 },
    IronCondor {
        buy_put: f64,
        sell_put: f64,
        sell_call: f64,
        buy_call: f64,
    },
}

impl StrategySetup {
    pub fn name(&self) -> &'static str {
        match self {
            StrategySetup::BullCallSpread { .. } => "Bull Call Spread",
            StrategySetup::BearPutSpread { .. } => "Bear Put Spread",
            StrategySetup::IronCondor { .. } => "Iron Condor",
        }
    }

    /// Strikes in the order they are declared
    pub fn strikes(&self) -> Vec<f64> {
        match *self {
            StrategySetup::BullCallSpread {
                buy_strike,
                sell_strike,
            }
            | StrategySetup::BearPutSpread {
                buy_strike,
                sell_strike,
            } => vec![buy_strike, sell_strike],
            StrategySetup::IronCondor {
                buy_put,
                sell_put,
                sell_call,
                buy_call,
            } => vec![buy_put, sell_put, sell_call, buy_call],
        }
    }

    /// Check the variant's ordering invariant against the underlying price.
    ///
    /// Bear put strikes are additionally bounded by `price * bear_put_upper_bound`.
    pub fn validate(&self, price: f64, bear_put_upper_bound: f64) -> Result<(), AnalysisError> {
        let strategy = self.name();
        let fail = |reason: String| Err(AnalysisError::InvalidStrategyGeometry { strategy, reason });

        if !(price.is_finite() && price > 0.0) {
            return fail(format!("underlying price {} is not a positive number", price));
        }
        if self.strikes().iter().any(|s| !(s.is_finite() && *s > 0.0)) {
            return fail(format!("non-positive strike in {:?}", self.strikes()));
        }

        match *self {
            StrategySetup::BullCallSpread {
                buy_strike,
                sell_strike,
            } => {
                if buy_strike >= sell_strike {
                    return fail(format!(
                        "buy call {:.2} must be below sell call {:.2}",
                        buy_strike, sell_strike
                    ));
                }
            }
            StrategySetup::BearPutSpread {
                buy_strike,
                sell_strike,
            } => {
                let bound = price * bear_put_upper_bound;
                if !(sell_strike < buy_strike && buy_strike < bound) {
                    return fail(format!(
                        "need sell put {:.2} < buy put {:.2} < {:.2}",
                        sell_strike, buy_strike, bound
                    ));
                }
            }
            StrategySetup::IronCondor {
                buy_put,
                sell_put,
                sell_call,
                buy_call,
            } => {
                if !(buy_put < sell_put && sell_put < price && price < sell_call && sell_call < buy_call)
                {
                    return fail(format!(
                        "need {:.2} < {:.2} < price {:.2} < {:.2} < {:.2}",
                        buy_put, sell_put, price, sell_call, buy_call
                    ));
                }
            }
        }
        Ok(())
    }

    /// Strike gap in dollars; the wider wing for an iron condor
    pub fn spread_width(&self) -> f64 {
        match *self {
            StrategySetup::BullCallSpread {
                buy_strike,
                sell_strike,
            }
            | StrategySetup::BearPutSpread {
                buy_strike,
                sell_strike,
            } => (sell_strike - buy_strike).abs(),
            StrategySetup::IronCondor { .. } => {
                let (put, call) = self.wing_widths().unwrap_or((0.0, 0.0));
                put.max(call)
            }
        }
    }

    /// Put and call wing widths of an iron condor
    pub fn wing_widths(&self) -> Option<(f64, f64)> {
        match *self {
            StrategySetup::IronCondor {
                buy_put,
                sell_put,
                sell_call,
                buy_call,
            } => Some((sell_put - buy_put, buy_call - sell_call)),
            _ => None,
        }
    }

    /// Underlying prices at expiry where the payoff crosses zero
    pub fn breakevens(&self, max_profit: f64, max_loss: f64) -> Vec<f64> {
        match *self {
            StrategySetup::BullCallSpread { buy_strike, .. } => vec![buy_strike + max_loss],
            StrategySetup::BearPutSpread { buy_strike, .. } => vec![buy_strike - max_loss],
            StrategySetup::IronCondor {
                buy_put,
                sell_put,
                sell_call,
                buy_call,
            } => {
                let total = max_profit + max_loss;
                if total <= 0.0 {
                    return Vec::new();
                }
                let loss_share = max_loss / total;
                vec![
                    buy_put + (sell_put - buy_put) * loss_share,
                    buy_call - (buy_call - sell_call) * loss_share,
                ]
            }
        }
    }
}

impl fmt::Display for StrategySetup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            StrategySetup::BullCallSpread {
                buy_strike,
                sell_strike,
            } => write!(f, "buy {:.2} call / sell {:.2} call", buy_strike, sell_strike),
            StrategySetup::BearPutSpread {
                buy_strike,
                sell_strike,
            } => write!(f, "buy {:.2} put / sell {:.2} put", buy_strike, sell_strike),
            StrategySetup::IronCondor {
                buy_put,
                sell_put,
                sell_call,
                buy_call,
            } => write!(
                f,
                "buy {:.2} put / sell {:.2} put / sell {:.2} call / buy {:.2} call",
                buy_put, sell_put, sell_call, buy_call
            ),
        }
    }
}
