//! Payoff Evaluator
//!
//! Profit/loss at expiry as a pure piecewise-linear function of the
//! underlying price.

use serde::{Deserialize, Serialize};

use super::setup::StrategySetup;
use super::RiskReward;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PayoffPoint {
    pub price: f64,
    pub profit_loss: f64,
}

pub fn payoff(setup: &StrategySetup, risk_reward: &RiskReward, price: f64) -> f64 {
    let max_profit = risk_reward.max_profit;
    let max_loss = risk_reward.max_loss;

    match *setup {
        StrategySetup::BullCallSpread {
            buy_strike,
            sell_strike,
        } => {
            if price <= buy_strike {
                -max_loss
            } else if price < sell_strike {
                -max_loss + (price - buy_strike)
            } else {
                max_profit
            }
        }
        StrategySetup::BearPutSpread {
            buy_strike,
            sell_strike,
        } => {
            if price >= buy_strike {
                -max_loss
            } else if price > sell_strike {
                -max_loss + (buy_strike - price)
            } else {
                max_profit
            }
        }
        StrategySetup::IronCondor {
            buy_put,
            sell_put,
            sell_call,
            buy_call,
        } => {
            let swing = max_profit + max_loss;
            if price <= buy_put || price >= buy_call {
                -max_loss
            } else if price < sell_put {
                -max_loss + swing * (price - buy_put) / (sell_put - buy_put)
            } else if price <= sell_call {
                max_profit
            } else {
                max_profit - swing * (price - sell_call) / (buy_call - sell_call)
            }
        }
    }
}

/// `points` evenly spaced prices spanning `center * (1 ± range_pct)`
pub fn price_grid(center: f64, range_pct: f64, points: usize) -> Vec<f64> {
    match points {
        0 => Vec::new(),
        1 => vec![center],
        _ => {
            let low = center * (1.0 - range_pct);
            let high = center * (1.0 + range_pct);
            let step = (high - low) / (points - 1) as f64;
            (0..points)
                .map(|i| if i == points - 1 { high } else { low + step * i as f64 })
                .collect()
        }
    }
}

pub fn payoff_curve(
    setup: &StrategySetup,
    risk_reward: &RiskReward,
    center: f64,
    range_pct: f64,
    points: usize,
) -> Vec<PayoffPoint> {
    price_grid(center, range_pct, points)
        .into_iter()
        .map(|price| PayoffPoint {
            price,
            profit_loss: payoff(setup, risk_reward, price),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::ProbabilityBand;

    fn rr(max_profit: f64, max_loss: f64) -> RiskReward {
        RiskReward {
            max_profit,
            max_loss,
            probability_of_profit: ProbabilityBand {
                low: 50.0,
                high: 60.0,
            },
        }
    }

    #[test]
    fn test_bull_call_segments() {
        let setup = StrategySetup::BullCallSpread {
            buy_strike: 100.0,
            sell_strike: 105.0,
        };
        let rr = rr(4.0, 1.0);
        assert_eq!(payoff(&setup, &rr, 90.0), -1.0);
        assert_eq!(payoff(&setup, &rr, 100.0), -1.0);
        assert_eq!(payoff(&setup, &rr, 102.0), 1.0);
        assert_eq!(payoff(&setup, &rr, 105.0), 4.0);
        assert_eq!(payoff(&setup, &rr, 120.0), 4.0);
    }

    #[test]
    fn test_bear_put_segments() {
        let setup = StrategySetup::BearPutSpread {
            buy_strike: 105.0,
            sell_strike: 100.0,
        };
        let rr = rr(4.0, 1.0);
        assert_eq!(payoff(&setup, &rr, 110.0), -1.0);
        assert_eq!(payoff(&setup, &rr, 103.0), 1.0);
        assert_eq!(payoff(&setup, &rr, 100.0), 4.0);
        assert_eq!(payoff(&setup, &rr, 80.0), 4.0);
    }

    #[test]
    fn test_condor_five_segments() {
        let setup = StrategySetup::IronCondor {
            buy_put: 90.0,
            sell_put: 95.0,
            sell_call: 105.0,
            buy_call: 110.0,
        };
        let rr = rr(0.75, 4.25);
        assert_eq!(payoff(&setup, &rr, 85.0), -4.25);
        assert!((payoff(&setup, &rr, 92.5) - (-1.75)).abs() < 1e-12);
        assert_eq!(payoff(&setup, &rr, 100.0), 0.75);
        assert!((payoff(&setup, &rr, 107.5) - (-1.75)).abs() < 1e-12);
        assert_eq!(payoff(&setup, &rr, 115.0), -4.25);
    }

    #[test]
    fn test_price_grid() {
        let grid = price_grid(100.0, 0.10, 100);
        assert_eq!(grid.len(), 100);
        assert!((grid[0] - 90.0).abs() < 1e-12);
        assert!((grid[99] - 110.0).abs() < 1e-12);
        assert!(grid.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(price_grid(100.0, 0.1, 1), vec![100.0]);
        assert!(price_grid(100.0, 0.1, 0).is_empty());
    }

    #[test]
    fn test_curve_reaches_both_extremes() {
        let setup = StrategySetup::BullCallSpread {
            buy_strike: 99.0,
            sell_strike: 102.0,
        };
        let rr = rr(2.4, 0.6);
        let curve = payoff_curve(&setup, &rr, 100.0, 0.10, 100);
        assert_eq!(curve.first().unwrap().profit_loss, -0.6);
        assert_eq!(curve.last().unwrap().profit_loss, 2.4);
    }
}
