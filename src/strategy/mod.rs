//! Strategy Selector
//!
//! Builds one options spread per expiry horizon from the fused verdict:
//! - Bearish label: Bear Put Spread
//! - otherwise: Bull Call Spread
//! - `RegimeAware` mode only: Neutral label in High volatility gives an Iron Condor
//!
//! Strikes are fixed multiples of the last close, profit/loss are heuristic
//! splits of the strike gap. Every setup is validated before it is returned;
//! a horizon whose setup fails validation is dropped and reported.

pub mod payoff;
pub mod setup;

pub use payoff::{payoff, payoff_curve, price_grid, PayoffPoint};
pub use setup::StrategySetup;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::fusion::FusedVerdict;
use crate::types::{FusedLabel, VolatilityRegime};

/// How the selector maps a verdict to a strategy family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    /// Bearish => Bear Put, anything else => Bull Call
    Directional,
    /// Directional, except Neutral + High volatility => Iron Condor
    RegimeAware,
}

impl Default for SelectionMode {
    fn default() -> Self {
        SelectionMode::Directional
    }
}

/// Strategy selector configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    /// Days to expiry, one recommendation each
    pub horizons_days: Vec<u32>,
    pub mode: SelectionMode,

    /// Bear put long-strike multiplier (Strong / other)
    pub bear_strong_multiplier: f64,
    pub bear_moderate_multiplier: f64,
    /// Bull call long-strike multiplier (Strong / other)
    pub bull_strong_multiplier: f64,
    pub bull_moderate_multiplier: f64,
    /// Strike gap as a fraction of price in High volatility
    pub high_vol_width: f64,
    /// Strike gap as a fraction of price otherwise
    pub base_width: f64,
    /// Bear put long strike must stay below price * this
    pub bear_put_upper_bound: f64,

    /// Two-leg spreads: share of the strike gap counted as max profit / loss
    pub spread_profit_share: f64,
    pub spread_loss_share: f64,
    /// Iron condor: share of the narrower wing as profit, wider wing as loss
    pub condor_profit_share: f64,
    pub condor_loss_share: f64,
    /// Short strikes at price * (1 ± offset)
    pub condor_short_offset: f64,

    /// Probability-of-profit lower bound before adjustments (percent)
    pub pop_base: f64,
    /// |sentiment| above this counts as elevated
    pub pop_sentiment_threshold: f64,
    /// Applied only for elevated sentiment together with a Strong label
    pub pop_full_boost: f64,
    pub pop_high_vol_penalty: f64,
    pub pop_band_width: f64,

    /// Payoff grid spans price * (1 ± range)
    pub payoff_range_pct: f64,
    pub payoff_points: usize,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            horizons_days: vec![7, 14, 21, 28],
            mode: SelectionMode::Directional,
            bear_strong_multiplier: 1.02,
            bear_moderate_multiplier: 1.01,
            bull_strong_multiplier: 0.98,
            bull_moderate_multiplier: 0.99,
            high_vol_width: 0.05,
            base_width: 0.03,
            bear_put_upper_bound: 1.05,
            spread_profit_share: 0.8,
            spread_loss_share: 0.2,
            condor_profit_share: 0.15,
            condor_loss_share: 0.85,
            condor_short_offset: 0.02,
            pop_base: 50.0,
            pop_sentiment_threshold: 0.5,
            pop_full_boost: 10.0,
            pop_high_vol_penalty: 5.0,
            pop_band_width: 10.0,
            payoff_range_pct: 0.10,
            payoff_points: 100,
        }
    }
}

impl StrategyConfig {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.horizons_days.is_empty() || self.horizons_days.contains(&0) {
            return Err(AnalysisError::InvalidConfig(
                "strategy.horizons_days must be non-empty and > 0".to_string(),
            ));
        }
        if self.high_vol_width <= 0.0 || self.base_width <= 0.0 || self.condor_short_offset <= 0.0 {
            return Err(AnalysisError::InvalidConfig(
                "strategy widths and condor offset must be > 0".to_string(),
            ));
        }
        let shares = [
            self.spread_profit_share,
            self.spread_loss_share,
            self.condor_profit_share,
            self.condor_loss_share,
        ];
        if shares.iter().any(|s| !(0.0..=1.0).contains(s)) {
            return Err(AnalysisError::InvalidConfig(
                "strategy profit/loss shares must be in [0, 1]".to_string(),
            ));
        }
        // two-leg payoff ramps from -max_loss to max_profit across the strike gap
        let spread_sum = self.spread_profit_share + self.spread_loss_share;
        if (spread_sum - 1.0).abs() > 1e-9 {
            return Err(AnalysisError::InvalidConfig(format!(
                "strategy spread profit/loss shares must sum to 1, got {}",
                spread_sum
            )));
        }
        if self.pop_band_width < 0.0 || self.pop_band_width > 100.0 {
            return Err(AnalysisError::InvalidConfig(
                "strategy.pop_band_width must be in [0, 100]".to_string(),
            ));
        }
        if self.payoff_points < 2 || self.payoff_range_pct <= 0.0 || self.payoff_range_pct >= 1.0 {
            return Err(AnalysisError::InvalidConfig(
                "payoff grid needs >= 2 points and a range in (0, 1)".to_string(),
            ));
        }
        Ok(())
    }
}

/// Heuristic probability-of-profit band, percent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityBand {
    pub low: f64,
    pub high: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskReward {
    pub max_profit: f64,
    pub max_loss: f64,
    pub probability_of_profit: ProbabilityBand,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyRecommendation {
    pub expiry_date: NaiveDate,
    pub days_to_expiry: u32,
    pub setup: StrategySetup,
    pub risk_reward: RiskReward,
    pub rationale: String,
    pub sentiment_context: String,
    pub breakevens: Vec<f64>,
    pub payoff_curve: Vec<PayoffPoint>,
}

impl StrategyRecommendation {
    pub fn strategy_name(&self) -> &'static str {
        self.setup.name()
    }
}

/// A horizon whose setup failed validation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DroppedHorizon {
    pub days_to_expiry: u32,
    pub expiry_date: NaiveDate,
    pub strategy: &'static str,
    pub reason: String,
}

/// Recommendations ordered by expiry, plus the horizons that were dropped
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyMenu {
    pub recommendations: Vec<StrategyRecommendation>,
    pub dropped: Vec<DroppedHorizon>,
}

impl StrategyMenu {
    pub fn is_empty(&self) -> bool {
        self.recommendations.is_empty()
    }

    /// Some horizons produced, some dropped
    pub fn is_partial(&self) -> bool {
        !self.recommendations.is_empty() && !self.dropped.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct StrategySelector {
    config: StrategyConfig,
}

impl StrategySelector {
    pub fn new(config: StrategyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    /// Strike gap as a fraction of price
    pub fn spread_width(&self, regime: VolatilityRegime) -> f64 {
        if regime == VolatilityRegime::High {
            self.config.high_vol_width
        } else {
            self.config.base_width
        }
    }

    /// Candidate setup for a verdict; not yet validated
    pub fn build_setup(&self, price: f64, label: FusedLabel, regime: VolatilityRegime) -> StrategySetup {
        let c = &self.config;
        let width = self.spread_width(regime);

        if c.mode == SelectionMode::RegimeAware
            && label == FusedLabel::Neutral
            && regime == VolatilityRegime::High
        {
            let offset = c.condor_short_offset;
            return StrategySetup::IronCondor {
                buy_put: price * (1.0 - offset - width),
                sell_put: price * (1.0 - offset),
                sell_call: price * (1.0 + offset),
                buy_call: price * (1.0 + offset + width),
            };
        }

        if label.is_bearish() {
            let multiplier = if label.is_strong() {
                c.bear_strong_multiplier
            } else {
                c.bear_moderate_multiplier
            };
            StrategySetup::BearPutSpread {
                buy_strike: price * multiplier,
                sell_strike: price * (multiplier - width),
            }
        } else {
            let multiplier = if label.is_strong() {
                c.bull_strong_multiplier
            } else {
                c.bull_moderate_multiplier
            };
            StrategySetup::BullCallSpread {
                buy_strike: price * multiplier,
                sell_strike: price * (multiplier + width),
            }
        }
    }

    pub fn probability_band(
        &self,
        label: FusedLabel,
        regime: VolatilityRegime,
        sentiment_score: f64,
    ) -> ProbabilityBand {
        let c = &self.config;
        let elevated = sentiment_score.abs() > c.pop_sentiment_threshold;
        let strong = label.is_strong();

        let mut low = c.pop_base;
        if elevated && strong {
            low += c.pop_full_boost;
        }
        if regime == VolatilityRegime::High {
            low -= c.pop_high_vol_penalty;
        }
        let low = low.clamp(0.0, 100.0 - c.pop_band_width);

        ProbabilityBand {
            low,
            high: low + c.pop_band_width,
        }
    }

    pub fn risk_reward(&self, setup: &StrategySetup, probability_of_profit: ProbabilityBand) -> RiskReward {
        let c = &self.config;
        let (max_profit, max_loss) = match setup.wing_widths() {
            Some((put, call)) => (put.min(call) * c.condor_profit_share, put.max(call) * c.condor_loss_share),
            None => {
                let width = setup.spread_width();
                (width * c.spread_profit_share, width * c.spread_loss_share)
            }
        };
        RiskReward {
            max_profit,
            max_loss,
            probability_of_profit,
        }
    }

    /// One recommendation per configured horizon, ordered by expiry
    pub fn recommend(
        &self,
        price: f64,
        verdict: &FusedVerdict,
        sentiment_score: f64,
        as_of: NaiveDate,
    ) -> StrategyMenu {
        let mut horizons = self.config.horizons_days.clone();
        horizons.sort_unstable();
        horizons.dedup();

        let label = verdict.label;
        let regime = verdict.regime;
        let setup = self.build_setup(price, label, regime);
        let band = self.probability_band(label, regime, sentiment_score);
        let sentiment_context = sentiment_context(sentiment_score);

        let mut menu = StrategyMenu {
            recommendations: Vec::with_capacity(horizons.len()),
            dropped: Vec::new(),
        };

        for days in horizons {
            let expiry_date = as_of + Duration::days(i64::from(days));

            if let Err(err) = setup.validate(price, self.config.bear_put_upper_bound) {
                tracing::warn!(
                    horizon_days = days,
                    strategy = setup.name(),
                    error = %err,
                    "Dropping horizon with invalid strategy geometry"
                );
                menu.dropped.push(DroppedHorizon {
                    days_to_expiry: days,
                    expiry_date,
                    strategy: setup.name(),
                    reason: err.to_string(),
                });
                continue;
            }

            let risk_reward = self.risk_reward(&setup, band);
            let breakevens = setup.breakevens(risk_reward.max_profit, risk_reward.max_loss);
            let payoff_curve = payoff_curve(
                &setup,
                &risk_reward,
                price,
                self.config.payoff_range_pct,
                self.config.payoff_points,
            );

            menu.recommendations.push(StrategyRecommendation {
                expiry_date,
                days_to_expiry: days,
                setup,
                risk_reward,
                rationale: format!(
                    "{} outlook, {} regime: {} ({}-day expiry)",
                    label, regime, setup, days
                ),
                sentiment_context: sentiment_context.clone(),
                breakevens,
                payoff_curve,
            });
        }

        tracing::debug!(
            strategy = setup.name(),
            label = %label,
            produced = menu.recommendations.len(),
            dropped = menu.dropped.len(),
            "Strategy menu built"
        );

        menu
    }
}

fn sentiment_context(score: f64) -> String {
    let tone = if score > 0.0 {
        "positive"
    } else if score < 0.0 {
        "negative"
    } else {
        "neutral"
    };
    format!("News sentiment {} ({:+.2})", tone, score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fusion::{FusionComponents, FusionWeights};

    fn verdict(label: FusedLabel, regime: VolatilityRegime) -> FusedVerdict {
        FusedVerdict {
            label,
            score: 0.0,
            weights: FusionWeights::default(),
            components: FusionComponents {
                technical: 0.0,
                sentiment: 0.0,
                volatility: 0.0,
            },
            regime,
        }
    }

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(StrategyConfig::default().validate().is_ok());
    }

    #[test]
    fn test_moderate_bullish_bull_call() {
        let selector = StrategySelector::default();
        let menu = selector.recommend(
            110.0,
            &verdict(FusedLabel::ModeratelyBullish, VolatilityRegime::Normal),
            0.1,
            as_of(),
        );
        assert_eq!(menu.recommendations.len(), 4);
        assert!(menu.dropped.is_empty());
        for rec in &menu.recommendations {
            match rec.setup {
                StrategySetup::BullCallSpread {
                    buy_strike,
                    sell_strike,
                } => {
                    assert!((buy_strike - 108.9).abs() < 1e-9);
                    assert!((sell_strike - 112.2).abs() < 1e-9);
                }
                other => panic!("unexpected setup {:?}", other),
            }
        }
        let days: Vec<u32> = menu.recommendations.iter().map(|r| r.days_to_expiry).collect();
        assert_eq!(days, vec![7, 14, 21, 28]);
        assert_eq!(
            menu.recommendations[0].expiry_date,
            NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
        );
    }

    #[test]
    fn test_strong_bearish_high_vol_bear_put() {
        let selector = StrategySelector::default();
        let setup = selector.build_setup(100.0, FusedLabel::StrongBearish, VolatilityRegime::High);
        match setup {
            StrategySetup::BearPutSpread {
                buy_strike,
                sell_strike,
            } => {
                assert!((buy_strike - 102.0).abs() < 1e-9);
                assert!((sell_strike - 97.0).abs() < 1e-9);
            }
            other => panic!("unexpected setup {:?}", other),
        }
        let band = selector.probability_band(FusedLabel::StrongBearish, VolatilityRegime::High, -0.2);
        let rr = selector.risk_reward(&setup, band);
        assert!((rr.max_profit - 4.0).abs() < 1e-9);
        assert!((rr.max_loss - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_neutral_is_bull_call_in_directional_mode() {
        let selector = StrategySelector::default();
        let setup = selector.build_setup(100.0, FusedLabel::Neutral, VolatilityRegime::High);
        assert!(matches!(setup, StrategySetup::BullCallSpread { .. }));
    }

    #[test]
    fn test_regime_aware_condor() {
        let selector = StrategySelector::new(StrategyConfig {
            mode: SelectionMode::RegimeAware,
            ..StrategyConfig::default()
        });
        let menu = selector.recommend(
            100.0,
            &verdict(FusedLabel::Neutral, VolatilityRegime::High),
            0.0,
            as_of(),
        );
        assert_eq!(menu.recommendations.len(), 4);
        let rec = &menu.recommendations[0];
        let (put, call) = rec.setup.wing_widths().unwrap();
        assert!((put - 5.0).abs() < 1e-9);
        assert!((call - 5.0).abs() < 1e-9);
        assert!((rec.risk_reward.max_profit - 0.75).abs() < 1e-9);
        assert!((rec.risk_reward.max_loss - 4.25).abs() < 1e-9);
        assert_eq!(rec.breakevens.len(), 2);

        // directional labels still get spreads
        let setup = selector.build_setup(100.0, FusedLabel::StrongBullish, VolatilityRegime::High);
        assert!(matches!(setup, StrategySetup::BullCallSpread { .. }));
    }

    #[test]
    fn test_probability_band() {
        let selector = StrategySelector::default();
        let band = selector.probability_band(FusedLabel::Neutral, VolatilityRegime::Normal, 0.1);
        assert_eq!(band, ProbabilityBand { low: 50.0, high: 60.0 });

        let band = selector.probability_band(FusedLabel::StrongBullish, VolatilityRegime::Normal, 0.7);
        assert_eq!(band, ProbabilityBand { low: 60.0, high: 70.0 });

        // one condition alone leaves the base band
        let band = selector.probability_band(FusedLabel::StrongBullish, VolatilityRegime::Normal, 0.0);
        assert_eq!(band, ProbabilityBand { low: 50.0, high: 60.0 });

        let band = selector.probability_band(FusedLabel::Neutral, VolatilityRegime::Normal, 0.9);
        assert_eq!(band, ProbabilityBand { low: 50.0, high: 60.0 });

        let band = selector.probability_band(FusedLabel::StrongBearish, VolatilityRegime::High, -0.8);
        assert_eq!(band, ProbabilityBand { low: 55.0, high: 65.0 });

        let band = selector.probability_band(FusedLabel::ModeratelyBearish, VolatilityRegime::High, 0.1);
        assert_eq!(band, ProbabilityBand { low: 45.0, high: 55.0 });
    }

    #[test]
    fn test_spread_shares_must_sum_to_one() {
        let config = StrategyConfig {
            spread_profit_share: 0.5,
            spread_loss_share: 0.2,
            ..StrategyConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("sum to 1"));

        let config = StrategyConfig {
            spread_profit_share: 0.7,
            spread_loss_share: 0.3,
            ..StrategyConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_two_leg_payoff_has_no_jump_at_sell_strike() {
        let config = StrategyConfig {
            spread_profit_share: 0.7,
            spread_loss_share: 0.3,
            ..StrategyConfig::default()
        };
        config.validate().unwrap();
        let selector = StrategySelector::new(config);
        let setup = selector.build_setup(100.0, FusedLabel::StrongBullish, VolatilityRegime::Normal);
        let rr = selector.risk_reward(&setup, ProbabilityBand { low: 50.0, high: 60.0 });
        let StrategySetup::BullCallSpread { sell_strike, .. } = setup else {
            panic!("expected a bull call spread");
        };
        let left = payoff(&setup, &rr, sell_strike - 1e-9);
        let at = payoff(&setup, &rr, sell_strike);
        assert!((left - at).abs() < 1e-6);
    }

    #[test]
    fn test_invalid_geometry_drops_every_horizon() {
        let selector = StrategySelector::default();
        let menu = selector.recommend(
            0.0,
            &verdict(FusedLabel::StrongBullish, VolatilityRegime::Normal),
            0.0,
            as_of(),
        );
        assert!(menu.is_empty());
        assert_eq!(menu.dropped.len(), 4);
        assert_eq!(menu.dropped[0].strategy, "Bull Call Spread");
    }

    #[test]
    fn test_bear_put_bound_drops_horizons() {
        // long strike pushed past price * 1.05
        let selector = StrategySelector::new(StrategyConfig {
            bear_strong_multiplier: 1.06,
            ..StrategyConfig::default()
        });
        let menu = selector.recommend(
            100.0,
            &verdict(FusedLabel::StrongBearish, VolatilityRegime::Normal),
            0.0,
            as_of(),
        );
        assert!(menu.is_empty());
        assert_eq!(menu.dropped.len(), 4);
        assert!(!menu.is_partial());
    }

    #[test]
    fn test_payoff_curve_attached() {
        let selector = StrategySelector::default();
        let menu = selector.recommend(
            100.0,
            &verdict(FusedLabel::StrongBullish, VolatilityRegime::Normal),
            0.0,
            as_of(),
        );
        let rec = &menu.recommendations[0];
        assert_eq!(rec.payoff_curve.len(), 100);
        assert_eq!(rec.payoff_curve[0].profit_loss, -rec.risk_reward.max_loss);
        assert_eq!(
            rec.payoff_curve.last().unwrap().profit_loss,
            rec.risk_reward.max_profit
        );
        assert!(rec.sentiment_context.contains("neutral"));
    }
}
