//! Strategy invariants over seeded random walks

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use tradelens::fusion::FusedVerdict;
    use tradelens::strategy::{
        payoff, payoff_curve, RiskReward, SelectionMode, StrategySelector, StrategySetup,
    };
    use tradelens::{Analyzer, FusedLabel, PipelineConfig, PriceBar, PriceSeries, VolatilityRegime};

    const SEEDS: u64 = 40;

    fn random_walk(seed: u64, bars: usize, daily_vol: f64) -> PriceSeries {
        let mut rng = StdRng::seed_from_u64(seed);
        let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        let mut close: f64 = rng.gen_range(20.0..500.0);
        let mut out = Vec::with_capacity(bars);

        for i in 0..bars {
            let open = close;
            close *= 1.0 + rng.gen_range(-daily_vol..daily_vol);
            let spread = rng.gen_range(0.0..daily_vol);
            out.push(PriceBar {
                date: start + Duration::days(i as i64),
                open,
                high: open.max(close) * (1.0 + spread),
                low: open.min(close) * (1.0 - spread),
                close,
                volume: rng.gen_range(1_000.0..50_000.0),
            });
        }
        PriceSeries::new(format!("RW{}", seed), out).unwrap()
    }

    fn analyzer(mode: SelectionMode) -> Analyzer {
        let mut config = PipelineConfig::default();
        config.strategy.mode = mode;
        config.ml.enabled = false;
        Analyzer::new(config).unwrap()
    }

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
    }

    fn verdict(label: FusedLabel, regime: VolatilityRegime) -> FusedVerdict {
        let mut verdict = tradelens::fusion::SignalFusion::default().fuse(
            tradelens::Bias::Bullish,
            0.0,
            regime,
            0.0,
        );
        verdict.label = label;
        verdict
    }

    fn assert_ordering(setup: &StrategySetup, price: f64) {
        match *setup {
            StrategySetup::BullCallSpread {
                buy_strike,
                sell_strike,
            } => assert!(buy_strike < sell_strike, "{}", setup),
            StrategySetup::BearPutSpread {
                buy_strike,
                sell_strike,
            } => {
                assert!(sell_strike < buy_strike, "{}", setup);
                assert!(buy_strike < price * 1.05, "{}", setup);
            }
            StrategySetup::IronCondor {
                buy_put,
                sell_put,
                sell_call,
                buy_call,
            } => {
                assert!(buy_put < sell_put, "{}", setup);
                assert!(sell_put < price && price < sell_call, "{}", setup);
                assert!(sell_call < buy_call, "{}", setup);
            }
        }
    }

    // ============================================================================
    // Random walks through the full pipeline
    // ============================================================================

    #[test]
    fn test_every_returned_setup_satisfies_its_ordering() {
        for mode in [SelectionMode::Directional, SelectionMode::RegimeAware] {
            let analyzer = analyzer(mode);
            for seed in 0..SEEDS {
                let series = random_walk(seed, 300, 0.03);
                let report = analyzer.analyze(&series, &[], as_of()).unwrap();

                for rec in &report.strategies.recommendations {
                    assert_ordering(&rec.setup, report.last_close);
                    assert!(rec.setup.validate(report.last_close, 1.05).is_ok());
                    assert!(rec.risk_reward.max_profit > 0.0);
                    assert!(rec.risk_reward.max_loss > 0.0);
                }
                assert_eq!(
                    report.strategies.recommendations.len() + report.strategies.dropped.len(),
                    4
                );
            }
        }
    }

    #[test]
    fn test_volatility_percentile_stays_in_unit_interval() {
        let analyzer = analyzer(SelectionMode::Directional);
        for seed in 0..SEEDS {
            let daily_vol = 0.005 + (seed % 5) as f64 * 0.01;
            let series = random_walk(seed, 400, daily_vol);
            let report = analyzer.analyze(&series, &[], as_of()).unwrap();

            let profile = &report.volatility;
            if let Some(p) = profile.percentile {
                assert!((0.0..=1.0).contains(&p), "percentile {} for seed {}", p, seed);
            }
            assert!(profile.annualized_volatility >= 0.0);
            assert!(profile.max_drawdown_pct <= profile.current_drawdown_pct + 1e-12);
            assert!(profile.max_drawdown_pct <= 0.0);
            assert!((0.0..=100.0).contains(&report.alignment_confidence));
        }
    }

    #[test]
    fn test_regime_aware_neutral_high_vol_builds_condor() {
        let selector = StrategySelector::new(tradelens::strategy::StrategyConfig {
            mode: SelectionMode::RegimeAware,
            ..Default::default()
        });
        let menu = selector.recommend(
            200.0,
            &verdict(FusedLabel::Neutral, VolatilityRegime::High),
            0.0,
            as_of(),
        );

        assert_eq!(menu.recommendations.len(), 4);
        for rec in &menu.recommendations {
            assert_ordering(&rec.setup, 200.0);
            assert_eq!(rec.breakevens.len(), 2);
            assert!(rec.breakevens[0] < 200.0 && 200.0 < rec.breakevens[1]);
        }
    }

    #[test]
    fn test_directional_mode_never_builds_condor() {
        let selector = StrategySelector::default();
        let menu = selector.recommend(
            200.0,
            &verdict(FusedLabel::Neutral, VolatilityRegime::High),
            0.0,
            as_of(),
        );
        assert!(menu
            .recommendations
            .iter()
            .all(|r| matches!(r.setup, StrategySetup::BullCallSpread { .. })));
    }

    // ============================================================================
    // Payoff
    // ============================================================================

    fn continuity_gap(setup: &StrategySetup, rr: &RiskReward, at: f64) -> f64 {
        let eps = 1e-10 * at;
        (payoff(setup, rr, at - eps) - payoff(setup, rr, at + eps)).abs()
    }

    #[test]
    fn test_payoff_is_continuous_and_bounded_for_every_label() {
        let labels = [
            FusedLabel::StrongBullish,
            FusedLabel::ModeratelyBullish,
            FusedLabel::Neutral,
            FusedLabel::ModeratelyBearish,
            FusedLabel::StrongBearish,
        ];
        let selector = StrategySelector::new(tradelens::strategy::StrategyConfig {
            mode: SelectionMode::RegimeAware,
            ..Default::default()
        });
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..SEEDS {
            let price: f64 = rng.gen_range(10.0..1_000.0);
            for label in labels {
                for regime in [VolatilityRegime::Low, VolatilityRegime::Normal, VolatilityRegime::High] {
                    let menu = selector.recommend(price, &verdict(label, regime), 0.0, as_of());
                    let rec = &menu.recommendations[0];
                    let rr = &rec.risk_reward;

                    for strike in rec.setup.strikes() {
                        assert!(
                            continuity_gap(&rec.setup, rr, strike) < 1e-6,
                            "jump at {} in {}",
                            strike,
                            rec.setup
                        );
                    }

                    let curve = payoff_curve(&rec.setup, rr, price, 0.10, 100);
                    for point in &curve {
                        assert!(point.profit_loss >= -rr.max_loss - 1e-9);
                        assert!(point.profit_loss <= rr.max_profit + 1e-9);
                    }

                    let first = curve[0].profit_loss;
                    let last = curve[curve.len() - 1].profit_loss;
                    match rec.setup {
                        StrategySetup::BullCallSpread { .. } => {
                            assert_eq!(first, -rr.max_loss);
                            assert_eq!(last, rr.max_profit);
                        }
                        StrategySetup::BearPutSpread { .. } => {
                            assert_eq!(first, rr.max_profit);
                            assert_eq!(last, -rr.max_loss);
                        }
                        StrategySetup::IronCondor { .. } => {
                            assert_eq!(first, -rr.max_loss);
                            assert_eq!(last, -rr.max_loss);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_breakevens_have_zero_payoff() {
        let selector = StrategySelector::default();
        for label in [FusedLabel::StrongBullish, FusedLabel::ModeratelyBearish] {
            let menu = selector.recommend(150.0, &verdict(label, VolatilityRegime::Normal), 0.0, as_of());
            let rec = &menu.recommendations[0];
            for &breakeven in &rec.breakevens {
                assert!(payoff(&rec.setup, &rec.risk_reward, breakeven).abs() < 1e-9);
            }
        }
    }
}
