//! End-to-end pipeline scenarios

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate, TimeZone, Utc};
    use tradelens::features::{rsi_series, RsiSmoothing};
    use tradelens::fusion::SignalFusion;
    use tradelens::sentiment::{SentimentAggregator, SentimentSample};
    use tradelens::strategy::{StrategySelector, StrategySetup};
    use tradelens::volatility::VolatilityClassifier;
    use tradelens::{Analyzer, Bias, FusedLabel, PriceBar, PriceSeries, TextItem, VolatilityRegime};

    fn series_from_closes(symbol: &str, closes: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PriceBar {
                date: start + Duration::days(i as i64),
                open: close,
                high: close * 1.005,
                low: close * 0.995,
                close,
                volume: 1_000_000.0,
            })
            .collect();
        PriceSeries::new(symbol, bars).unwrap()
    }

    fn rising_100_to_110() -> Vec<f64> {
        (0..20).map(|i| 100.0 + 10.0 * i as f64 / 19.0).collect()
    }

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 22).unwrap()
    }

    // ============================================================================
    // Rising series
    // ============================================================================

    #[test]
    fn test_rising_series_selects_bull_call_for_every_horizon() {
        let series = series_from_closes("IWM", &rising_100_to_110());
        let report = Analyzer::default().analyze(&series, &[], as_of()).unwrap();

        assert_eq!(report.technical.technical_sentiment, Bias::Bullish);
        assert!((report.last_close - 110.0).abs() < 1e-9);
        assert_eq!(report.strategies.recommendations.len(), 4);
        assert!(report.strategies.dropped.is_empty());

        let days: Vec<u32> = report
            .strategies
            .recommendations
            .iter()
            .map(|r| r.days_to_expiry)
            .collect();
        assert_eq!(days, vec![7, 14, 21, 28]);

        for rec in &report.strategies.recommendations {
            match rec.setup {
                StrategySetup::BullCallSpread {
                    buy_strike,
                    sell_strike,
                } => {
                    assert!(sell_strike > buy_strike);
                    assert!(buy_strike < report.last_close);
                }
                other => panic!("expected a bull call spread, got {}", other),
            }
            assert_eq!(rec.expiry_date, as_of() + Duration::days(i64::from(rec.days_to_expiry)));
        }
    }

    #[test]
    fn test_rising_series_without_news_is_strong_bullish() {
        let series = series_from_closes("IWM", &rising_100_to_110());
        let report = Analyzer::default().analyze(&series, &[], as_of()).unwrap();

        // technical +1 at weight 0.4, no sentiment, no rolling history
        assert_eq!(report.volatility.regime, VolatilityRegime::Normal);
        assert!((report.verdict.score - 0.4).abs() < 1e-12);
        assert_eq!(report.verdict.label, FusedLabel::StrongBullish);

        match report.strategies.recommendations[0].setup {
            StrategySetup::BullCallSpread { buy_strike, .. } => {
                assert!((buy_strike - 107.8).abs() < 1e-9);
            }
            other => panic!("unexpected setup {}", other),
        }
    }

    #[test]
    fn test_moderately_bullish_verdict_buys_the_99_percent_call() {
        let series = series_from_closes("IWM", &rising_100_to_110());
        let technical = Analyzer::default()
            .analyze(&series, &[], as_of())
            .unwrap()
            .technical;

        // mildly negative news pulls the fused score into the moderate band
        let verdict = SignalFusion::default().fuse(
            technical.technical_sentiment,
            -0.5,
            VolatilityRegime::Normal,
            0.0,
        );
        assert_eq!(verdict.label, FusedLabel::ModeratelyBullish);

        let menu = StrategySelector::default().recommend(110.0, &verdict, -0.5, as_of());
        assert_eq!(menu.recommendations.len(), 4);
        for rec in &menu.recommendations {
            match rec.setup {
                StrategySetup::BullCallSpread {
                    buy_strike,
                    sell_strike,
                } => {
                    assert!((buy_strike - 108.9).abs() < 1e-9);
                    assert!(sell_strike > buy_strike);
                }
                other => panic!("unexpected setup {}", other),
            }
        }
    }

    #[test]
    fn test_constant_gains_drive_rsi_to_100() {
        let closes: Vec<f64> = (0..40).map(|i| 50.0 + i as f64).collect();
        for smoothing in [RsiSmoothing::Simple, RsiSmoothing::Wilder] {
            let rsi = rsi_series(&closes, 14, smoothing);
            assert!(rsi[..14].iter().all(Option::is_none));
            assert!(rsi[14..].iter().all(|v| *v == Some(100.0)));
        }
    }

    // ============================================================================
    // Sentiment
    // ============================================================================

    #[test]
    fn test_five_positive_items_average_point_seven() {
        let base = Utc.with_ymd_and_hms(2024, 1, 20, 9, 0, 0).unwrap();
        let samples = [0.8, 0.6, 0.5, 0.7, 0.9]
            .iter()
            .enumerate()
            .map(|(i, &polarity)| SentimentSample {
                timestamp: base + Duration::hours(i as i64),
                polarity,
                source_text: format!("headline {}", i),
            })
            .collect();

        let summary = SentimentAggregator::default().summarize(samples);
        assert!((summary.average_score - 0.7).abs() < 1e-9);
        assert_eq!(summary.positive_count, 5);
        assert_eq!(summary.negative_count, 0);
        assert_eq!(summary.total_count, 5);
        assert_eq!(summary.recent[0].source_text, "headline 4");
        assert_eq!(summary.daily.len(), 1);
    }

    #[test]
    fn test_empty_stream_scores_exactly_zero() {
        let summary = SentimentAggregator::default().aggregate(&[]);
        assert_eq!(summary.average_score, 0.0);
        assert!(summary.is_empty());
    }

    #[test]
    fn test_news_feeds_the_report() {
        let series = series_from_closes("SPY", &rising_100_to_110());
        let texts = vec![
            TextItem {
                timestamp: Utc.with_ymd_and_hms(2024, 1, 21, 14, 0, 0).unwrap(),
                text: "Stocks rally as earnings beat expectations".to_string(),
            },
            TextItem {
                timestamp: Utc.with_ymd_and_hms(2024, 1, 21, 15, 0, 0).unwrap(),
                text: "Analysts see strong growth ahead".to_string(),
            },
        ];
        let report = Analyzer::default().analyze(&series, &texts, as_of()).unwrap();

        assert_eq!(report.sentiment.total_count, 2);
        assert!(report.sentiment.average_score > 0.0);
        assert!(report.strategies.recommendations[0]
            .sentiment_context
            .contains("positive"));
    }

    // ============================================================================
    // Flat series
    // ============================================================================

    #[test]
    fn test_flat_series_has_zero_volatility_and_normal_regime() {
        let series = series_from_closes("DIA", &[100.0; 60]);
        let profile = VolatilityClassifier::default().analyze(&series).unwrap();

        assert_eq!(profile.annualized_volatility, 0.0);
        assert_eq!(profile.regime, VolatilityRegime::Normal);
        assert_eq!(profile.percentile, None);
        assert_eq!(profile.black_swan_reference_ratio, 0.0);
        assert_eq!(profile.current_drawdown_pct, 0.0);
        assert_eq!(profile.max_drawdown_pct, 0.0);
    }

    #[test]
    fn test_flat_series_report_completes() {
        let series = series_from_closes("DIA", &[100.0; 60]);
        let report = Analyzer::default().analyze(&series, &[], as_of()).unwrap();

        assert_eq!(report.volatility.regime, VolatilityRegime::Normal);
        // price equal to every average counts as bearish
        assert_eq!(report.technical.technical_sentiment, Bias::Bearish);
        assert_eq!(report.strategies.recommendations.len(), 4);
        for rec in &report.strategies.recommendations {
            assert!(matches!(rec.setup, StrategySetup::BearPutSpread { .. }));
        }
    }

    // ============================================================================
    // Insufficient data
    // ============================================================================

    #[test]
    fn test_short_series_is_insufficient_not_defaulted() {
        let series = series_from_closes("QQQ", &[100.0, 101.0]);
        let err = Analyzer::default().analyze(&series, &[], as_of()).unwrap_err();
        assert!(err.is_insufficient_data());
    }

    #[test]
    fn test_report_serializes_with_readable_labels() {
        let series = series_from_closes("IWM", &rising_100_to_110());
        let report = Analyzer::default().analyze(&series, &[], as_of()).unwrap();
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["verdict"]["label"], "Strong Bullish");
        assert_eq!(json["volatility"]["regime"], "Normal");
        assert_eq!(json["strategies"]["recommendations"][0]["setup"]["type"], "bull_call_spread");
        assert!(json["price_range"].is_null());
    }
}
