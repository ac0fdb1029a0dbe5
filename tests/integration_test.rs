//! Integration tests across the analytics pipeline.
//!
//! Tests cover:
//! - Single-asset pipeline with a mock price source
//! - The one-period position lag seen end to end
//! - Portfolio composition with partially missing universes
//! - Rebalancing calendars on real dates
//! - Daily report generation into a recording sink

mod common;

use approx::assert_relative_eq;
use common::*;
use quantdash::cli::{run_portfolio_pipeline, run_report_pipeline, run_single_pipeline};
use quantdash::domain::analysis::AnalysisConfig;
use quantdash::domain::daily_report::{DailyReport, ReportBody, ReportConfig};
use quantdash::domain::error::QuantError;
use quantdash::domain::metrics::PerformanceReport;
use quantdash::domain::portfolio::{PortfolioConfig, RebalanceFrequency, Weighting};
use quantdash::domain::signal::Exposure;
use quantdash::domain::strategy::{Momentum, MovingAverageCrossover};
use quantdash::domain::universe::{load_universe, SkipReason};
use quantdash::ports::report_port::ReportSink;
use std::cell::RefCell;
use std::collections::HashMap;

fn analysis_config(start: &str, end: &str) -> AnalysisConfig {
    AnalysisConfig {
        start_date: date(start),
        end_date: date(end),
        risk_free_rate: 0.0,
    }
}

fn tickers(list: &[&str]) -> Vec<String> {
    list.iter().map(|t| t.to_string()).collect()
}

mod single_asset_pipeline {
    use super::*;

    #[test]
    fn flat_prices_keep_crossover_out_of_market() {
        let source = MockPriceSource::new()
            .with_prices("TTE.PA", make_daily_prices("2024-01-01", &[10.0, 10.0, 10.0, 10.0]));

        let analysis = run_single_pipeline(
            &source,
            "TTE.PA",
            &analysis_config("2024-01-01", "2024-02-01"),
            &MovingAverageCrossover::new(2, 3).unwrap(),
            &Momentum::new(1).unwrap(),
        )
        .unwrap();

        assert!(analysis
            .moving_average
            .run
            .signal
            .exposures()
            .iter()
            .all(|e| *e == Exposure::Flat));
        assert_eq!(analysis.moving_average.report.cumulative_return, 0.0);
        assert_eq!(analysis.moving_average.report.sharpe_ratio, None);
    }

    #[test]
    fn momentum_earns_returns_one_day_late() {
        let source = MockPriceSource::new().with_prices(
            "BTC-USD",
            make_daily_prices("2024-01-01", &[100.0, 110.0, 99.0, 105.0]),
        );

        let analysis = run_single_pipeline(
            &source,
            "BTC-USD",
            &analysis_config("2024-01-01", "2024-02-01"),
            &MovingAverageCrossover::new(1, 2).unwrap(),
            &Momentum::new(1).unwrap(),
        )
        .unwrap();

        let run = &analysis.momentum.run;
        assert_eq!(
            run.signal.exposures(),
            vec![Exposure::Flat, Exposure::Long, Exposure::Flat, Exposure::Long]
        );
        assert_eq!(
            run.position.exposures(),
            vec![Exposure::Flat, Exposure::Flat, Exposure::Long, Exposure::Flat]
        );

        let values = run.returns.values();
        assert_eq!(values.len(), 3);
        assert_eq!(values[0], 0.0);
        assert_relative_eq!(values[1], -0.1, epsilon = 1e-12);
        assert_eq!(values[2], 0.0);
        assert_relative_eq!(analysis.momentum.report.cumulative_return, -0.1, epsilon = 1e-12);
    }

    #[test]
    fn buy_and_hold_matches_price_ratio() {
        let points = make_trending_prices("2024-01-01", 90, 50.0);
        let first = points[0].price;
        let last = points[points.len() - 1].price;
        let source = MockPriceSource::new().with_prices("ENGI.PA", points);

        let analysis = run_single_pipeline(
            &source,
            "ENGI.PA",
            &analysis_config("2024-01-01", "2025-01-01"),
            &MovingAverageCrossover::new(5, 20).unwrap(),
            &Momentum::new(10).unwrap(),
        )
        .unwrap();

        assert_relative_eq!(analysis.kpis.buy_and_hold_return, last / first - 1.0, epsilon = 1e-9);
        assert_eq!(analysis.kpis.last_price, last);
        for outcome in analysis.outcomes() {
            assert_eq!(outcome.run.returns.len(), 89);
            assert!(outcome.report.max_drawdown <= 0.0);
        }
    }

    #[test]
    fn date_range_is_applied_before_analysis() {
        let source = MockPriceSource::new().with_prices(
            "AAPL",
            make_daily_prices("2024-01-01", &[100.0, 101.0, 102.0, 103.0, 104.0, 105.0]),
        );

        let analysis = run_single_pipeline(
            &source,
            "AAPL",
            &analysis_config("2024-01-02", "2024-01-05"),
            &MovingAverageCrossover::default(),
            &Momentum::default(),
        )
        .unwrap();

        assert_eq!(analysis.kpis.last_price, 103.0);
        assert_eq!(analysis.returns.len(), 2);
    }

    #[test]
    fn unknown_ticker_is_no_data() {
        let source = MockPriceSource::new();
        let err = run_single_pipeline(
            &source,
            "XYZ",
            &analysis_config("2024-01-01", "2024-02-01"),
            &MovingAverageCrossover::default(),
            &Momentum::default(),
        )
        .unwrap_err();
        assert!(matches!(err, QuantError::NoData { ticker } if ticker == "XYZ"));
    }

    #[test]
    fn source_failure_propagates() {
        let source = MockPriceSource::new().with_error("AAPL", "connection refused");
        let err = run_single_pipeline(
            &source,
            "AAPL",
            &analysis_config("2024-01-01", "2024-02-01"),
            &MovingAverageCrossover::default(),
            &Momentum::default(),
        )
        .unwrap_err();
        assert!(matches!(err, QuantError::DataSource { .. }));
    }
}

mod portfolio_pipeline {
    use super::*;

    fn two_asset_source() -> MockPriceSource {
        MockPriceSource::new()
            .with_prices("AAA", make_daily_prices("2024-01-01", &[100.0, 110.0, 121.0]))
            .with_prices("BBB", make_daily_prices("2024-01-01", &[50.0, 50.0, 50.0]))
    }

    #[test]
    fn equal_weight_two_assets() {
        let config = PortfolioConfig {
            tickers: tickers(&["AAA", "BBB"]),
            weighting: Weighting::Equal,
            rebalance: RebalanceFrequency::Daily,
        };
        let result = run_portfolio_pipeline(
            &two_asset_source(),
            &analysis_config("2024-01-01", "2024-02-01"),
            &config,
        )
        .unwrap();

        assert_eq!(result.target_weights, vec![0.5, 0.5]);
        let values = result.returns.values();
        assert_relative_eq!(values[0], 0.05, epsilon = 1e-12);
        assert_relative_eq!(values[1], 0.05, epsilon = 1e-12);
        assert_relative_eq!(result.nav.current_nav, 110.25, epsilon = 1e-9);
        assert_eq!(result.asset_equity.len(), 2);
    }

    #[test]
    fn skipped_tickers_do_not_shift_custom_weights() {
        let source = two_asset_source()
            .with_prices("ONE", make_daily_prices("2024-01-01", &[10.0]))
            .with_error("BAD", "timeout");

        let weights: HashMap<String, f64> = [
            ("AAA", 30.0),
            ("MISSING", 10.0),
            ("ONE", 20.0),
            ("BAD", 5.0),
            ("BBB", 10.0),
        ]
        .into_iter()
        .map(|(t, w)| (t.to_string(), w))
        .collect();
        let config = PortfolioConfig {
            tickers: tickers(&["AAA", "MISSING", "ONE", "BAD", "BBB"]),
            weighting: Weighting::Custom(weights),
            rebalance: RebalanceFrequency::Daily,
        };

        let result = run_portfolio_pipeline(
            &source,
            &analysis_config("2024-01-01", "2024-02-01"),
            &config,
        )
        .unwrap();

        assert_eq!(result.aligned.tickers, tickers(&["AAA", "BBB"]));
        assert_relative_eq!(result.target_weights[0], 0.75, epsilon = 1e-12);
        assert_relative_eq!(result.target_weights[1], 0.25, epsilon = 1e-12);
    }

    #[test]
    fn universe_reports_skip_reasons() {
        let source = two_asset_source()
            .with_prices("ONE", make_daily_prices("2024-01-01", &[10.0]))
            .with_error("BAD", "timeout");

        let universe = load_universe(
            &source,
            &tickers(&["AAA", "MISSING", "ONE", "BAD"]),
            date("2024-01-01"),
            date("2024-02-01"),
        );

        assert_eq!(universe.assets.len(), 1);
        let reasons: Vec<&SkipReason> = universe.skipped.iter().map(|s| &s.reason).collect();
        assert_eq!(reasons[0], &SkipReason::NoData);
        assert_eq!(reasons[1], &SkipReason::InsufficientPrices { prices: 1 });
        assert!(matches!(reasons[2], SkipReason::SourceError(_)));
    }

    #[test]
    fn single_surviving_asset_is_rejected() {
        let config = PortfolioConfig {
            tickers: tickers(&["AAA", "MISSING"]),
            weighting: Weighting::Equal,
            rebalance: RebalanceFrequency::Daily,
        };
        let err = run_portfolio_pipeline(
            &two_asset_source(),
            &analysis_config("2024-01-01", "2024-02-01"),
            &config,
        )
        .unwrap_err();
        assert!(matches!(err, QuantError::InsufficientAssets { have: 1, need: 2 }));
    }

    #[test]
    fn only_common_dates_survive_alignment() {
        let source = MockPriceSource::new()
            .with_prices("AAA", make_daily_prices("2024-01-01", &[1.0, 2.0, 3.0, 4.0, 5.0]))
            .with_prices("BBB", make_daily_prices("2024-01-03", &[1.0, 1.1, 1.2, 1.3]));
        let config = PortfolioConfig {
            tickers: tickers(&["AAA", "BBB"]),
            weighting: Weighting::Equal,
            rebalance: RebalanceFrequency::Daily,
        };

        let result = run_portfolio_pipeline(
            &source,
            &analysis_config("2024-01-01", "2024-02-01"),
            &config,
        )
        .unwrap();

        assert_eq!(result.aligned.dates, vec![date("2024-01-04"), date("2024-01-05")]);
        assert_eq!(result.returns.len(), 2);
    }

    #[test]
    fn disjoint_histories_have_no_overlap() {
        let source = MockPriceSource::new()
            .with_prices("AAA", make_daily_prices("2024-01-01", &[1.0, 2.0, 3.0]))
            .with_prices("BBB", make_daily_prices("2024-01-10", &[1.0, 1.1, 1.2]));
        let config = PortfolioConfig {
            tickers: tickers(&["AAA", "BBB"]),
            weighting: Weighting::Equal,
            rebalance: RebalanceFrequency::Daily,
        };

        let err = run_portfolio_pipeline(
            &source,
            &analysis_config("2024-01-01", "2024-02-01"),
            &config,
        )
        .unwrap_err();
        assert!(matches!(err, QuantError::NoOverlappingDates));
    }
}

mod rebalancing_calendar {
    use super::*;

    fn source() -> MockPriceSource {
        // 2024-01-29 is a Monday; returns run Tue 01-30 to Mon 02-05.
        let a: Vec<f64> = (0..8).map(|i| 100.0 + i as f64).collect();
        let b: Vec<f64> = (0..8).map(|i| 200.0 - i as f64).collect();
        MockPriceSource::new()
            .with_prices("AAA", make_daily_prices("2024-01-29", &a))
            .with_prices("BBB", make_daily_prices("2024-01-29", &b))
    }

    fn rebalance_dates(freq: RebalanceFrequency) -> Vec<chrono::NaiveDate> {
        let config = PortfolioConfig {
            tickers: tickers(&["AAA", "BBB"]),
            weighting: Weighting::Equal,
            rebalance: freq,
        };
        run_portfolio_pipeline(&source(), &analysis_config("2024-01-01", "2024-03-01"), &config)
            .unwrap()
            .schedule
            .rebalance_dates()
    }

    #[test]
    fn monthly_resets_on_first_day_of_each_month() {
        assert_eq!(
            rebalance_dates(RebalanceFrequency::Monthly),
            vec![date("2024-01-30"), date("2024-02-01")]
        );
    }

    #[test]
    fn weekly_resets_on_new_week() {
        assert_eq!(
            rebalance_dates(RebalanceFrequency::Weekly),
            vec![date("2024-01-30"), date("2024-02-05")]
        );
    }

    #[test]
    fn daily_resets_every_day() {
        assert_eq!(rebalance_dates(RebalanceFrequency::Daily).len(), 7);
    }
}

struct RecordingSink {
    reports: RefCell<Vec<DailyReport>>,
}

impl ReportSink for RecordingSink {
    fn append(&self, report: &DailyReport) -> Result<(), QuantError> {
        self.reports.borrow_mut().push(report.clone());
        Ok(())
    }
}

mod daily_report {
    use super::*;

    fn sink() -> RecordingSink {
        RecordingSink {
            reports: RefCell::new(Vec::new()),
        }
    }

    #[test]
    fn report_uses_trailing_window() {
        let prices: Vec<f64> = (0..12).map(|i| 7000.0 + 10.0 * i as f64).collect();
        let source =
            MockPriceSource::new().with_prices("^FCHI", make_daily_prices("2024-01-01", &prices));
        let sink = sink();
        let config = ReportConfig {
            ticker: "^FCHI".to_string(),
            lookback_days: 5,
        };

        let report = run_report_pipeline(&source, &sink, &config, date("2024-01-10"), 0.0).unwrap();

        match &report.body {
            ReportBody::Metrics {
                last_price,
                observations,
                ..
            } => {
                assert_eq!(*last_price, 7080.0);
                assert_eq!(*observations, 4);
            }
            ReportBody::NoData => panic!("expected metrics"),
        }
        assert_eq!(sink.reports.borrow().len(), 1);
    }

    #[test]
    fn out_of_range_lookback_is_rejected_before_fetching() {
        let source = MockPriceSource::new()
            .with_prices("^FCHI", make_daily_prices("2024-01-01", &[7000.0, 7010.0]));
        let sink = sink();
        let config = ReportConfig {
            ticker: "^FCHI".to_string(),
            lookback_days: 100_000_000,
        };

        let err = run_report_pipeline(&source, &sink, &config, date("2024-06-01"), 0.0).unwrap_err();

        assert!(matches!(err, QuantError::ConfigInvalid { key, .. } if key == "lookback_days"));
        assert!(sink.reports.borrow().is_empty());
    }

    #[test]
    fn missing_data_is_still_recorded() {
        let source = MockPriceSource::new();
        let sink = sink();

        let report = run_report_pipeline(
            &source,
            &sink,
            &ReportConfig::default(),
            date("2024-06-28"),
            0.0,
        )
        .unwrap();

        assert!(!report.has_data());
        assert_eq!(report.ticker, "^FCHI");
        assert_eq!(sink.reports.borrow()[0].body, ReportBody::NoData);
    }
}

#[test]
fn metrics_are_deterministic() {
    let points = make_trending_prices("2024-01-01", 120, 30.0);
    let source = MockPriceSource::new().with_prices("MSFT", points);
    let config = analysis_config("2024-01-01", "2025-01-01");

    let first = run_single_pipeline(
        &source,
        "MSFT",
        &config,
        &MovingAverageCrossover::default(),
        &Momentum::default(),
    )
    .unwrap();
    let second = run_single_pipeline(
        &source,
        "MSFT",
        &config,
        &MovingAverageCrossover::default(),
        &Momentum::default(),
    )
    .unwrap();

    let a: Vec<PerformanceReport> = first.outcomes().iter().map(|o| o.report).collect();
    let b: Vec<PerformanceReport> = second.outcomes().iter().map(|o| o.report).collect();
    assert_eq!(a, b);
}
