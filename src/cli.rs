//! CLI definition and dispatch.

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvPriceSource;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::text_report_adapter::{TextReportSink, DEFAULT_LOG_PATH};
use crate::domain::analysis::{analyze_single_asset, AnalysisConfig, SingleAssetAnalysis};
use crate::domain::config_validation::{
    parse_weights, validate_analysis_config, validate_portfolio_config, validate_report_config,
    validate_strategy_config,
};
use crate::domain::daily_report::{
    report_window, DailyReport, ReportConfig, DEFAULT_LOOKBACK_DAYS, DEFAULT_REPORT_TICKER,
    MAX_LOOKBACK_DAYS,
};
use crate::domain::error::QuantError;
use crate::domain::metrics::PerformanceReport;
use crate::domain::portfolio::{
    compose_portfolio, PortfolioConfig, PortfolioResult, RebalanceFrequency, Weighting,
};
use crate::domain::strategy::{
    Momentum, MovingAverageCrossover, DEFAULT_LONG_WINDOW, DEFAULT_MOMENTUM_LOOKBACK,
    DEFAULT_SHORT_WINDOW,
};
use crate::domain::universe::{load_universe, parse_tickers, require_prices};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::PriceSource;
use crate::ports::report_port::ReportSink;

#[derive(Parser, Debug)]
#[command(name = "quantdash", about = "Return, strategy and portfolio analytics")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compare Buy & Hold, MA crossover and momentum on one ticker
    Single {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        ticker: Option<String>,
    },
    /// Combine several tickers into a weighted portfolio
    Portfolio {
        #[arg(short, long)]
        config: PathBuf,
        /// Comma-separated tickers, replacing [portfolio] tickers
        #[arg(long)]
        tickers: Option<String>,
        #[arg(long)]
        rebalance: Option<String>,
    },
    /// Append a daily report for one ticker to the report log
    Report {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        ticker: Option<String>,
        /// Report date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        as_of: Option<NaiveDate>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Single { config, ticker } => run_single(&config, ticker.as_deref()),
        Command::Portfolio {
            config,
            tickers,
            rebalance,
        } => run_portfolio(&config, tickers.as_deref(), rebalance.as_deref()),
        Command::Report {
            config,
            ticker,
            as_of,
        } => run_report(&config, ticker.as_deref(), as_of),
        Command::Validate { config } => run_validate(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, QuantError> {
    tracing::info!(path = %path.display(), "loading config");
    FileConfigAdapter::from_file(path)
}

fn to_usize(section: &str, key: &str, value: i64) -> Result<usize, QuantError> {
    usize::try_from(value).map_err(|_| QuantError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: format!("{} must not be negative", value),
    })
}

pub fn build_analysis_config(config: &dyn ConfigPort) -> Result<AnalysisConfig, QuantError> {
    Ok(AnalysisConfig {
        start_date: config.get_date("analysis", "start_date")?,
        end_date: config.get_date("analysis", "end_date")?,
        risk_free_rate: config.get_double("analysis", "risk_free_rate", 0.0)?,
    })
}

pub fn build_strategies(
    config: &dyn ConfigPort,
) -> Result<(MovingAverageCrossover, Momentum), QuantError> {
    let short = config.get_int("strategy", "short_window", DEFAULT_SHORT_WINDOW as i64)?;
    let long = config.get_int("strategy", "long_window", DEFAULT_LONG_WINDOW as i64)?;
    let lookback = config.get_int(
        "strategy",
        "momentum_lookback",
        DEFAULT_MOMENTUM_LOOKBACK as i64,
    )?;

    let moving_average = MovingAverageCrossover::new(
        to_usize("strategy", "short_window", short)?,
        to_usize("strategy", "long_window", long)?,
    )?;
    let momentum = Momentum::new(to_usize("strategy", "momentum_lookback", lookback)?)?;
    Ok((moving_average, momentum))
}

/// Ticker from the override, then `[section] ticker`, then the default.
pub fn resolve_ticker(ticker_override: Option<&str>, config: &dyn ConfigPort, section: &str) -> String {
    ticker_override
        .map(str::to_string)
        .or_else(|| config.get_string(section, "ticker"))
        .map(|t| t.trim().to_uppercase())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| DEFAULT_REPORT_TICKER.to_string())
}

pub fn build_portfolio_config(config: &dyn ConfigPort) -> Result<PortfolioConfig, QuantError> {
    let raw = config
        .get_string("portfolio", "tickers")
        .ok_or_else(|| QuantError::ConfigMissing {
            section: "portfolio".to_string(),
            key: "tickers".to_string(),
        })?;
    let tickers = parse_tickers(&raw)?;

    let weighting = match config
        .get_string("portfolio", "weights")
        .filter(|s| !s.trim().is_empty())
    {
        Some(raw) => {
            let weights = parse_weights(&raw).map_err(|reason| QuantError::ConfigInvalid {
                section: "portfolio".to_string(),
                key: "weights".to_string(),
                reason,
            })?;
            if weights.len() != tickers.len() {
                return Err(QuantError::ConfigInvalid {
                    section: "portfolio".to_string(),
                    key: "weights".to_string(),
                    reason: format!(
                        "{} weights given for {} tickers",
                        weights.len(),
                        tickers.len()
                    ),
                });
            }
            let by_ticker: HashMap<String, f64> =
                tickers.iter().cloned().zip(weights).collect();
            Weighting::Custom(by_ticker)
        }
        None => Weighting::Equal,
    };

    let rebalance = match config.get_string("portfolio", "rebalance") {
        Some(raw) => raw.parse::<RebalanceFrequency>()?,
        None => RebalanceFrequency::default(),
    };

    Ok(PortfolioConfig {
        tickers,
        weighting,
        rebalance,
    })
}

pub fn build_report_config(
    config: &dyn ConfigPort,
    ticker_override: Option<&str>,
) -> Result<ReportConfig, QuantError> {
    let lookback_days = config.get_int("report", "lookback_days", DEFAULT_LOOKBACK_DAYS)?;
    if !(1..=MAX_LOOKBACK_DAYS).contains(&lookback_days) {
        return Err(QuantError::ConfigInvalid {
            section: "report".to_string(),
            key: "lookback_days".to_string(),
            reason: format!("lookback_days must be between 1 and {}", MAX_LOOKBACK_DAYS),
        });
    }
    Ok(ReportConfig {
        ticker: resolve_ticker(ticker_override, config, "report"),
        lookback_days,
    })
}

fn price_source(config: &dyn ConfigPort) -> Result<CsvPriceSource, QuantError> {
    let dir = config
        .get_string("data", "dir")
        .ok_or_else(|| QuantError::ConfigMissing {
            section: "data".to_string(),
            key: "dir".to_string(),
        })?;
    Ok(CsvPriceSource::new(PathBuf::from(dir.trim())))
}

fn run_single(config_path: &Path, ticker_override: Option<&str>) -> Result<(), QuantError> {
    let config = load_config(config_path)?;
    validate_analysis_config(&config)?;
    validate_strategy_config(&config)?;

    let analysis_config = build_analysis_config(&config)?;
    let (moving_average, momentum) = build_strategies(&config)?;
    let ticker = resolve_ticker(ticker_override, &config, "strategy");
    let source = price_source(&config)?;

    let analysis = run_single_pipeline(
        &source,
        &ticker,
        &analysis_config,
        &moving_average,
        &momentum,
    )?;
    print!("{}", format_single(&ticker, &analysis));
    Ok(())
}

pub fn run_single_pipeline(
    source: &dyn PriceSource,
    ticker: &str,
    config: &AnalysisConfig,
    moving_average: &MovingAverageCrossover,
    momentum: &Momentum,
) -> Result<SingleAssetAnalysis, QuantError> {
    tracing::info!(
        ticker = %ticker,
        start = %config.start_date,
        end = %config.end_date,
        "fetching prices"
    );
    let prices = require_prices(source, ticker, config.start_date, config.end_date)?;
    tracing::info!(prices = prices.len(), "running strategies");
    analyze_single_asset(
        ticker,
        &prices,
        moving_average,
        momentum,
        config.risk_free_rate,
    )
}

fn run_portfolio(
    config_path: &Path,
    tickers_override: Option<&str>,
    rebalance_override: Option<&str>,
) -> Result<(), QuantError> {
    let mut config = load_config(config_path)?;
    if let Some(tickers) = tickers_override {
        config.set("portfolio", "tickers", tickers);
    }
    if let Some(rebalance) = rebalance_override {
        config.set("portfolio", "rebalance", rebalance);
    }
    validate_analysis_config(&config)?;
    validate_portfolio_config(&config)?;

    let analysis_config = build_analysis_config(&config)?;
    let portfolio_config = build_portfolio_config(&config)?;
    let source = price_source(&config)?;

    let result = run_portfolio_pipeline(&source, &analysis_config, &portfolio_config)?;
    print!("{}", format_portfolio(&result, analysis_config.risk_free_rate));
    Ok(())
}

pub fn run_portfolio_pipeline(
    source: &dyn PriceSource,
    analysis: &AnalysisConfig,
    portfolio: &PortfolioConfig,
) -> Result<PortfolioResult, QuantError> {
    tracing::info!(
        tickers = portfolio.tickers.len(),
        rebalance = %portfolio.rebalance,
        "loading universe"
    );
    let universe = load_universe(
        source,
        &portfolio.tickers,
        analysis.start_date,
        analysis.end_date,
    );
    if !universe.skipped.is_empty() {
        tracing::warn!(
            skipped = universe.skipped.len(),
            loaded = universe.assets.len(),
            "some tickers were excluded"
        );
    }
    compose_portfolio(&universe.assets, &portfolio.weighting, portfolio.rebalance)
}

fn run_report(
    config_path: &Path,
    ticker_override: Option<&str>,
    as_of: Option<NaiveDate>,
) -> Result<(), QuantError> {
    let config = load_config(config_path)?;
    validate_report_config(&config)?;

    let report_config = build_report_config(&config, ticker_override)?;
    let risk_free_rate = config.get_double("analysis", "risk_free_rate", 0.0)?;
    let as_of = as_of.unwrap_or_else(|| Local::now().date_naive());
    let log_path = config
        .get_string("report", "log_path")
        .unwrap_or_else(|| DEFAULT_LOG_PATH.to_string());

    let source = price_source(&config)?;
    let sink = TextReportSink::new(PathBuf::from(log_path.trim()));

    let report = run_report_pipeline(&source, &sink, &report_config, as_of, risk_free_rate)?;
    if !report.has_data() {
        return Err(QuantError::NoData {
            ticker: report.ticker,
        });
    }
    println!("Report for {} saved to {}", report.ticker, sink.path().display());
    Ok(())
}

/// Builds the snapshot and appends it to `sink`, including no-data
/// snapshots.
pub fn run_report_pipeline(
    source: &dyn PriceSource,
    sink: &dyn ReportSink,
    config: &ReportConfig,
    as_of: NaiveDate,
    risk_free_rate: f64,
) -> Result<DailyReport, QuantError> {
    let (start, end) = report_window(as_of, config.lookback_days)?;
    tracing::info!(ticker = %config.ticker, start = %start, end = %end, "building daily report");

    let prices = source.fetch_prices(&config.ticker, start, end)?;
    let report = DailyReport::build(
        &config.ticker,
        as_of,
        config.lookback_days,
        prices.as_ref(),
        risk_free_rate,
    );
    sink.append(&report)?;
    Ok(report)
}

pub fn run_validate(config_path: &Path) -> Result<(), QuantError> {
    let config = load_config(config_path)?;

    validate_analysis_config(&config)?;
    validate_strategy_config(&config)?;
    validate_report_config(&config)?;
    if config.get_string("portfolio", "tickers").is_some() {
        validate_portfolio_config(&config)?;
    }

    println!("Configuration is valid.");
    Ok(())
}

fn pct(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

fn pct_or_na(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), pct)
}

fn ratio_or_na(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:.2}", v))
}

fn metrics_row(name: &str, report: &PerformanceReport) -> String {
    format!(
        "{:<28} {:>10} {:>10} {:>8} {:>10} {:>10}\n",
        name,
        pct(report.cumulative_return),
        pct_or_na(report.annualized_volatility),
        ratio_or_na(report.sharpe_ratio),
        pct(report.max_drawdown),
        pct_or_na(report.historical_var_95),
    )
}

fn metrics_header() -> String {
    format!(
        "{:<28} {:>10} {:>10} {:>8} {:>10} {:>10}\n",
        "", "Cum. ret", "Ann. vol", "Sharpe", "Max DD", "VaR 95%"
    )
}

pub fn format_single(ticker: &str, analysis: &SingleAssetAnalysis) -> String {
    let mut out = format!("=== {} ===\n", ticker);
    out.push_str(&format!("Last price:        {:.2}\n", analysis.kpis.last_price));
    out.push_str(&format!(
        "Last-day return:   {}\n",
        pct(analysis.kpis.last_day_return)
    ));
    out.push_str(&format!(
        "Buy & Hold return: {}\n\n",
        pct(analysis.kpis.buy_and_hold_return)
    ));

    out.push_str(&metrics_header());
    for outcome in analysis.outcomes() {
        out.push_str(&metrics_row(&outcome.run.name, &outcome.report));
    }
    out
}

pub fn format_portfolio(result: &PortfolioResult, risk_free_rate: f64) -> String {
    let mut out = String::from("=== Portfolio ===\n");
    for (ticker, weight) in result.aligned.tickers.iter().zip(&result.target_weights) {
        out.push_str(&format!("  {:<12} {:>8}\n", ticker, pct(*weight)));
    }
    out.push_str(&format!(
        "Period: {} to {} ({} days, {} rebalances)\n",
        result.aligned.dates.first().map_or_else(String::new, |d| d.to_string()),
        result.aligned.dates.last().map_or_else(String::new, |d| d.to_string()),
        result.aligned.dates.len(),
        result.schedule.rebalance_dates().len(),
    ));
    out.push_str(&format!(
        "NAV: {:.2} -> {:.2}, last day {} ({:+.2})\n\n",
        result.nav.initial_nav,
        result.nav.current_nav,
        pct(result.nav.last_day_return),
        result.nav.last_day_pnl,
    ));

    out.push_str(&metrics_header());
    out.push_str(&metrics_row(
        "Portfolio",
        &PerformanceReport::compute(&result.returns, risk_free_rate),
    ));
    for (ticker, column) in result.aligned.tickers.iter().zip(&result.aligned.columns) {
        out.push_str(&metrics_row(
            ticker,
            &PerformanceReport::from_values(column, risk_free_rate),
        ));
    }

    out.push_str("\nCorrelation:\n");
    out.push_str(&format!("{:<12}", ""));
    for ticker in &result.aligned.tickers {
        out.push_str(&format!(" {:>10}", ticker));
    }
    out.push('\n');
    for (ticker, row) in result.aligned.tickers.iter().zip(&result.correlation) {
        out.push_str(&format!("{:<12}", ticker));
        for value in row {
            out.push_str(&format!(" {:>10.2}", value));
        }
        out.push('\n');
    }
    out
}
