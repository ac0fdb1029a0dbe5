//! Append-only text log for daily reports.

use crate::domain::daily_report::{DailyReport, ReportBody};
use crate::domain::error::QuantError;
use crate::ports::report_port::ReportSink;
use chrono::{NaiveDateTime, Utc};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const DEFAULT_LOG_PATH: &str = "daily_report_log.txt";

pub struct TextReportSink {
    path: PathBuf,
}

impl TextReportSink {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn pct(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

fn pct_or_na(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), pct)
}

/// Renders one log entry. `timestamp` only appears on the no-data line.
pub fn format_report(report: &DailyReport, timestamp: NaiveDateTime) -> String {
    match &report.body {
        ReportBody::NoData => format!(
            "[{}] ERROR: No data for {}.\n",
            timestamp.format("%Y-%m-%d %H:%M:%S"),
            report.ticker
        ),
        ReportBody::Metrics {
            last_price,
            observations,
            report: metrics,
        } => format!(
            "\n--- Daily Report ({as_of}) for {ticker} ---\n\
             Closing price: {last_price:.2}\n\
             Observations: {observations}\n\
             Cumulative return ({lookback}d): {cumulative}\n\
             Annualized volatility: {volatility}\n\
             Sharpe ratio: {sharpe}\n\
             Maximum drawdown: {drawdown}\n\
             Daily 95% VaR: {var}\n\n",
            as_of = report.as_of,
            ticker = report.ticker,
            lookback = report.lookback_days,
            cumulative = pct(metrics.cumulative_return),
            volatility = pct_or_na(metrics.annualized_volatility),
            sharpe = metrics
                .sharpe_ratio
                .map_or_else(|| "n/a".to_string(), |s| format!("{:.2}", s)),
            drawdown = pct(metrics.max_drawdown),
            var = pct_or_na(metrics.historical_var_95),
        ),
    }
}

impl ReportSink for TextReportSink {
    fn append(&self, report: &DailyReport) -> Result<(), QuantError> {
        let entry = format_report(report, Utc::now().naive_utc());
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(entry.as_bytes())?;
        tracing::info!(path = %self.path.display(), ticker = %report.ticker, "report appended");
        Ok(())
    }
}
