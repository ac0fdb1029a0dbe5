//! Daily report snapshot for one ticker over a trailing window.

use chrono::{Days, NaiveDate};

use crate::domain::error::QuantError;
use crate::domain::metrics::PerformanceReport;
use crate::domain::prices::PriceSeries;
use crate::domain::returns::ReturnSeries;

pub const DEFAULT_REPORT_TICKER: &str = "^FCHI";
pub const DEFAULT_LOOKBACK_DAYS: i64 = 252;
/// One hundred years of calendar days.
pub const MAX_LOOKBACK_DAYS: i64 = 36_525;

#[derive(Debug, Clone, PartialEq)]
pub struct ReportConfig {
    pub ticker: String,
    pub lookback_days: i64,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            ticker: DEFAULT_REPORT_TICKER.to_string(),
            lookback_days: DEFAULT_LOOKBACK_DAYS,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReportBody {
    NoData,
    Metrics {
        last_price: f64,
        observations: usize,
        report: PerformanceReport,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailyReport {
    pub ticker: String,
    pub as_of: NaiveDate,
    pub lookback_days: i64,
    pub body: ReportBody,
}

/// `[as_of - lookback_days, as_of)` in calendar days.
pub fn report_window(
    as_of: NaiveDate,
    lookback_days: i64,
) -> Result<(NaiveDate, NaiveDate), QuantError> {
    let start = u64::try_from(lookback_days)
        .ok()
        .filter(|days| (1..=MAX_LOOKBACK_DAYS as u64).contains(days))
        .and_then(|days| as_of.checked_sub_days(Days::new(days)))
        .ok_or_else(|| QuantError::ConfigInvalid {
            section: "report".to_string(),
            key: "lookback_days".to_string(),
            reason: format!(
                "lookback of {} days from {} is out of range",
                lookback_days, as_of
            ),
        })?;
    Ok((start, as_of))
}

impl DailyReport {
    /// A source that returned nothing, or a single price with no return,
    /// both produce a [`ReportBody::NoData`] snapshot.
    pub fn build(
        ticker: &str,
        as_of: NaiveDate,
        lookback_days: i64,
        prices: Option<&PriceSeries>,
        risk_free_rate: f64,
    ) -> Self {
        let body = match prices.and_then(|p| p.last().map(|last| (p, last.price))) {
            Some((prices, last_price)) => {
                let returns = ReturnSeries::from_prices(prices);
                if returns.is_empty() {
                    ReportBody::NoData
                } else {
                    ReportBody::Metrics {
                        last_price,
                        observations: returns.len(),
                        report: PerformanceReport::compute(&returns, risk_free_rate),
                    }
                }
            }
            None => ReportBody::NoData,
        };

        DailyReport {
            ticker: ticker.to_string(),
            as_of,
            lookback_days,
            body,
        }
    }

    pub fn has_data(&self) -> bool {
        matches!(self.body, ReportBody::Metrics { .. })
    }
}
