//! Portfolio compositor: alignment, weighting, rebalancing and combination.
//!
//! Between rebalance dates weights are held at their last reset values and
//! do not drift with asset performance.

use chrono::{Datelike, NaiveDate};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use crate::domain::error::QuantError;
use crate::domain::returns::{EquityPoint, ReturnPoint, ReturnSeries};

pub const MIN_PORTFOLIO_ASSETS: usize = 2;
pub const INITIAL_NAV: f64 = 100.0;

/// Return series of one asset, tagged with its ticker.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetReturns {
    pub ticker: String,
    pub returns: ReturnSeries,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Weighting {
    #[default]
    Equal,
    /// Raw non-negative weights keyed by ticker, normalized by their sum.
    Custom(HashMap<String, f64>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum RebalanceFrequency {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl FromStr for RebalanceFrequency {
    type Err = QuantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(RebalanceFrequency::Daily),
            "weekly" => Ok(RebalanceFrequency::Weekly),
            "monthly" => Ok(RebalanceFrequency::Monthly),
            other => Err(QuantError::invalid_parameter(
                "rebalance",
                format!("unknown frequency '{}' (expected daily, weekly or monthly)", other),
            )),
        }
    }
}

impl fmt::Display for RebalanceFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RebalanceFrequency::Daily => write!(f, "Daily"),
            RebalanceFrequency::Weekly => write!(f, "Weekly"),
            RebalanceFrequency::Monthly => write!(f, "Monthly"),
        }
    }
}

/// Requested portfolio: tickers in configuration order, weighting and
/// rebalancing policy.
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioConfig {
    pub tickers: Vec<String>,
    pub weighting: Weighting,
    pub rebalance: RebalanceFrequency,
}

/// Asset returns restricted to the dates every asset has.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedReturns {
    pub dates: Vec<NaiveDate>,
    pub tickers: Vec<String>,
    /// One column per ticker, each `dates.len()` long.
    pub columns: Vec<Vec<f64>>,
}

/// Weight vector for every aligned date.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightSchedule {
    pub dates: Vec<NaiveDate>,
    pub tickers: Vec<String>,
    /// One row per date, ordered like `tickers`.
    pub rows: Vec<Vec<f64>>,
    /// True where weights were reset to target on that date.
    pub rebalanced: Vec<bool>,
}

impl WeightSchedule {
    pub fn rebalance_dates(&self) -> Vec<NaiveDate> {
        self.dates
            .iter()
            .zip(&self.rebalanced)
            .filter_map(|(&date, &reset)| reset.then_some(date))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavSummary {
    pub initial_nav: f64,
    pub current_nav: f64,
    pub last_day_return: f64,
    pub last_day_pnl: f64,
}

#[derive(Debug, Clone)]
pub struct PortfolioResult {
    pub aligned: AlignedReturns,
    pub target_weights: Vec<f64>,
    pub schedule: WeightSchedule,
    pub returns: ReturnSeries,
    pub equity: Vec<EquityPoint>,
    pub asset_equity: Vec<(String, Vec<EquityPoint>)>,
    pub correlation: Vec<Vec<f64>>,
    pub nav: NavSummary,
}

/// Inner join on date: a date survives only if every asset has a return.
pub fn align_returns(assets: &[AssetReturns]) -> AlignedReturns {
    let tickers: Vec<String> = assets.iter().map(|a| a.ticker.clone()).collect();
    if assets.is_empty() {
        return AlignedReturns {
            dates: vec![],
            tickers,
            columns: vec![],
        };
    }

    let lookups: Vec<HashMap<NaiveDate, f64>> = assets
        .iter()
        .map(|a| a.returns.points().iter().map(|p| (p.date, p.value)).collect())
        .collect();

    let mut counts: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for lookup in &lookups {
        for date in lookup.keys() {
            *counts.entry(*date).or_default() += 1;
        }
    }

    let dates: Vec<NaiveDate> = counts
        .into_iter()
        .filter(|&(_, n)| n == assets.len())
        .map(|(date, _)| date)
        .collect();

    let columns = lookups
        .iter()
        .map(|lookup| dates.iter().map(|d| lookup[d]).collect())
        .collect();

    AlignedReturns {
        dates,
        tickers,
        columns,
    }
}

/// Target weights in `tickers` order, summing to 1.
///
/// Custom weights must be finite, non-negative and present for every
/// ticker. If they sum to exactly zero, equal weights are used instead.
pub fn normalize_weights(weighting: &Weighting, tickers: &[String]) -> Result<Vec<f64>, QuantError> {
    let n = tickers.len();
    if n == 0 {
        return Err(QuantError::InsufficientAssets {
            have: 0,
            need: MIN_PORTFOLIO_ASSETS,
        });
    }
    let equal = vec![1.0 / n as f64; n];

    let raw = match weighting {
        Weighting::Equal => return Ok(equal),
        Weighting::Custom(map) => tickers
            .iter()
            .map(|t| {
                map.get(t).copied().ok_or_else(|| {
                    QuantError::invalid_parameter("weights", format!("no weight given for {}", t))
                })
            })
            .collect::<Result<Vec<f64>, QuantError>>()?,
    };

    if let Some((t, w)) = tickers
        .iter()
        .zip(&raw)
        .find(|(_, w)| !w.is_finite() || **w < 0.0)
    {
        return Err(QuantError::invalid_parameter(
            "weights",
            format!("weight for {} must be finite and non-negative, got {}", t, w),
        ));
    }

    let total: f64 = raw.iter().sum();
    if total == 0.0 {
        tracing::warn!("custom weights sum to zero, falling back to equal weight");
        return Ok(equal);
    }
    Ok(raw.iter().map(|w| w / total).collect())
}

fn is_new_period(freq: RebalanceFrequency, previous: NaiveDate, date: NaiveDate) -> bool {
    match freq {
        RebalanceFrequency::Daily => true,
        RebalanceFrequency::Weekly => {
            let (a, b) = (previous.iso_week(), date.iso_week());
            (a.year(), a.week()) != (b.year(), b.week())
        }
        RebalanceFrequency::Monthly => {
            (previous.year(), previous.month()) != (date.year(), date.month())
        }
    }
}

/// Reset to `target` on the first date and at the start of every new
/// period; hold the last reset weights in between.
pub fn build_weight_schedule(
    dates: &[NaiveDate],
    tickers: &[String],
    target: &[f64],
    freq: RebalanceFrequency,
) -> WeightSchedule {
    let mut rows = Vec::with_capacity(dates.len());
    let mut rebalanced = Vec::with_capacity(dates.len());
    let mut current = target.to_vec();

    for (i, &date) in dates.iter().enumerate() {
        let reset = i == 0 || is_new_period(freq, dates[i - 1], date);
        if reset {
            current = target.to_vec();
        }
        rows.push(current.clone());
        rebalanced.push(reset);
    }

    WeightSchedule {
        dates: dates.to_vec(),
        tickers: tickers.to_vec(),
        rows,
        rebalanced,
    }
}

fn pearson(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() || x.len() < 2 {
        return f64::NAN;
    }
    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (xi, yi) in x.iter().zip(y) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denominator = (var_x * var_y).sqrt();
    if denominator == 0.0 {
        f64::NAN
    } else {
        cov / denominator
    }
}

/// Pairwise Pearson correlation of the aligned return columns. A column
/// with no variance correlates as NaN with everything, itself included.
pub fn correlation_matrix(aligned: &AlignedReturns) -> Vec<Vec<f64>> {
    aligned
        .columns
        .iter()
        .map(|x| aligned.columns.iter().map(|y| pearson(x, y)).collect())
        .collect()
}

impl NavSummary {
    pub fn from_returns(returns: &ReturnSeries, initial_nav: f64) -> Self {
        let growth = returns.equity_curve().last().map_or(1.0, |p| p.equity);
        let current_nav = initial_nav * growth;
        let last_day_return = returns.last().map_or(0.0, |p| p.value);
        NavSummary {
            initial_nav,
            current_nav,
            last_day_return,
            last_day_pnl: current_nav * last_day_return,
        }
    }
}

pub fn compose_portfolio(
    assets: &[AssetReturns],
    weighting: &Weighting,
    freq: RebalanceFrequency,
) -> Result<PortfolioResult, QuantError> {
    if assets.len() < MIN_PORTFOLIO_ASSETS {
        return Err(QuantError::InsufficientAssets {
            have: assets.len(),
            need: MIN_PORTFOLIO_ASSETS,
        });
    }

    let mut seen = HashSet::new();
    if let Some(dup) = assets.iter().find(|a| !seen.insert(a.ticker.as_str())) {
        return Err(QuantError::invalid_parameter(
            "tickers",
            format!("{} appears more than once", dup.ticker),
        ));
    }

    let aligned = align_returns(assets);
    if aligned.dates.is_empty() {
        return Err(QuantError::NoOverlappingDates);
    }
    tracing::debug!(
        assets = aligned.tickers.len(),
        dates = aligned.dates.len(),
        "aligned asset returns"
    );

    let target_weights = normalize_weights(weighting, &aligned.tickers)?;
    let schedule = build_weight_schedule(&aligned.dates, &aligned.tickers, &target_weights, freq);

    let returns = ReturnSeries::new(
        aligned
            .dates
            .iter()
            .enumerate()
            .map(|(t, &date)| ReturnPoint {
                date,
                value: schedule.rows[t]
                    .iter()
                    .zip(&aligned.columns)
                    .map(|(w, column)| w * column[t])
                    .sum(),
            })
            .collect(),
    );

    let asset_equity = aligned
        .tickers
        .iter()
        .zip(&aligned.columns)
        .map(|(ticker, column)| {
            let series = ReturnSeries::from_pairs(aligned.dates.iter().copied().zip(column.iter().copied()));
            (ticker.clone(), series.equity_curve())
        })
        .collect();

    let correlation = correlation_matrix(&aligned);
    let nav = NavSummary::from_returns(&returns, INITIAL_NAV);
    let equity = returns.equity_curve();

    Ok(PortfolioResult {
        aligned,
        target_weights,
        schedule,
        returns,
        equity,
        asset_equity,
        correlation,
        nav,
    })
}
