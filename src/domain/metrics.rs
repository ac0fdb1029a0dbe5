//! Performance and risk statistics over a return series.

use crate::domain::returns::ReturnSeries;

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;
pub const VAR_PERCENTILE: f64 = 0.05;

/// The standard statistics reported for every return series.
///
/// `None` marks a statistic that is undefined for the input, which is kept
/// distinct from a computed zero.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PerformanceReport {
    pub cumulative_return: f64,
    pub annualized_volatility: Option<f64>,
    pub sharpe_ratio: Option<f64>,
    pub max_drawdown: f64,
    pub historical_var_95: Option<f64>,
}

impl PerformanceReport {
    /// `risk_free_rate` is annual; it is converted to a daily rate.
    pub fn compute(returns: &ReturnSeries, risk_free_rate: f64) -> Self {
        Self::from_values(&returns.values(), risk_free_rate)
    }

    pub fn from_values(returns: &[f64], risk_free_rate: f64) -> Self {
        let returns: Vec<f64> = returns.iter().copied().filter(|r| r.is_finite()).collect();

        PerformanceReport {
            cumulative_return: cumulative_return(&returns),
            annualized_volatility: annualized_volatility(&returns),
            sharpe_ratio: sharpe_ratio(&returns, risk_free_rate),
            max_drawdown: max_drawdown(&returns),
            historical_var_95: percentile(&returns, VAR_PERCENTILE),
        }
    }
}

/// Compounded: `prod(1 + r) - 1`. Zero for an empty series.
pub fn cumulative_return(returns: &[f64]) -> f64 {
    returns.iter().map(|r| 1.0 + r).product::<f64>() - 1.0
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n - 1 denominator); needs two observations.
pub fn sample_stddev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some((ss / (values.len() - 1) as f64).sqrt())
}

pub fn annualized_volatility(returns: &[f64]) -> Option<f64> {
    sample_stddev(returns).map(|sd| sd * TRADING_DAYS_PER_YEAR.sqrt())
}

/// Annualized Sharpe ratio; `None` when volatility is zero or undefined.
pub fn sharpe_ratio(returns: &[f64], risk_free_rate: f64) -> Option<f64> {
    let sd = sample_stddev(returns)?;
    if sd <= 0.0 {
        return None;
    }
    let excess = mean(returns)? - risk_free_rate / TRADING_DAYS_PER_YEAR;
    Some(excess / sd * TRADING_DAYS_PER_YEAR.sqrt())
}

/// Worst peak-to-trough decline of the compounded equity curve, as a
/// non-positive fraction.
pub fn max_drawdown(returns: &[f64]) -> f64 {
    let mut equity = 1.0;
    let curve: Vec<f64> = returns
        .iter()
        .map(|r| {
            equity *= 1.0 + r;
            equity
        })
        .collect();
    max_drawdown_of_equity(&curve)
}

pub fn max_drawdown_of_equity(equity_curve: &[f64]) -> f64 {
    let Some(&first) = equity_curve.first() else {
        return 0.0;
    };

    let mut peak = first;
    let mut max_dd = 0.0_f64;
    for &equity in equity_curve {
        if equity > peak {
            peak = equity;
        }
        if peak > 0.0 {
            let dd = equity / peak - 1.0;
            if dd < max_dd {
                max_dd = dd;
            }
        }
    }
    max_dd
}

/// Empirical quantile with linear interpolation between order statistics
/// (rank `q * (n - 1)`). `q` is clamped to `[0, 1]`.
pub fn percentile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    Some(sorted[lo] + frac * (sorted[hi] - sorted[lo]))
}
