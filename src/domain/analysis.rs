//! Single-asset comparison: Buy & Hold against the MA crossover and
//! momentum strategies on the same price history.

use chrono::NaiveDate;

use crate::domain::error::QuantError;
use crate::domain::metrics::PerformanceReport;
use crate::domain::prices::PriceSeries;
use crate::domain::returns::{EquityPoint, ReturnSeries};
use crate::domain::strategy::{
    run_strategy, BuyAndHold, Momentum, MovingAverageCrossover, StrategyRun,
};

/// Analysis window and risk-free rate shared by every command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisConfig {
    pub start_date: NaiveDate,
    /// Exclusive.
    pub end_date: NaiveDate,
    /// Annual rate.
    pub risk_free_rate: f64,
}

#[derive(Debug, Clone)]
pub struct StrategyOutcome {
    pub run: StrategyRun,
    pub equity: Vec<EquityPoint>,
    pub report: PerformanceReport,
}

impl StrategyOutcome {
    fn from_run(run: StrategyRun, risk_free_rate: f64) -> Self {
        let equity = run.returns.equity_curve();
        let report = PerformanceReport::compute(&run.returns, risk_free_rate);
        Self {
            run,
            equity,
            report,
        }
    }
}

/// Headline figures for the analysed asset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssetKpis {
    pub last_price: f64,
    pub last_day_return: f64,
    pub buy_and_hold_return: f64,
}

#[derive(Debug, Clone)]
pub struct SingleAssetAnalysis {
    pub returns: ReturnSeries,
    pub kpis: AssetKpis,
    pub buy_and_hold: StrategyOutcome,
    pub moving_average: StrategyOutcome,
    pub momentum: StrategyOutcome,
}

impl SingleAssetAnalysis {
    pub fn outcomes(&self) -> [&StrategyOutcome; 3] {
        [&self.buy_and_hold, &self.moving_average, &self.momentum]
    }
}

pub fn analyze_single_asset(
    ticker: &str,
    prices: &PriceSeries,
    moving_average: &MovingAverageCrossover,
    momentum: &Momentum,
    risk_free_rate: f64,
) -> Result<SingleAssetAnalysis, QuantError> {
    let last = prices.last().ok_or_else(|| QuantError::NoData {
        ticker: ticker.to_string(),
    })?;

    let returns = ReturnSeries::from_prices(prices);
    let buy_and_hold = StrategyOutcome::from_run(run_strategy(&BuyAndHold, prices), risk_free_rate);

    let kpis = AssetKpis {
        last_price: last.price,
        last_day_return: returns.last().map_or(0.0, |r| r.value),
        buy_and_hold_return: buy_and_hold.report.cumulative_return,
    };

    Ok(SingleAssetAnalysis {
        kpis,
        moving_average: StrategyOutcome::from_run(run_strategy(moving_average, prices), risk_free_rate),
        momentum: StrategyOutcome::from_run(run_strategy(momentum, prices), risk_free_rate),
        buy_and_hold,
        returns,
    })
}
