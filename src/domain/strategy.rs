//! Strategy engine: signal generators and the shared lag/return pipeline.


use crate::domain::error::QuantError;
use crate::domain::indicator::roc::calculate_roc;
use crate::domain::indicator::sma::calculate_sma;
use crate::domain::prices::PriceSeries;
use crate::domain::returns::ReturnSeries;
use crate::domain::signal::{Exposure, ExposurePoint, Position, Signal};

pub const DEFAULT_SHORT_WINDOW: usize = 20;
pub const DEFAULT_LONG_WINDOW: usize = 50;
pub const DEFAULT_MOMENTUM_LOOKBACK: usize = 20;

/// Anything that can turn a price history into a long/flat signal.
///
/// Implementations must only look at prices up to and including the date
/// of each signal point.
pub trait SignalGenerator {
    fn name(&self) -> String;

    fn generate_signal(&self, prices: &PriceSeries) -> Signal;
}

/// Long while the short SMA is strictly above the long SMA.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovingAverageCrossover {
    short_window: usize,
    long_window: usize,
}

impl MovingAverageCrossover {
    pub fn new(short_window: usize, long_window: usize) -> Result<Self, QuantError> {
        if short_window == 0 {
            return Err(QuantError::invalid_parameter(
                "short_window",
                "must be a positive integer",
            ));
        }
        if long_window == 0 {
            return Err(QuantError::invalid_parameter(
                "long_window",
                "must be a positive integer",
            ));
        }
        if short_window >= long_window {
            return Err(QuantError::invalid_parameter(
                "short_window",
                format!(
                    "must be strictly less than long_window ({} >= {})",
                    short_window, long_window
                ),
            ));
        }
        Ok(Self {
            short_window,
            long_window,
        })
    }

    pub fn short_window(&self) -> usize {
        self.short_window
    }

    pub fn long_window(&self) -> usize {
        self.long_window
    }
}

impl Default for MovingAverageCrossover {
    fn default() -> Self {
        Self {
            short_window: DEFAULT_SHORT_WINDOW,
            long_window: DEFAULT_LONG_WINDOW,
        }
    }
}

impl SignalGenerator for MovingAverageCrossover {
    fn name(&self) -> String {
        format!("MA Crossover({},{})", self.short_window, self.long_window)
    }

    fn generate_signal(&self, prices: &PriceSeries) -> Signal {
        let short = calculate_sma(prices, self.short_window);
        let long = calculate_sma(prices, self.long_window);

        let points = short
            .values
            .iter()
            .zip(&long.values)
            .map(|(s, l)| {
                let exposure = match (s.get(), l.get()) {
                    (Some(s), Some(l)) if s > l => Exposure::Long,
                    _ => Exposure::Flat,
                };
                ExposurePoint {
                    date: s.date,
                    exposure,
                }
            })
            .collect();
        Signal { points }
    }
}

/// Long while the trailing `lookback`-day price change is strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Momentum {
    lookback: usize,
}

impl Momentum {
    pub fn new(lookback: usize) -> Result<Self, QuantError> {
        if lookback == 0 {
            return Err(QuantError::invalid_parameter(
                "lookback",
                "must be a positive integer",
            ));
        }
        Ok(Self { lookback })
    }

    pub fn lookback(&self) -> usize {
        self.lookback
    }
}

impl Default for Momentum {
    fn default() -> Self {
        Self {
            lookback: DEFAULT_MOMENTUM_LOOKBACK,
        }
    }
}

impl SignalGenerator for Momentum {
    fn name(&self) -> String {
        format!("Momentum({})", self.lookback)
    }

    fn generate_signal(&self, prices: &PriceSeries) -> Signal {
        let roc = calculate_roc(prices, self.lookback);
        let points = roc
            .values
            .iter()
            .map(|p| ExposurePoint {
                date: p.date,
                exposure: match p.get() {
                    Some(change) if change > 0.0 => Exposure::Long,
                    _ => Exposure::Flat,
                },
            })
            .collect();
        Signal { points }
    }
}

/// Always long. After the lag this earns every return in the series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BuyAndHold;

impl SignalGenerator for BuyAndHold {
    fn name(&self) -> String {
        "Buy & Hold".to_string()
    }

    fn generate_signal(&self, prices: &PriceSeries) -> Signal {
        Signal {
            points: prices
                .dates()
                .map(|date| ExposurePoint {
                    date,
                    exposure: Exposure::Long,
                })
                .collect(),
        }
    }
}

/// Every stage of one strategy evaluation, kept separately so each can be
/// inspected on its own.
#[derive(Debug, Clone)]
pub struct StrategyRun {
    pub name: String,
    pub signal: Signal,
    pub position: Position,
    pub returns: ReturnSeries,
}

pub fn run_strategy(generator: &dyn SignalGenerator, prices: &PriceSeries) -> StrategyRun {
    let signal = generator.generate_signal(prices);
    let position = signal.to_position();
    let returns = position.apply(&ReturnSeries::from_prices(prices));
    StrategyRun {
        name: generator.name(),
        signal,
        position,
        returns,
    }
}
