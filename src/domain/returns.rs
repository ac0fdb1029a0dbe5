//! Simple daily returns and equity curves.

use chrono::NaiveDate;

use crate::domain::prices::PriceSeries;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReturnPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Ordered simple returns. Never contains a non-finite value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReturnSeries {
    points: Vec<ReturnPoint>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub equity: f64,
}

impl ReturnSeries {
    /// Builds a series from raw points, dropping non-finite values.
    pub fn new(points: Vec<ReturnPoint>) -> Self {
        Self {
            points: points.into_iter().filter(|p| p.value.is_finite()).collect(),
        }
    }

    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        Self::new(
            pairs
                .into_iter()
                .map(|(date, value)| ReturnPoint { date, value })
                .collect(),
        )
    }

    /// `r[t] = p[t] / p[t-1] - 1`; the first price has no return.
    /// Fewer than two prices yield an empty series.
    pub fn from_prices(prices: &PriceSeries) -> Self {
        let points = prices
            .points()
            .windows(2)
            .map(|w| ReturnPoint {
                date: w[1].date,
                value: w[1].price / w[0].price - 1.0,
            })
            .collect();
        Self::new(points)
    }

    pub fn points(&self) -> &[ReturnPoint] {
        &self.points
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.points.iter().map(|p| p.date)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last(&self) -> Option<&ReturnPoint> {
        self.points.last()
    }

    /// Cumulative product of `1 + r`, so the first point is `1 + r[0]`.
    pub fn equity_curve(&self) -> Vec<EquityPoint> {
        let mut equity = 1.0;
        self.points
            .iter()
            .map(|p| {
                equity *= 1.0 + p.value;
                EquityPoint {
                    date: p.date,
                    equity,
                }
            })
            .collect()
    }
}
