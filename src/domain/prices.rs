//! Daily closing price series.

use chrono::NaiveDate;

use crate::domain::error::QuantError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

/// Ordered closing prices, one per trading day.
///
/// Dates are strictly increasing and every price is finite and positive.
/// The only way to build one is [`PriceSeries::new`], which checks both.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(points: Vec<PricePoint>) -> Result<Self, QuantError> {
        for (i, point) in points.iter().enumerate() {
            if !point.price.is_finite() || point.price <= 0.0 {
                return Err(QuantError::InvalidPrice {
                    date: point.date,
                    price: point.price,
                });
            }
            if i > 0 && point.date <= points[i - 1].date {
                return Err(QuantError::UnorderedDates {
                    previous: points[i - 1].date,
                    date: point.date,
                });
            }
        }
        Ok(Self { points })
    }

    /// Convenience constructor pairing dates with prices.
    pub fn from_pairs<I>(pairs: I) -> Result<Self, QuantError>
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        Self::new(
            pairs
                .into_iter()
                .map(|(date, price)| PricePoint { date, price })
                .collect(),
        )
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.points.iter().map(|p| p.date)
    }

    pub fn prices(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.price)
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }
}
