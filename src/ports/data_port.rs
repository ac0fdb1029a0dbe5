//! Price data port trait.

use crate::domain::error::QuantError;
use crate::domain::prices::PriceSeries;
use chrono::NaiveDate;

/// Source of daily closing prices.
pub trait PriceSource {
    /// Prices for `ticker` with `start <= date < end`.
    ///
    /// `Ok(None)` means the source has nothing for this ticker and range,
    /// which is an expected outcome. `Err` is reserved for a failing source.
    fn fetch_prices(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Option<PriceSeries>, QuantError>;
}
