#![allow(dead_code)]

use chrono::NaiveDate;
use quantdash::domain::error::QuantError;
use quantdash::domain::prices::{PricePoint, PriceSeries};
use quantdash::ports::data_port::PriceSource;
use std::collections::HashMap;

pub struct MockPriceSource {
    pub data: HashMap<String, Vec<PricePoint>>,
    pub errors: HashMap<String, String>,
}

impl MockPriceSource {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_prices(mut self, ticker: &str, points: Vec<PricePoint>) -> Self {
        self.data.insert(ticker.to_string(), points);
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }
}

impl PriceSource for MockPriceSource {
    fn fetch_prices(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Option<PriceSeries>, QuantError> {
        if let Some(reason) = self.errors.get(ticker) {
            return Err(QuantError::DataSource {
                reason: reason.clone(),
            });
        }
        let points: Vec<PricePoint> = self
            .data
            .get(ticker)
            .map(|points| {
                points
                    .iter()
                    .filter(|p| p.date >= start && p.date < end)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        if points.is_empty() {
            return Ok(None);
        }
        PriceSeries::new(points).map(Some)
    }
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn make_point(d: &str, price: f64) -> PricePoint {
    PricePoint {
        date: date(d),
        price,
    }
}

/// Consecutive calendar days starting at `start`, one per price.
pub fn make_daily_prices(start: &str, prices: &[f64]) -> Vec<PricePoint> {
    let first = date(start);
    prices
        .iter()
        .enumerate()
        .map(|(i, &price)| PricePoint {
            date: first + chrono::Duration::days(i as i64),
            price,
        })
        .collect()
}

/// Gently rising price path with a dip in the middle.
pub fn make_trending_prices(start: &str, n: usize, base: f64) -> Vec<PricePoint> {
    let values: Vec<f64> = (0..n)
        .map(|i| {
            let t = i as f64;
            let dip = if (n / 3..n / 2).contains(&i) { -0.02 * base } else { 0.0 };
            base * (1.0 + 0.004 * t) + dip
        })
        .collect();
    make_daily_prices(start, &values)
}

/// Writes `<TICKER>.csv` with `date,close` rows.
pub fn write_price_csv(dir: &std::path::Path, ticker: &str, points: &[PricePoint]) {
    let mut content = String::from("date,close\n");
    for p in points {
        content.push_str(&format!("{},{}\n", p.date, p.price));
    }
    std::fs::write(dir.join(format!("{}.csv", ticker)), content).unwrap();
}
