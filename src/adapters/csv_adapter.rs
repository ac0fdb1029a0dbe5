//! CSV file price adapter.

use crate::domain::error::QuantError;
use crate::domain::prices::{PricePoint, PriceSeries};
use crate::ports::data_port::PriceSource;
use chrono::NaiveDate;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

/// Accepted names for the closing price column, in order of preference.
const PRICE_COLUMNS: [&str; 4] = ["close", "adj_close", "adj close", "price"];

/// Reads `<TICKER>.csv` files from a base directory.
pub struct CsvPriceSource {
    base_path: PathBuf,
}

impl CsvPriceSource {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, ticker: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", ticker))
    }
}

fn column_index(headers: &csv::StringRecord, names: &[&str]) -> Option<usize> {
    names.iter().find_map(|name| {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
    })
}

impl PriceSource for CsvPriceSource {
    fn fetch_prices(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Option<PriceSeries>, QuantError> {
        let path = self.csv_path(ticker);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no price file");
                return Ok(None);
            }
            Err(e) => {
                return Err(QuantError::DataSource {
                    reason: format!("failed to read {}: {}", path.display(), e),
                });
            }
        };

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr.headers().map_err(|e| QuantError::DataSource {
            reason: format!("CSV header error in {}: {}", path.display(), e),
        })?;
        let date_col = column_index(headers, &["date"]).ok_or_else(|| QuantError::DataSource {
            reason: format!("{}: missing date column", path.display()),
        })?;
        let price_col = column_index(headers, &PRICE_COLUMNS).ok_or_else(|| {
            QuantError::DataSource {
                reason: format!("{}: missing close column", path.display()),
            }
        })?;

        let mut points = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| QuantError::DataSource {
                reason: format!("CSV parse error: {}", e),
            })?;

            let date_str = record.get(date_col).unwrap_or("").trim();
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                QuantError::DataSource {
                    reason: format!("invalid date '{}': {}", date_str, e),
                }
            })?;

            if date < start || date >= end {
                continue;
            }

            // Missing quotes show up as empty or "null" cells.
            let price = match record.get(price_col).map(|v| v.trim().parse::<f64>()) {
                Some(Ok(p)) if p.is_finite() && p > 0.0 => p,
                _ => continue,
            };

            points.push(PricePoint { date, price });
        }

        points.sort_by_key(|p| p.date);
        // Keep the last row for a repeated date.
        points.reverse();
        points.dedup_by_key(|p| p.date);
        points.reverse();

        if points.is_empty() {
            return Ok(None);
        }
        PriceSeries::new(points).map(Some)
    }
}
