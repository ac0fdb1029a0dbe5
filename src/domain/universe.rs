//! Ticker universe for portfolio analysis.
//!
//! Parses ticker lists from configuration and loads each ticker's returns,
//! skipping tickers the price source cannot serve.

use crate::domain::error::QuantError;
use crate::domain::portfolio::AssetReturns;
use crate::domain::prices::PriceSeries;
use crate::domain::returns::ReturnSeries;
use crate::ports::data_port::PriceSource;
use chrono::NaiveDate;
use std::collections::HashSet;

/// Minimum prices needed to produce at least one return.
pub const MIN_PRICES: usize = 2;

#[derive(Debug, Clone, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in ticker list")]
    EmptyToken,

    #[error("duplicate ticker: {0}")]
    DuplicateTicker(String),
}

pub fn parse_tickers(input: &str) -> Result<Vec<String>, UniverseError> {
    let mut tickers = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let ticker = trimmed.to_uppercase();
        if !seen.insert(ticker.clone()) {
            return Err(UniverseError::DuplicateTicker(ticker));
        }
        tickers.push(ticker);
    }

    Ok(tickers)
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedTicker {
    pub ticker: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    NoData,
    InsufficientPrices { prices: usize },
    SourceError(String),
}

#[derive(Debug, Clone)]
pub struct LoadedUniverse {
    pub assets: Vec<AssetReturns>,
    pub skipped: Vec<SkippedTicker>,
}

/// Fetches every ticker and keeps those with at least one return. Source
/// failures are treated like missing data for that ticker only.
pub fn load_universe(
    source: &dyn PriceSource,
    tickers: &[String],
    start: NaiveDate,
    end: NaiveDate,
) -> LoadedUniverse {
    let mut assets = Vec::new();
    let mut skipped = Vec::new();

    for ticker in tickers {
        let reason = match source.fetch_prices(ticker, start, end) {
            Ok(Some(prices)) if prices.len() >= MIN_PRICES => {
                tracing::info!(ticker = %ticker, prices = prices.len(), "loaded");
                assets.push(AssetReturns {
                    ticker: ticker.clone(),
                    returns: ReturnSeries::from_prices(&prices),
                });
                continue;
            }
            Ok(Some(prices)) => SkipReason::InsufficientPrices {
                prices: prices.len(),
            },
            Ok(None) => SkipReason::NoData,
            Err(e) => SkipReason::SourceError(e.to_string()),
        };

        tracing::warn!(ticker = %ticker, reason = ?reason, "no valid data, excluded from portfolio");
        skipped.push(SkippedTicker {
            ticker: ticker.clone(),
            reason,
        });
    }

    LoadedUniverse { assets, skipped }
}

/// Fetches one ticker, turning "no data" into [`QuantError::NoData`].
pub fn require_prices(
    source: &dyn PriceSource,
    ticker: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<PriceSeries, QuantError> {
    match source.fetch_prices(ticker, start, end)? {
        Some(prices) if !prices.is_empty() => Ok(prices),
        _ => Err(QuantError::NoData {
            ticker: ticker.to_string(),
        }),
    }
}
