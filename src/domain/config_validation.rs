//! Configuration validation.
//!
//! Validates all config fields before any analysis runs.

use crate::domain::daily_report::MAX_LOOKBACK_DAYS;
use crate::domain::error::QuantError;
use crate::domain::portfolio::{RebalanceFrequency, MIN_PORTFOLIO_ASSETS};
use crate::domain::strategy::{DEFAULT_LONG_WINDOW, DEFAULT_SHORT_WINDOW};
use crate::domain::universe::parse_tickers;
use crate::ports::config_port::ConfigPort;

pub fn validate_analysis_config(config: &dyn ConfigPort) -> Result<(), QuantError> {
    validate_data_dir(config)?;
    validate_dates(config)?;
    validate_risk_free_rate(config)?;
    Ok(())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), QuantError> {
    validate_ticker(config, "strategy")?;
    validate_windows(config)?;
    validate_positive(config, "strategy", "momentum_lookback")?;
    Ok(())
}

pub fn validate_portfolio_config(config: &dyn ConfigPort) -> Result<(), QuantError> {
    let count = validate_tickers(config)?;
    validate_weights(config, count)?;
    validate_rebalance(config)?;
    Ok(())
}

pub fn validate_report_config(config: &dyn ConfigPort) -> Result<(), QuantError> {
    validate_data_dir(config)?;
    validate_risk_free_rate(config)?;
    validate_lookback_days(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> QuantError {
    QuantError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn validate_data_dir(config: &dyn ConfigPort) -> Result<(), QuantError> {
    match config.get_string("data", "dir") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(QuantError::ConfigMissing {
            section: "data".to_string(),
            key: "dir".to_string(),
        }),
    }
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), QuantError> {
    let start_date = config.get_date("analysis", "start_date")?;
    let end_date = config.get_date("analysis", "end_date")?;

    if start_date >= end_date {
        return Err(invalid(
            "analysis",
            "start_date",
            "start_date must be before end_date",
        ));
    }
    Ok(())
}

fn validate_risk_free_rate(config: &dyn ConfigPort) -> Result<(), QuantError> {
    let value = config.get_double("analysis", "risk_free_rate", 0.0)?;
    if !(0.0..1.0).contains(&value) {
        return Err(invalid(
            "analysis",
            "risk_free_rate",
            "risk_free_rate must be between 0 and 1",
        ));
    }
    Ok(())
}

fn validate_ticker(config: &dyn ConfigPort, section: &str) -> Result<(), QuantError> {
    match config.get_string(section, "ticker") {
        Some(s) if s.trim().is_empty() => Err(invalid(section, "ticker", "ticker must not be empty")),
        _ => Ok(()),
    }
}

fn validate_positive(config: &dyn ConfigPort, section: &str, key: &str) -> Result<(), QuantError> {
    if config.get_int(section, key, 1)? < 1 {
        return Err(invalid(section, key, format!("{} must be at least 1", key)));
    }
    Ok(())
}

fn validate_lookback_days(config: &dyn ConfigPort) -> Result<(), QuantError> {
    validate_positive(config, "report", "lookback_days")?;
    if config.get_int("report", "lookback_days", 1)? > MAX_LOOKBACK_DAYS {
        return Err(invalid(
            "report",
            "lookback_days",
            format!("lookback_days must be at most {}", MAX_LOOKBACK_DAYS),
        ));
    }
    Ok(())
}

fn validate_windows(config: &dyn ConfigPort) -> Result<(), QuantError> {
    validate_positive(config, "strategy", "short_window")?;
    validate_positive(config, "strategy", "long_window")?;

    let short = config.get_int("strategy", "short_window", DEFAULT_SHORT_WINDOW as i64)?;
    let long = config.get_int("strategy", "long_window", DEFAULT_LONG_WINDOW as i64)?;
    if short >= long {
        return Err(invalid(
            "strategy",
            "short_window",
            "short_window must be strictly less than long_window",
        ));
    }
    Ok(())
}

fn validate_tickers(config: &dyn ConfigPort) -> Result<usize, QuantError> {
    let raw = config
        .get_string("portfolio", "tickers")
        .ok_or_else(|| QuantError::ConfigMissing {
            section: "portfolio".to_string(),
            key: "tickers".to_string(),
        })?;
    let tickers = parse_tickers(&raw).map_err(|e| invalid("portfolio", "tickers", e.to_string()))?;
    if tickers.len() < MIN_PORTFOLIO_ASSETS {
        return Err(invalid(
            "portfolio",
            "tickers",
            format!("at least {} tickers are required", MIN_PORTFOLIO_ASSETS),
        ));
    }
    Ok(tickers.len())
}

/// Parses a comma-separated weight list.
pub fn parse_weights(input: &str) -> Result<Vec<f64>, String> {
    input
        .split(',')
        .map(|token| {
            let token = token.trim();
            let w: f64 = token
                .parse()
                .map_err(|_| format!("'{}' is not a number", token))?;
            if !w.is_finite() || w < 0.0 {
                return Err(format!("{} must be finite and non-negative", token));
            }
            Ok(w)
        })
        .collect()
}

fn validate_weights(config: &dyn ConfigPort, ticker_count: usize) -> Result<(), QuantError> {
    let Some(raw) = config.get_string("portfolio", "weights").filter(|s| !s.trim().is_empty())
    else {
        return Ok(());
    };
    let weights = parse_weights(&raw).map_err(|reason| invalid("portfolio", "weights", reason))?;
    if weights.len() != ticker_count {
        return Err(invalid(
            "portfolio",
            "weights",
            format!("{} weights given for {} tickers", weights.len(), ticker_count),
        ));
    }
    Ok(())
}

fn validate_rebalance(config: &dyn ConfigPort) -> Result<(), QuantError> {
    if let Some(raw) = config.get_string("portfolio", "rebalance") {
        raw.parse::<RebalanceFrequency>()
            .map_err(|e| invalid("portfolio", "rebalance", e.to_string()))?;
    }
    Ok(())
}
