//! Domain error types.

use chrono::NaiveDate;

use crate::domain::universe::UniverseError;

/// Top-level error type for quantdash.
#[derive(Debug, thiserror::Error)]
pub enum QuantError {
    #[error("no data for {ticker}")]
    NoData { ticker: String },

    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("portfolio needs at least {need} assets with valid data, have {have}")]
    InsufficientAssets { have: usize, need: usize },

    #[error("asset return series share no common dates")]
    NoOverlappingDates,

    #[error("invalid price {price} on {date}: prices must be finite and positive")]
    InvalidPrice { date: NaiveDate, price: f64 },

    #[error("dates out of order: {date} does not follow {previous}")]
    UnorderedDates {
        previous: NaiveDate,
        date: NaiveDate,
    },

    #[error("price source error: {reason}")]
    DataSource { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Universe(#[from] UniverseError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl QuantError {
    pub fn invalid_parameter(name: &str, reason: impl Into<String>) -> Self {
        QuantError::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&QuantError> for std::process::ExitCode {
    fn from(err: &QuantError) -> Self {
        let code: u8 = match err {
            QuantError::Io(_) => 1,
            QuantError::ConfigParse { .. }
            | QuantError::ConfigMissing { .. }
            | QuantError::ConfigInvalid { .. }
            | QuantError::Universe(_) => 2,
            QuantError::DataSource { .. }
            | QuantError::InvalidPrice { .. }
            | QuantError::UnorderedDates { .. } => 3,
            QuantError::InvalidParameter { .. } | QuantError::InsufficientAssets { .. } => 4,
            QuantError::NoData { .. } | QuantError::NoOverlappingDates => 5,
        };
        std::process::ExitCode::from(code)
    }
}
