//! Configuration access port trait.

use chrono::NaiveDate;

use crate::domain::error::QuantError;

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;

    /// `default` when the key is absent; `ConfigInvalid` when it is present
    /// but not an integer.
    fn get_int(&self, section: &str, key: &str, default: i64) -> Result<i64, QuantError>;

    /// `default` when the key is absent; `ConfigInvalid` when it is present
    /// but not a number.
    fn get_double(&self, section: &str, key: &str, default: f64) -> Result<f64, QuantError>;

    /// A required `YYYY-MM-DD` date.
    fn get_date(&self, section: &str, key: &str) -> Result<NaiveDate, QuantError> {
        let raw = self
            .get_string(section, key)
            .ok_or_else(|| QuantError::ConfigMissing {
                section: section.to_string(),
                key: key.to_string(),
            })?;
        NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| QuantError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: "invalid date format (expected YYYY-MM-DD)".to_string(),
        })
    }
}
