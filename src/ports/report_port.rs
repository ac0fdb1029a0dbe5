//! Report sink port trait.

use crate::domain::daily_report::DailyReport;
use crate::domain::error::QuantError;

/// Append-only destination for daily report snapshots.
pub trait ReportSink {
    fn append(&self, report: &DailyReport) -> Result<(), QuantError>;
}
