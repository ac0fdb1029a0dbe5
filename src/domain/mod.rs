//! Core domain types and analytics.

pub mod analysis;
pub mod config_validation;
pub mod daily_report;
pub mod error;
pub mod indicator;
pub mod metrics;
pub mod portfolio;
pub mod prices;
pub mod returns;
pub mod signal;
pub mod strategy;
pub mod universe;
