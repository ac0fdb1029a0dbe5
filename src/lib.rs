//! quantdash — return series, trading strategies, performance metrics and
//! portfolio composition over daily closing prices.
//!
//! Hexagonal architecture: pure analytics in [`domain`], port traits in
//! [`ports`], concrete implementations in [`adapters`].

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod ports;
