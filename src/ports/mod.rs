//! Port traits for the collaborators around the analytics core.

pub mod config_port;
pub mod data_port;
pub mod report_port;
