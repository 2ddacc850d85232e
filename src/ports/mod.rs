//! Port traits for the backtester's external collaborators.

pub mod config_port;
pub mod data_port;
pub mod report_port;
