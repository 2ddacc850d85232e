//! Core domain types and logic.

pub mod ohlcv;
pub mod error;
pub mod indicator;
pub mod indicator_set;
pub mod series_store;
pub mod universe;
pub mod signal;
pub mod simulator;
pub mod capital;
pub mod backtest;
pub mod metrics;
pub mod config_validation;
