//! Backtest output port.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::PullbackError;
use std::path::Path;

/// Writes a finished run somewhere under `output_dir`.
pub trait ReportPort {
    fn write(&self, result: &BacktestResult, output_dir: &Path) -> Result<(), PullbackError>;
}
