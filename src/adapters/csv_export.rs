//! CSV result export.
//!
//! Per instrument:
//! - `{code}_results.csv`: one row per simulated trade, with the capital
//!   columns filled only where the trade was reinvested. Instruments with no
//!   trades get no results file.
//! - `{code}_signals.csv`: the post-warmup bars with every indicator column
//!   and the entry flag, for plotting.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::domain::backtest::{BacktestResult, InstrumentResult};
use crate::domain::capital::Reinvestment;
use crate::domain::error::PullbackError;
use crate::ports::report_port::ReportPort;

const RESULTS_HEADER: [&str; 10] = [
    "Date",
    "Entry Point",
    "Adj Close",
    "PNL",
    "End date",
    "Position",
    "Start Price",
    "Stop Loss",
    "Reinvested Amount",
    "Total Amount",
];

#[derive(Debug, Clone)]
pub struct CsvExporter {
    signals: bool,
}

impl CsvExporter {
    pub fn new() -> Self {
        CsvExporter { signals: true }
    }

    /// Skip the per-bar signals file.
    pub fn results_only() -> Self {
        CsvExporter { signals: false }
    }

    pub fn results_path(output_dir: &Path, code: &str) -> PathBuf {
        output_dir.join(format!("{}_results.csv", code))
    }

    pub fn signals_path(output_dir: &Path, code: &str) -> PathBuf {
        output_dir.join(format!("{}_signals.csv", code))
    }

    fn write_results(&self, result: &InstrumentResult, output_dir: &Path) -> Result<(), PullbackError> {
        let analysis = &result.analysis;
        let path = Self::results_path(output_dir, &analysis.code);
        let mut wtr = csv::Writer::from_path(&path).map_err(export_err)?;
        wtr.write_record(RESULTS_HEADER).map_err(export_err)?;

        for trade in &analysis.trades {
            let reinvestment: Option<&Reinvestment> = result
                .reinvestments
                .iter()
                .find(|r| r.entry_date == trade.entry_date);
            let position = trade.position_taken;

            wtr.write_record([
                trade.entry_date.to_string(),
                "1".to_string(),
                trade.entry_price.to_string(),
                trade.realized_return.to_string(),
                trade.exit_date.to_string(),
                u8::from(position).to_string(),
                opt(position.then_some(trade.entry_price)),
                opt(trade.stop_loss_price.filter(|_| position)),
                opt(reinvestment.map(|r| r.amount)),
                opt(reinvestment.map(|r| r.balance_after)),
            ])
            .map_err(export_err)?;
        }

        wtr.flush()?;
        info!(code = %analysis.code, rows = analysis.trades.len(), path = %path.display(), "results exported");
        Ok(())
    }

    fn write_signals(&self, result: &InstrumentResult, output_dir: &Path) -> Result<(), PullbackError> {
        let analysis = &result.analysis;
        let series = analysis.indicators.all_series();
        let path = Self::signals_path(output_dir, &analysis.code);
        let mut wtr = csv::Writer::from_path(&path).map_err(export_err)?;

        let mut header: Vec<String> = ["Date", "Open", "High", "Low", "Close", "Adj Close", "Volume"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        header.extend(series.iter().map(|s| s.indicator_type.to_string()));
        header.push("Entry Point".to_string());
        wtr.write_record(&header).map_err(export_err)?;

        for (i, bar) in analysis.bars.iter().enumerate() {
            let mut row = vec![
                bar.date.to_string(),
                bar.open.to_string(),
                bar.high.to_string(),
                bar.low.to_string(),
                bar.close.to_string(),
                bar.adjusted_close.to_string(),
                bar.volume.to_string(),
            ];
            row.extend(series.iter().map(|s| opt(s.value_at(i))));
            let flagged = analysis.entry_flags.get(i).copied().unwrap_or(false);
            row.push(u8::from(flagged).to_string());
            wtr.write_record(&row).map_err(export_err)?;
        }

        wtr.flush()?;
        Ok(())
    }
}

impl Default for CsvExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportPort for CsvExporter {
    fn write(&self, result: &BacktestResult, output_dir: &Path) -> Result<(), PullbackError> {
        fs::create_dir_all(output_dir)?;

        for instrument in &result.instruments {
            if instrument.analysis.trades.is_empty() {
                info!(code = %instrument.code(), "no entries, results file skipped");
            } else {
                self.write_results(instrument, output_dir)?;
            }
            if self.signals {
                self.write_signals(instrument, output_dir)?;
            }
        }
        Ok(())
    }
}

fn opt(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn export_err(e: csv::Error) -> PullbackError {
    PullbackError::Export {
        reason: e.to_string(),
    }
}
