//! Per-instrument and run-level summary statistics.

use super::backtest::{BacktestResult, InstrumentResult};
use super::simulator::TradeRecord;

#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentSummary {
    pub code: String,
    pub entries: usize,
    pub trades: usize,
    pub positions_taken: usize,
    pub stopped_out: usize,
    pub horizon_exhausted: usize,
    pub win_rate: f64,
    pub avg_return: f64,
    pub best_return: f64,
    pub worst_return: f64,
    pub reinvested: f64,
}

impl InstrumentSummary {
    pub fn compute(result: &InstrumentResult) -> Self {
        let analysis = &result.analysis;
        let stats = TradeStats::from_trades(&analysis.trades);

        InstrumentSummary {
            code: analysis.code.clone(),
            entries: analysis.entry_count(),
            trades: analysis.trades.len(),
            positions_taken: stats.positions_taken,
            stopped_out: stats.stopped_out,
            horizon_exhausted: analysis.horizon_exhausted,
            win_rate: stats.win_rate(analysis.trades.len()),
            avg_return: stats.avg_return(analysis.trades.len()),
            best_return: stats.best,
            worst_return: stats.worst,
            reinvested: result.reinvestments.iter().map(|r| r.amount).sum(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub instruments: Vec<InstrumentSummary>,
    pub total_entries: usize,
    pub total_trades: usize,
    pub positions_taken: usize,
    pub stopped_out: usize,
    pub win_rate: f64,
    pub avg_return: f64,
    pub starting_balance: f64,
    pub final_balance: f64,
    pub total_reinvested: f64,
    pub total_return: f64,
}

impl RunSummary {
    pub fn compute(result: &BacktestResult) -> Self {
        let instruments: Vec<InstrumentSummary> =
            result.instruments.iter().map(InstrumentSummary::compute).collect();
        let trades: Vec<TradeRecord> = result.trades().cloned().collect();
        let stats = TradeStats::from_trades(&trades);

        let capital = result.capital;
        let total_return = if capital.starting_balance > 0.0 {
            (capital.final_balance - capital.starting_balance) / capital.starting_balance
        } else {
            0.0
        };

        RunSummary {
            total_entries: instruments.iter().map(|s| s.entries).sum(),
            total_trades: trades.len(),
            positions_taken: stats.positions_taken,
            stopped_out: stats.stopped_out,
            win_rate: stats.win_rate(trades.len()),
            avg_return: stats.avg_return(trades.len()),
            starting_balance: capital.starting_balance,
            final_balance: capital.final_balance,
            total_reinvested: capital.total_reinvested,
            total_return,
            instruments,
        }
    }
}

struct TradeStats {
    positions_taken: usize,
    stopped_out: usize,
    return_sum: f64,
    best: f64,
    worst: f64,
}

impl TradeStats {
    fn from_trades(trades: &[TradeRecord]) -> Self {
        let mut stats = TradeStats {
            positions_taken: 0,
            stopped_out: 0,
            return_sum: 0.0,
            best: 0.0,
            worst: 0.0,
        };
        for (i, trade) in trades.iter().enumerate() {
            if trade.position_taken {
                stats.positions_taken += 1;
            }
            if trade.stopped_out() {
                stats.stopped_out += 1;
            }
            stats.return_sum += trade.realized_return;
            if i == 0 || trade.realized_return > stats.best {
                stats.best = trade.realized_return;
            }
            if i == 0 || trade.realized_return < stats.worst {
                stats.worst = trade.realized_return;
            }
        }
        stats
    }

    fn win_rate(&self, total: usize) -> f64 {
        if total > 0 {
            self.positions_taken as f64 / total as f64
        } else {
            0.0
        }
    }

    fn avg_return(&self, total: usize) -> f64 {
        if total > 0 {
            self.return_sum / total as f64
        } else {
            0.0
        }
    }
}
