//! Forward-walk trade simulation.
//!
//! Each flagged bar is evaluated on its own: the walk starts the bar after
//! entry, runs at most `max_hold_days` bars (and never past the last bar),
//! keeps the best return seen, and stops at the first new best whose
//! magnitude breaches the drawdown threshold. Overlapping horizons are not
//! suppressed.

use chrono::NaiveDate;
use tracing::debug;

use crate::domain::ohlcv::PriceBar;

pub const DEFAULT_COMMISSION_RATE: f64 = 0.008;
pub const DEFAULT_DRAWDOWN_THRESHOLD: f64 = 0.10;
pub const DEFAULT_MAX_HOLD_DAYS: usize = 14;

/// Immutable per-run simulation parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    /// Round-trip commission as a fraction, subtracted once from every return.
    pub commission_rate: f64,
    /// Fractional return magnitude that forces an early exit.
    pub drawdown_threshold: f64,
    pub max_hold_days: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            commission_rate: DEFAULT_COMMISSION_RATE,
            drawdown_threshold: DEFAULT_DRAWDOWN_THRESHOLD,
            max_hold_days: DEFAULT_MAX_HOLD_DAYS,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TradeRecord {
    pub code: String,
    pub entry_date: NaiveDate,
    pub entry_price: f64,
    pub exit_date: NaiveDate,
    pub exit_price: f64,
    pub realized_return: f64,
    pub stop_loss_price: Option<f64>,
    pub position_taken: bool,
    /// Forward bars walked before the horizon ended or the stop fired.
    pub bars_examined: usize,
}

impl TradeRecord {
    pub fn stopped_out(&self) -> bool {
        self.stop_loss_price.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationOutput {
    pub trades: Vec<TradeRecord>,
    /// Flagged bars with no forward bars left to evaluate.
    pub horizon_exhausted: usize,
}

/// Forward bars available to a trade entered at `start`.
pub fn effective_horizon(start: usize, last_index: usize, max_hold_days: usize) -> usize {
    max_hold_days.min(last_index.saturating_sub(start))
}

/// Return for exiting at `price` after entering at `entry_price`, net of commission.
pub fn net_return(entry_price: f64, price: f64, commission_rate: f64) -> f64 {
    (price - entry_price) / entry_price - commission_rate
}

/// Simulate one entry. `None` when the entry sits on the last bar (or past it).
pub fn simulate_entry(
    code: &str,
    bars: &[PriceBar],
    start: usize,
    config: &SimulationConfig,
) -> Option<TradeRecord> {
    let entry = bars.get(start)?;
    let horizon = effective_horizon(start, bars.len().saturating_sub(1), config.max_hold_days);
    if horizon == 0 {
        return None;
    }

    let entry_price = entry.adjusted_close;
    let mut best: Option<(f64, usize)> = None;
    let mut stop_loss_price = None;
    let mut bars_examined = 0;

    for end in (start + 1)..=(start + horizon) {
        bars_examined += 1;
        let price = bars[end].adjusted_close;
        let pnl = net_return(entry_price, price, config.commission_rate);

        if best.is_none_or(|(best_pnl, _)| pnl > best_pnl) {
            best = Some((pnl, end));
            if pnl.abs() > config.drawdown_threshold {
                stop_loss_price = Some(price);
                break;
            }
        }
    }

    let (realized_return, exit_index) = best?;
    let exit = &bars[exit_index];

    Some(TradeRecord {
        code: code.to_string(),
        entry_date: entry.date,
        entry_price,
        exit_date: exit.date,
        exit_price: exit.adjusted_close,
        realized_return,
        stop_loss_price,
        position_taken: realized_return > 0.0,
        bars_examined,
    })
}

/// Simulate every flagged bar of one instrument in chronological order.
pub fn simulate_instrument(
    code: &str,
    bars: &[PriceBar],
    flags: &[bool],
    config: &SimulationConfig,
) -> SimulationOutput {
    let mut output = SimulationOutput::default();

    for (start, _) in flags.iter().enumerate().filter(|(_, flagged)| **flagged) {
        match simulate_entry(code, bars, start, config) {
            Some(trade) => {
                debug!(
                    code,
                    entry_date = %trade.entry_date,
                    exit_date = %trade.exit_date,
                    realized_return = trade.realized_return,
                    stopped_out = trade.stopped_out(),
                    "simulated entry"
                );
                output.trades.push(trade);
            }
            None => {
                if let Some(bar) = bars.get(start) {
                    debug!(code, entry_date = %bar.date, "no forward bars; entry skipped");
                }
                output.horizon_exhausted += 1;
            }
        }
    }

    output
}
