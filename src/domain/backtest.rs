//! Backtest run: indicators, signals and simulation per instrument, then a
//! single sequential capital replay across all instruments.
//!
//! Per-instrument analysis is independent and may run on the rayon pool;
//! results are collected back in store order before any capital is touched,
//! so compounding is always instrument-major and chronological.

use rayon::prelude::*;
use tracing::info;

use crate::domain::capital::{CapitalState, CapitalTracker, Reinvestment, DEFAULT_STARTING_BALANCE};
use crate::domain::indicator_set::{IndicatorConfig, IndicatorSet};
use crate::domain::ohlcv::PriceBar;
use crate::domain::series_store::{InstrumentSeries, SeriesStore};
use crate::domain::signal::{detect_entries, trim_warmup, SignalConfig};
use crate::domain::simulator::{simulate_instrument, SimulationConfig, TradeRecord};

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub starting_balance: f64,
    pub simulation: SimulationConfig,
    pub indicators: IndicatorConfig,
    pub signal: SignalConfig,
    /// Analyze instruments on the rayon pool.
    pub parallel: bool,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            starting_balance: DEFAULT_STARTING_BALANCE,
            simulation: SimulationConfig::default(),
            indicators: IndicatorConfig::default(),
            signal: SignalConfig::default(),
            parallel: false,
        }
    }
}

/// Everything derived for one instrument before capital is applied.
///
/// `bars`, `indicators` and `entry_flags` are aligned and exclude the
/// warmup rows.
#[derive(Debug, Clone)]
pub struct InstrumentAnalysis {
    pub code: String,
    pub bars: Vec<PriceBar>,
    pub indicators: IndicatorSet,
    pub entry_flags: Vec<bool>,
    pub trades: Vec<TradeRecord>,
    pub horizon_exhausted: usize,
    pub warmup_dropped: usize,
}

impl InstrumentAnalysis {
    pub fn entry_count(&self) -> usize {
        self.entry_flags.iter().filter(|f| **f).count()
    }
}

#[derive(Debug, Clone)]
pub struct InstrumentResult {
    pub analysis: InstrumentAnalysis,
    pub reinvestments: Vec<Reinvestment>,
    /// Run-wide balance after this instrument's trades.
    pub balance_after: f64,
    /// Run-wide reinvested total after this instrument's trades.
    pub total_reinvested_after: f64,
}

impl InstrumentResult {
    pub fn code(&self) -> &str {
        &self.analysis.code
    }
}

#[derive(Debug, Clone)]
pub struct BacktestResult {
    pub instruments: Vec<InstrumentResult>,
    pub capital: CapitalState,
}

impl BacktestResult {
    /// All trades in replay order.
    pub fn trades(&self) -> impl Iterator<Item = &TradeRecord> {
        self.instruments.iter().flat_map(|r| r.analysis.trades.iter())
    }
}

pub fn analyze_instrument(series: &InstrumentSeries, config: &BacktestConfig) -> InstrumentAnalysis {
    let bars = series.bars();
    let indicators = IndicatorSet::compute(bars, &config.indicators);
    let flags = detect_entries(bars, &indicators, &config.signal);

    let warmup = config.indicators.warmup_bars().min(bars.len());
    let (bars, indicators, entry_flags) = trim_warmup(bars, &indicators, &flags, warmup);

    let simulated = simulate_instrument(series.code(), &bars, &entry_flags, &config.simulation);

    InstrumentAnalysis {
        code: series.code().to_string(),
        bars,
        indicators,
        entry_flags,
        trades: simulated.trades,
        horizon_exhausted: simulated.horizon_exhausted,
        warmup_dropped: warmup,
    }
}

pub fn run_backtest(store: &SeriesStore, config: &BacktestConfig) -> BacktestResult {
    let analyses: Vec<InstrumentAnalysis> = if config.parallel {
        store
            .instruments()
            .par_iter()
            .map(|series| analyze_instrument(series, config))
            .collect()
    } else {
        store
            .iter()
            .map(|series| analyze_instrument(series, config))
            .collect()
    };

    let mut tracker = CapitalTracker::new(config.starting_balance);
    let instruments = analyses
        .into_iter()
        .map(|analysis| {
            let reinvestments = tracker.replay(&analysis.trades);
            info!(
                code = %analysis.code,
                entries = analysis.entry_count(),
                trades = analysis.trades.len(),
                positions = reinvestments.len(),
                total_reinvested = tracker.total_reinvested(),
                "instrument complete"
            );
            InstrumentResult {
                analysis,
                reinvestments,
                balance_after: tracker.balance(),
                total_reinvested_after: tracker.total_reinvested(),
            }
        })
        .collect();

    let capital = tracker.state();
    info!(
        final_balance = capital.final_balance,
        total_reinvested = capital.total_reinvested,
        "backtest complete"
    );

    BacktestResult {
        instruments,
        capital,
    }
}
