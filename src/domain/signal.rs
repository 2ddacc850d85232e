//! Bullish pullback entry signal.
//!
//! A bar is an entry when all of the following hold:
//! - EMAs stacked strictly descending by period (e.g. EMA8 > EMA21 > EMA34)
//! - SMAs stacked the same way (e.g. SMA50 > SMA100 > SMA200)
//! - %K and %D at or below the stochastic threshold
//! - RSI at or below the RSI threshold
//! - adjusted close above the day's low
//!
//! Any undefined input makes the bar a non-entry.

use crate::domain::indicator::IndicatorSeries;
use crate::domain::indicator_set::IndicatorSet;
use crate::domain::ohlcv::PriceBar;

pub const DEFAULT_STOCHASTIC_THRESHOLD: f64 = 40.0;
pub const DEFAULT_RSI_THRESHOLD: f64 = 10.0;

#[derive(Debug, Clone, PartialEq)]
pub struct SignalConfig {
    pub stochastic_threshold: f64,
    pub rsi_threshold: f64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        SignalConfig {
            stochastic_threshold: DEFAULT_STOCHASTIC_THRESHOLD,
            rsi_threshold: DEFAULT_RSI_THRESHOLD,
        }
    }
}

pub fn entry_at(bars: &[PriceBar], set: &IndicatorSet, config: &SignalConfig, index: usize) -> bool {
    let Some(bar) = bars.get(index) else {
        return false;
    };

    let retrace_k = at_or_below(&set.stochastic_k, index, config.stochastic_threshold)
        && at_or_below(&set.stochastic_d, index, config.stochastic_threshold);

    is_stacked(&set.ema, index)
        && is_stacked(&set.sma, index)
        && retrace_k
        && at_or_below(&set.rsi, index, config.rsi_threshold)
        && bar.closed_off_low()
}

pub fn detect_entries(bars: &[PriceBar], set: &IndicatorSet, config: &SignalConfig) -> Vec<bool> {
    (0..bars.len())
        .map(|i| entry_at(bars, set, config, i))
        .collect()
}

/// Drop the leading `count` rows from bars, indicators and flags together.
pub fn trim_warmup(
    bars: &[PriceBar],
    set: &IndicatorSet,
    flags: &[bool],
    count: usize,
) -> (Vec<PriceBar>, IndicatorSet, Vec<bool>) {
    let count = count.min(bars.len());
    (
        bars[count..].to_vec(),
        set.skip_leading(count),
        flags.iter().skip(count).copied().collect(),
    )
}

/// Every value defined and each strictly greater than the next.
/// Fewer than two series can't form a trend.
fn is_stacked(series: &[IndicatorSeries], index: usize) -> bool {
    if series.len() < 2 {
        return false;
    }
    let values: Option<Vec<f64>> = series.iter().map(|s| s.value_at(index)).collect();
    match values {
        Some(v) => v.windows(2).all(|w| w[0] > w[1]),
        None => false,
    }
}

fn at_or_below(series: &IndicatorSeries, index: usize, threshold: f64) -> bool {
    series.value_at(index).is_some_and(|v| v <= threshold)
}
