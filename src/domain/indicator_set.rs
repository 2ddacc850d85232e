//! Per-instrument bundle of every indicator the entry signal reads.

use crate::domain::indicator::{
    calculate_ema, calculate_rsi, calculate_sma, calculate_stochastic, IndicatorSeries,
};
use crate::domain::indicator::stochastic::{DEFAULT_D_PERIOD, DEFAULT_K_PERIOD};
use crate::domain::ohlcv::PriceBar;

pub const DEFAULT_EMA_PERIODS: [usize; 3] = [8, 21, 34];
pub const DEFAULT_SMA_PERIODS: [usize; 3] = [50, 100, 200];
pub const DEFAULT_RSI_PERIOD: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorConfig {
    pub ema_periods: Vec<usize>,
    pub sma_periods: Vec<usize>,
    pub rsi_period: usize,
    pub stochastic_k: usize,
    pub stochastic_d: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        IndicatorConfig {
            ema_periods: DEFAULT_EMA_PERIODS.to_vec(),
            sma_periods: DEFAULT_SMA_PERIODS.to_vec(),
            rsi_period: DEFAULT_RSI_PERIOD,
            stochastic_k: DEFAULT_K_PERIOD,
            stochastic_d: DEFAULT_D_PERIOD,
        }
    }
}

impl IndicatorConfig {
    /// Leading bars that lack the history for every configured indicator.
    ///
    /// EMA is defined from the first bar and contributes nothing.
    pub fn warmup_bars(&self) -> usize {
        let sma = self
            .sma_periods
            .iter()
            .map(|p| p.saturating_sub(1))
            .max()
            .unwrap_or(0);
        let stochastic = self.stochastic_k.saturating_sub(1) + self.stochastic_d.saturating_sub(1);
        sma.max(self.rsi_period).max(stochastic)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSet {
    /// One series per configured EMA period, in configured order.
    pub ema: Vec<IndicatorSeries>,
    /// One series per configured SMA period, in configured order.
    pub sma: Vec<IndicatorSeries>,
    pub rsi: IndicatorSeries,
    pub stochastic_k: IndicatorSeries,
    pub stochastic_d: IndicatorSeries,
}

impl IndicatorSet {
    pub fn compute(bars: &[PriceBar], config: &IndicatorConfig) -> Self {
        let stochastic = calculate_stochastic(bars, config.stochastic_k, config.stochastic_d);
        IndicatorSet {
            ema: config
                .ema_periods
                .iter()
                .map(|&p| calculate_ema(bars, p))
                .collect(),
            sma: config
                .sma_periods
                .iter()
                .map(|&p| calculate_sma(bars, p))
                .collect(),
            rsi: calculate_rsi(bars, config.rsi_period),
            stochastic_k: stochastic.k,
            stochastic_d: stochastic.d,
        }
    }

    /// All series in export column order.
    pub fn all_series(&self) -> Vec<&IndicatorSeries> {
        self.ema
            .iter()
            .chain(self.sma.iter())
            .chain([&self.rsi, &self.stochastic_k, &self.stochastic_d])
            .collect()
    }

    pub fn skip_leading(&self, count: usize) -> Self {
        IndicatorSet {
            ema: self.ema.iter().map(|s| s.skip_leading(count)).collect(),
            sma: self.sma.iter().map(|s| s.skip_leading(count)).collect(),
            rsi: self.rsi.skip_leading(count),
            stochastic_k: self.stochastic_k.skip_leading(count),
            stochastic_d: self.stochastic_d.skip_leading(count),
        }
    }
}
