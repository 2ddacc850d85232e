//! Stochastic Oscillator (%K/%D).
//!
//! %K[i] = (C[i] - lowest_low(k)) / (highest_high(k) - lowest_low(k)), on a 0..1 scale.
//! %D[i] = SMA(%K, d).
//! %K is undefined during the first (k-1) bars and wherever the window's
//! high equals its low; %D is undefined if any %K in its window is.

use crate::domain::indicator::sma::rolling_mean_opt;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::PriceBar;

pub const DEFAULT_K_PERIOD: usize = 8;
pub const DEFAULT_D_PERIOD: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct StochasticSeries {
    pub k: IndicatorSeries,
    pub d: IndicatorSeries,
}

pub fn calculate_stochastic(bars: &[PriceBar], k_period: usize, d_period: usize) -> StochasticSeries {
    let k_values: Vec<Option<f64>> = (0..bars.len())
        .map(|i| percent_k(bars, i, k_period))
        .collect();
    let d_values = rolling_mean_opt(&k_values, d_period);

    let to_points = |values: Vec<Option<f64>>| -> Vec<IndicatorPoint> {
        values
            .into_iter()
            .zip(bars)
            .map(|(value, bar)| IndicatorPoint {
                date: bar.date,
                value,
            })
            .collect()
    };

    StochasticSeries {
        k: IndicatorSeries {
            indicator_type: IndicatorType::StochasticK(k_period),
            values: to_points(k_values),
        },
        d: IndicatorSeries {
            indicator_type: IndicatorType::StochasticD { k_period, d_period },
            values: to_points(d_values),
        },
    }
}

fn percent_k(bars: &[PriceBar], i: usize, k_period: usize) -> Option<f64> {
    if k_period == 0 || i + 1 < k_period {
        return None;
    }
    let window = &bars[i + 1 - k_period..=i];
    let highest = window.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
    let lowest = window.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
    let range = highest - lowest;
    if range == 0.0 {
        return None;
    }
    Some((bars[i].close - lowest) / range)
}
