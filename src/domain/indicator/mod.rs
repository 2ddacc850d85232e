//! Technical indicator implementations.
//!
//! Every indicator produces an [`IndicatorSeries`] aligned 1:1 with the input
//! bars. Bars without enough history (or with a degenerate window) carry
//! `None` rather than a numeric placeholder.

pub mod ema;
pub mod rsi;
pub mod sma;
pub mod stochastic;

pub use ema::calculate_ema;
pub use rsi::calculate_rsi;
pub use sma::calculate_sma;
pub use stochastic::{calculate_stochastic, StochasticSeries, DEFAULT_D_PERIOD, DEFAULT_K_PERIOD};

use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Ema(usize),
    Sma(usize),
    Rsi(usize),
    StochasticK(usize),
    StochasticD { k_period: usize, d_period: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    pub fn empty(indicator_type: IndicatorType) -> Self {
        Self {
            indicator_type,
            values: Vec::new(),
        }
    }

    /// Value at bar `index`; `None` when undefined or out of range.
    pub fn value_at(&self, index: usize) -> Option<f64> {
        self.values.get(index).and_then(|p| p.value)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn first_defined(&self) -> Option<usize> {
        self.values.iter().position(|p| p.value.is_some())
    }

    /// Drop the first `count` points, keeping the series aligned with trimmed bars.
    pub fn skip_leading(&self, count: usize) -> Self {
        Self {
            indicator_type: self.indicator_type,
            values: self.values.iter().skip(count).cloned().collect(),
        }
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Ema(period) => write!(f, "EMA_{}", period),
            IndicatorType::Sma(period) => write!(f, "SMA_{}", period),
            IndicatorType::Rsi(period) => write!(f, "RSI_{}", period),
            IndicatorType::StochasticK(k_period) => write!(f, "%K_{}", k_period),
            IndicatorType::StochasticD { k_period, d_period } => {
                write!(f, "%D_{}_{}", k_period, d_period)
            }
        }
    }
}
