//! Ordered per-instrument price series.

use crate::domain::error::PullbackError;
use crate::domain::ohlcv::PriceBar;
use chrono::NaiveDate;
use std::collections::HashMap;

/// One instrument's bars, strictly increasing by date.
#[derive(Debug, Clone)]
pub struct InstrumentSeries {
    code: String,
    bars: Vec<PriceBar>,
    date_index: HashMap<NaiveDate, usize>,
}

impl InstrumentSeries {
    /// Sorts `bars` by date and rejects duplicate dates.
    pub fn new(code: impl Into<String>, mut bars: Vec<PriceBar>) -> Result<Self, PullbackError> {
        let code = code.into();
        bars.sort_by_key(|b| b.date);

        if let Some(pair) = bars.windows(2).find(|w| w[0].date == w[1].date) {
            return Err(PullbackError::DuplicateDate {
                code,
                date: pair[0].date,
            });
        }

        let date_index = bars
            .iter()
            .enumerate()
            .map(|(i, bar)| (bar.date, i))
            .collect();

        Ok(Self {
            code,
            bars,
            date_index,
        })
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bar(&self, date: NaiveDate) -> Option<&PriceBar> {
        self.date_index.get(&date).map(|&i| &self.bars[i])
    }

    pub fn bar_index(&self, date: NaiveDate) -> Option<usize> {
        self.date_index.get(&date).copied()
    }

    /// First date, last date and bar count.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate, usize)> {
        match (self.bars.first(), self.bars.last()) {
            (Some(first), Some(last)) => Some((first.date, last.date, self.bars.len())),
            _ => None,
        }
    }
}

/// Instruments in the order they were supplied. Run order follows this list.
#[derive(Debug, Clone, Default)]
pub struct SeriesStore {
    instruments: Vec<InstrumentSeries>,
}

impl SeriesStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, series: InstrumentSeries) {
        self.instruments.push(series);
    }

    pub fn iter(&self) -> impl Iterator<Item = &InstrumentSeries> {
        self.instruments.iter()
    }

    pub fn instruments(&self) -> &[InstrumentSeries] {
        &self.instruments
    }

    pub fn get(&self, code: &str) -> Option<&InstrumentSeries> {
        self.instruments.iter().find(|s| s.code == code)
    }

    pub fn codes(&self) -> Vec<&str> {
        self.instruments.iter().map(|s| s.code()).collect()
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }
}

impl FromIterator<InstrumentSeries> for SeriesStore {
    fn from_iter<T: IntoIterator<Item = InstrumentSeries>>(iter: T) -> Self {
        SeriesStore {
            instruments: iter.into_iter().collect(),
        }
    }
}
