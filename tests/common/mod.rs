#![allow(dead_code)]

use chrono::NaiveDate;
use pullback::domain::error::PullbackError;
pub use pullback::domain::ohlcv::PriceBar;
use pullback::ports::data_port::DataPort;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<PriceBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, code: &str, bars: Vec<PriceBar>) -> Self {
        self.data.insert(code.to_string(), bars);
        self
    }

    pub fn with_error(mut self, code: &str, reason: &str) -> Self {
        self.errors.insert(code.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_series(&self, code: &str) -> Result<Vec<PriceBar>, PullbackError> {
        if let Some(reason) = self.errors.get(code) {
            return Err(PullbackError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self.data.get(code).cloned().unwrap_or_default())
    }

    fn list_symbols(&self) -> Result<Vec<String>, PullbackError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(date: &str, close: f64) -> PriceBar {
    PriceBar {
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        open: close - 1.0,
        high: close + 1.0,
        low: close - 2.0,
        close,
        adjusted_close: close,
        volume: 1000,
    }
}

/// Bars from a close series on consecutive days. High and low sit 1% either
/// side of the close.
pub fn bars_from_closes(start_date: &str, closes: &[f64]) -> Vec<PriceBar> {
    let start = NaiveDate::parse_from_str(start_date, "%Y-%m-%d").unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PriceBar {
            date: start + chrono::Days::new(i as u64),
            open: close,
            high: close * 1.01,
            low: close * 0.99,
            close,
            adjusted_close: close,
            volume: 10_000 + i as i64,
        })
        .collect()
}

/// Steady uptrend that pulls back every tenth bar: eight days of +1%, then
/// two days of -3%. Under the default indicator set the second down day
/// (index % 10 == 9) is an entry once the 200-bar SMA is defined, and each
/// entry's best exit is eight bars later at +1%^8 less commission.
pub fn pullback_closes(count: usize, start_price: f64) -> Vec<f64> {
    let mut closes = Vec::with_capacity(count);
    let mut price = start_price;
    for i in 0..count {
        if i > 0 {
            let down = i % 10 >= 8;
            price *= if down { 0.97 } else { 1.01 };
        }
        closes.push(price);
    }
    closes
}

pub fn pullback_bars(count: usize, start_price: f64) -> Vec<PriceBar> {
    bars_from_closes("2020-01-01", &pullback_closes(count, start_price))
}

/// Best return of every trade in a `pullback_bars` series.
pub fn pullback_trade_return() -> f64 {
    1.01_f64.powi(8) - 1.0 - 0.008
}

pub fn generate_bars(start_date: &str, count: usize, start_price: f64) -> Vec<PriceBar> {
    let closes: Vec<f64> = (0..count)
        .map(|i| start_price + (i as f64 * 0.1).sin() * 5.0 + i as f64 * 0.05)
        .collect();
    bars_from_closes(start_date, &closes)
}
