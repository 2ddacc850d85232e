//! Daily price bar representation.

use chrono::NaiveDate;

/// One instrument's OHLCV record for a single trading day.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub adjusted_close: f64,
    pub volume: i64,
}

impl PriceBar {
    /// Adjusted close strictly above the day's low.
    pub fn closed_off_low(&self) -> bool {
        self.adjusted_close > self.low
    }

    pub fn is_finite(&self) -> bool {
        [self.open, self.high, self.low, self.close, self.adjusted_close]
            .iter()
            .all(|v| v.is_finite())
    }
}
