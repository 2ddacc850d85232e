//! Price series source port.

use crate::domain::error::PullbackError;
use crate::domain::ohlcv::PriceBar;

pub trait DataPort {
    /// Every available daily bar for `code`, any order.
    fn fetch_series(&self, code: &str) -> Result<Vec<PriceBar>, PullbackError>;

    fn list_symbols(&self) -> Result<Vec<String>, PullbackError>;
}
