//! Instrument universe: ticker list parsing and series loading.
//!
//! A ticker whose series can't be fetched (or is empty, or is malformed) is
//! skipped with a warning; the remaining tickers load normally.

use crate::domain::error::PullbackError;
use crate::domain::series_store::{InstrumentSeries, SeriesStore};
use crate::ports::data_port::DataPort;
use std::collections::HashSet;
use tracing::{info, warn};

#[derive(Debug, Clone, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in code list")]
    EmptyToken,

    #[error("duplicate code: {0}")]
    DuplicateCode(String),
}

pub fn parse_codes(input: &str) -> Result<Vec<String>, UniverseError> {
    let mut codes = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let code = trimmed.to_uppercase();
        if !seen.insert(code.clone()) {
            return Err(UniverseError::DuplicateCode(code));
        }
        codes.push(code);
    }

    Ok(codes)
}

#[derive(Debug, Clone)]
pub struct SkippedCode {
    pub code: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    FetchFailed(String),
    NoData,
    Malformed(String),
}

#[derive(Debug)]
pub struct UniverseLoad {
    pub store: SeriesStore,
    pub skipped: Vec<SkippedCode>,
}

pub fn load_universe(data_port: &dyn DataPort, codes: &[String]) -> Result<UniverseLoad, PullbackError> {
    let mut store = SeriesStore::new();
    let mut skipped = Vec::new();

    for code in codes {
        let reason = match data_port.fetch_series(code) {
            Err(e) => SkipReason::FetchFailed(e.to_string()),
            Ok(bars) if bars.is_empty() => SkipReason::NoData,
            Ok(bars) => match InstrumentSeries::new(code.as_str(), bars) {
                Ok(series) => {
                    info!(code = %code, bars = series.len(), "loaded series");
                    store.push(series);
                    continue;
                }
                Err(e) => SkipReason::Malformed(e.to_string()),
            },
        };

        warn!(code = %code, reason = ?reason, "skipping instrument");
        skipped.push(SkippedCode {
            code: code.clone(),
            reason,
        });
    }

    if store.is_empty() {
        return Err(PullbackError::NoInstruments {
            requested: codes.len(),
        });
    }

    if !skipped.is_empty() {
        info!(
            loaded = store.len(),
            requested = codes.len(),
            "universe partially loaded"
        );
    }

    Ok(UniverseLoad { store, skipped })
}
