//! Domain error types.

use chrono::NaiveDate;

/// Top-level error type for pullback.
#[derive(Debug, thiserror::Error)]
pub enum PullbackError {
    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("duplicate bar for {code} on {date}")]
    DuplicateDate { code: String, date: NaiveDate },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("no data for {code}")]
    NoData { code: String },

    #[error("none of the {requested} requested instruments could be loaded")]
    NoInstruments { requested: usize },

    #[error("export error: {reason}")]
    Export { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&PullbackError> for std::process::ExitCode {
    fn from(err: &PullbackError) -> Self {
        let code: u8 = match err {
            PullbackError::Io(_) | PullbackError::Export { .. } => 1,
            PullbackError::ConfigParse { .. }
            | PullbackError::ConfigMissing { .. }
            | PullbackError::ConfigInvalid { .. } => 2,
            PullbackError::Data { .. } | PullbackError::DuplicateDate { .. } => 3,
            PullbackError::NoData { .. } | PullbackError::NoInstruments { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
