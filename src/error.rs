use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TradeError {
    #[error("Input file unavailable: {}: {source}", path.display())]
    FileUnavailable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Malformed header: {reason}")]
    MalformedHeader { reason: String },

    /// `row` is the 0-based index into the raw table (data rows start at 2).
    #[error("Row {row} has {actual} columns, header declares {expected}")]
    ColumnCountMismatch {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Duplicate column key ({period}, {metric}) at columns {first} and {second}")]
    DuplicateColumnKey {
        period: String,
        metric: String,
        first: usize,
        second: usize,
    },

    #[error("Period(s) not present in dataset: {}", missing.join(", "))]
    InsufficientPeriods { missing: Vec<String> },

    #[error("Unknown field '{name}'")]
    UnknownField { name: String },

    #[error("Unknown entity '{name}'")]
    UnknownEntity { name: String },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),
}

pub type TradeResult<T> = Result<T, TradeError>;
