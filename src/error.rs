//! Error kinds surfaced by configuration, generation, ingestion, and export.

use std::fmt;
use std::io;
use std::path::PathBuf;

use chrono::NaiveDateTime;
use thiserror::Error;

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"simulation.freq_minutes"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Every configuration error found by a validation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigErrors(pub Vec<ConfigError>);

impl ConfigErrors {
    /// Returns `true` if any error names `field`.
    pub fn contains_field(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }
}

impl fmt::Display for ConfigErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{e}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ConfigErrors {}

impl From<ConfigError> for ConfigErrors {
    fn from(e: ConfigError) -> Self {
        Self(vec![e])
    }
}

/// Structural problems in an interval-indexed input table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataShapeError {
    #[error("input table has no rows")]
    Empty,

    #[error("row {row}: unparseable timestamp \"{value}\"")]
    UnparseableTimestamp { row: usize, value: String },

    #[error("row {row}: duplicate timestamp {timestamp}")]
    DuplicateTimestamp { row: usize, timestamp: NaiveDateTime },

    #[error("row {row}: timestamp {timestamp} is earlier than the previous row")]
    NotIncreasing { row: usize, timestamp: NaiveDateTime },

    #[error("row {row}: gap before {timestamp}, expected {expected}")]
    Gap {
        row: usize,
        expected: NaiveDateTime,
        timestamp: NaiveDateTime,
    },

    #[error("row {row}: spacing of {found_minutes} min does not match resolution of {expected_minutes} min")]
    Misaligned {
        row: usize,
        expected_minutes: i64,
        found_minutes: i64,
    },

    #[error("resolution of {minutes} min does not evenly divide a day")]
    ResolutionDoesNotDivideDay { minutes: i64 },

    #[error("cannot infer resolution from a single row; declare the input frequency")]
    UnknownResolution,

    #[error("row {row}: column {column} value {value} is outside {allowed}")]
    OutOfRange {
        row: usize,
        column: &'static str,
        value: String,
        allowed: &'static str,
    },
}

/// Top-level error for every fallible CLARO operation.
#[derive(Debug, Error)]
pub enum ClaroError {
    #[error("{0}")]
    Config(#[from] ConfigErrors),

    #[error("i/o error on \"{}\": {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("data shape error: {0}")]
    DataShape(#[from] DataShapeError),
}

impl From<ConfigError> for ClaroError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e.into())
    }
}

impl ClaroError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
