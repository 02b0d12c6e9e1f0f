//! Error types for loading, configuring, and driving the dashboard.

use thiserror::Error;

/// Rejected filter-state transitions. The previous state stays in effect.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StateError {
    #[error("unknown {kind} '{value}'")]
    UnknownCategory { kind: &'static str, value: String },
    #[error("probe coordinates must be finite numbers")]
    InvalidProbe,
}

/// Library-level error.
#[derive(Debug, Error)]
pub enum DashError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("input file is missing required column '{0}'")]
    MissingColumn(String),
    #[error("dataset contains no rows")]
    EmptyDataset,
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error(transparent)]
    State(#[from] StateError),
}

pub type Result<T> = std::result::Result<T, DashError>;
