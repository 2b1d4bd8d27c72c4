//! Error types for the sleep analytics core

use thiserror::Error;

/// Errors that can occur while loading or analyzing a sleep log
#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("Missing required column(s): {0}")]
    MissingColumns(String),

    #[error("Row {row}: cannot parse {field}: {value:?}")]
    Parse {
        row: usize,
        field: &'static str,
        value: String,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
