//! Crate-wide error type

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppraisalError {
    #[error("Invalid input: {field} - {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Invalid date for {field}: {value:?} (expected YYYY-MM-DD)")]
    InvalidDate { field: String, value: String },

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("No business plan found for property {property}, unit {unit}")]
    NotFound { property: String, unit: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias used throughout the library
pub type AppraisalResult<T> = Result<T, AppraisalError>;
