//! Error types for the queueing model.

use thiserror::Error;

/// Result type alias for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors that can occur constructing model values.
#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("series length mismatch: service time has {left} samples, arrival rate has {right}")]
    ShapeMismatch { left: usize, right: usize },

    #[error("series index mismatch: service time starts at {left}, arrival rate at {right}")]
    IndexMismatch { left: u64, right: u64 },

    #[error("cannot model an empty series")]
    EmptyInput,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("forecast has {actual} points, expected horizon {expected}")]
    ForecastLength { expected: usize, actual: usize },
}
