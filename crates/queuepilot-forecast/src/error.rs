//! Error types for forecasting.

use thiserror::Error;

/// Result type alias for forecast operations.
pub type ForecastResult<T> = Result<T, ForecastError>;

/// Errors that can occur producing a forecast.
///
/// None of these are fatal to an evaluation pass; the affected queue is
/// skipped and the error logged.
#[derive(Debug, Error)]
pub enum ForecastError {
    /// The forecasting collaborator could not be reached or failed.
    #[error("forecast unavailable: {0}")]
    Unavailable(String),

    /// The collaborator returned a forecast of the wrong length.
    #[error("forecast covered {actual} points, expected horizon {expected}")]
    HorizonMismatch { expected: usize, actual: usize },

    /// The collaborator returned a structurally invalid forecast.
    #[error("invalid forecast: {0}")]
    Invalid(#[from] queuepilot_model::ModelError),
}
