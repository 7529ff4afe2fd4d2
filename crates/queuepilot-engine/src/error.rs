//! Decision engine error types.

use queuepilot_core::SizeClass;
use thiserror::Error;

/// Result type alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur evaluating a queue or running a pass.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The instance is already at the top of its size family.
    #[error("no larger size to scale to from {0}")]
    NoLargerSize(SizeClass),

    /// The instance is already at the bottom of its size family.
    #[error("no smaller size to scale to from {0}")]
    NoSmallerSize(SizeClass),

    /// An instance in the set already belongs to a live rollback candidate.
    #[error("instance {0} already belongs to a live rollback candidate")]
    RollbackConflict(String),

    /// No scaling policy is configured for the service.
    #[error("no scaling policy for service: {0}")]
    MissingPolicy(String),

    /// The queue reached the engine without an attached forecast.
    #[error("queue has no attached forecast")]
    NoForecast,

    #[error("model error: {0}")]
    Model(#[from] queuepilot_model::ModelError),

    #[error("ingest error: {0}")]
    Ingest(#[from] queuepilot_metrics::IngestError),

    #[error("deploy error: {0}")]
    Deploy(#[from] queuepilot_deploy::DeployError),
}
