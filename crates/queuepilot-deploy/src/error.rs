//! Error types for deploy-side collaborators.

use queuepilot_core::Environment;
use thiserror::Error;

/// Result type alias for deploy operations.
pub type DeployResult<T> = Result<T, DeployError>;

/// Errors from the deploy backend, build history, or instance inventory.
#[derive(Debug, Error)]
pub enum DeployError {
    /// The backend rejected the request.
    #[error("deploy backend error: {0}")]
    Backend(String),

    /// The backend could not be reached.
    #[error("deploy transport error: {0}")]
    Transport(String),

    /// The backend's response could not be decoded.
    #[error("failed to decode deploy response: {0}")]
    Decode(String),

    /// The inventory has no record of the instance.
    #[error("instance not found: {instance_id} in {environment}")]
    InstanceNotFound {
        environment: Environment,
        instance_id: String,
    },

    /// The build history has no usable build for the service.
    #[error("no builds recorded for service: {0}")]
    NoBuilds(String),
}
