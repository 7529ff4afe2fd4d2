//! Capability traits over the deploy-side collaborators.

use queuepilot_core::{BuildId, DeployId, Environment, InstanceId, SizeClass};

use crate::error::DeployResult;

/// One resize action against the deploy backend.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleRequest {
    pub environment: Environment,
    pub service: String,
    pub current_size: SizeClass,
    pub target_size: SizeClass,
    /// Service uses the legacy deploy naming scheme.
    pub legacy: bool,
    pub build_id: BuildId,
}

/// Issues resize and rollback deployments.
#[async_trait::async_trait]
pub trait DeployBackend {
    /// Resize an instance to `request.target_size`. Returns the deployment
    /// id the backend assigned.
    async fn scale(&self, request: &ScaleRequest) -> DeployResult<DeployId>;

    /// Roll a previous deployment back.
    async fn rollback(&self, deploy_id: DeployId) -> DeployResult<()>;

    /// Every instance provisioned by a deployment (one or more).
    async fn instance_ids(&self, deploy_id: DeployId) -> DeployResult<Vec<InstanceId>>;
}

/// Looks up the most recent build for a service.
#[async_trait::async_trait]
pub trait BuildHistory {
    async fn latest_build(&self, service: &str) -> DeployResult<BuildId>;
}

/// Looks up live instance attributes.
#[async_trait::async_trait]
pub trait InstanceMetadata {
    /// Current size class of an instance, or `InstanceNotFound`.
    async fn instance_size(
        &self,
        environment: Environment,
        instance_id: &InstanceId,
    ) -> DeployResult<SizeClass>;
}
