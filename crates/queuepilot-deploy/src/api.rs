//! Deployment API client.

use queuepilot_core::{BuildId, DeployId, InstanceId, NOOP_DEPLOY_ID};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{DeployError, DeployResult};
use crate::traits::{BuildHistory, DeployBackend, ScaleRequest};
use crate::transport;

/// Client for the deployment API, covering scale, rollback, instance
/// enumeration, and build history.
///
/// In no-op mode every scale and rollback logs the action it would have
/// taken and returns [`NOOP_DEPLOY_ID`] without touching the backend;
/// read-side calls still go through.
#[derive(Debug, Clone)]
pub struct DeployApiClient {
    /// `host:port` of the deployment API.
    addr: String,
    noop: bool,
}

#[derive(Debug, Serialize)]
struct ScaleRequestBody<'a> {
    environment: String,
    service: &'a str,
    current_size: String,
    target_size: String,
    legacy: bool,
    build_id: BuildId,
}

#[derive(Debug, Deserialize)]
struct DeployResponseBody {
    deploy_id: DeployId,
}

#[derive(Debug, Deserialize)]
struct InstancesResponseBody {
    instance_ids: Vec<InstanceId>,
}

/// One build record from the deployment API.
///
/// A service built through CI carries `ci_build_id`; legacy services only
/// have a `revision`.
#[derive(Debug, Deserialize)]
struct BuildRecord {
    created_at: u64,
    #[serde(default)]
    ci_build_id: Option<BuildId>,
    #[serde(default)]
    revision: Option<BuildId>,
}

impl DeployApiClient {
    pub fn new(addr: impl Into<String>, noop: bool) -> Self {
        Self {
            addr: addr.into(),
            noop,
        }
    }

    fn check_status(response: &transport::RawResponse, what: &str) -> DeployResult<()> {
        if response.status.is_success() {
            Ok(())
        } else {
            Err(DeployError::Backend(format!(
                "{what} returned {}",
                response.status
            )))
        }
    }
}

#[async_trait::async_trait]
impl DeployBackend for DeployApiClient {
    async fn scale(&self, request: &ScaleRequest) -> DeployResult<DeployId> {
        info!(
            service = %request.service,
            environment = %request.environment,
            from = %request.current_size,
            to = %request.target_size,
            build = request.build_id,
            "scaling instance"
        );

        if self.noop {
            info!("no-op mode: scale not issued");
            return Ok(NOOP_DEPLOY_ID);
        }

        let body = serde_json::to_vec(&ScaleRequestBody {
            environment: request.environment.to_string(),
            service: &request.service,
            current_size: request.current_size.to_string(),
            target_size: request.target_size.to_string(),
            legacy: request.legacy,
            build_id: request.build_id,
        })
        .map_err(|e| DeployError::Decode(e.to_string()))?;

        let response = transport::post_json(&self.addr, "/deployments", body).await?;
        Self::check_status(&response, "scale")?;

        let decoded: DeployResponseBody = serde_json::from_slice(&response.body)
            .map_err(|e| DeployError::Decode(e.to_string()))?;
        debug!(deploy_id = decoded.deploy_id, "scale deployment accepted");
        Ok(decoded.deploy_id)
    }

    async fn rollback(&self, deploy_id: DeployId) -> DeployResult<()> {
        info!(deploy_id, "rolling back deployment");

        if self.noop {
            info!("no-op mode: rollback not issued");
            return Ok(());
        }

        let path = format!("/deployments/{deploy_id}/rollback");
        let response = transport::post_json(&self.addr, &path, Vec::new()).await?;
        Self::check_status(&response, "rollback")
    }

    async fn instance_ids(&self, deploy_id: DeployId) -> DeployResult<Vec<InstanceId>> {
        let path = format!("/deployments/{deploy_id}/instances");
        let response = transport::get(&self.addr, &path).await?;
        Self::check_status(&response, "instance enumeration")?;

        let decoded: InstancesResponseBody = serde_json::from_slice(&response.body)
            .map_err(|e| DeployError::Decode(e.to_string()))?;
        Ok(decoded.instance_ids)
    }
}

#[async_trait::async_trait]
impl BuildHistory for DeployApiClient {
    async fn latest_build(&self, service: &str) -> DeployResult<BuildId> {
        let path = format!("/builds/{service}");
        let response = transport::get(&self.addr, &path).await?;
        Self::check_status(&response, "build history")?;

        let records: Vec<BuildRecord> = serde_json::from_slice(&response.body)
            .map_err(|e| DeployError::Decode(e.to_string()))?;

        select_latest_build(&records).ok_or_else(|| DeployError::NoBuilds(service.to_string()))
    }
}

/// Most recent build's id, preferring a CI build id over a legacy revision.
fn select_latest_build(records: &[BuildRecord]) -> Option<BuildId> {
    let newest = records.iter().max_by_key(|r| r.created_at)?;
    newest.ci_build_id.or(newest.revision)
}
