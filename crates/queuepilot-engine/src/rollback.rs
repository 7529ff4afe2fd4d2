//! Rollback registry — recently issued upscale deployments.

use queuepilot_core::config::RollbackConfig;
use queuepilot_core::{DeployId, Environment, InstanceId};
use tracing::{debug, info};

use crate::error::{EngineError, EngineResult};

/// One recorded upscale deployment.
///
/// Keyed by the exact set of instance ids the deployment provisioned
/// (sorted for comparison). Never mutated in place; candidates are created
/// on upscale and destroyed on rollback or expiry.
#[derive(Debug, Clone, PartialEq)]
pub struct RollbackCandidate {
    pub instance_ids: Vec<InstanceId>,
    pub deploy_id: DeployId,
    /// Epoch seconds when the deployment completed.
    pub created_at: u64,
}

impl RollbackCandidate {
    fn contains(&self, instance_id: &str) -> bool {
        self.instance_ids.iter().any(|id| id == instance_id)
    }

    /// Expired once its age exceeds the environment horizon; age equal to
    /// the horizon is still live.
    fn expired(&self, horizon: u64, now: u64) -> bool {
        now.saturating_sub(self.created_at) > horizon
    }
}

/// Tracks upscale deployments eligible for rollback.
///
/// Expiry is evaluated lazily at lookup time against the environment's
/// horizon; there is no background sweep.
#[derive(Debug)]
pub struct RollbackRegistry {
    horizons: RollbackConfig,
    candidates: Vec<RollbackCandidate>,
}

impl RollbackRegistry {
    pub fn new(horizons: RollbackConfig) -> Self {
        Self {
            horizons,
            candidates: Vec::new(),
        }
    }

    /// Record a completed upscale deployment.
    ///
    /// Expired candidates overlapping the new instance set are purged
    /// first; a conflict with a still-live candidate is an error, since an
    /// instance may belong to at most one live candidate.
    pub fn record(
        &mut self,
        mut instance_ids: Vec<InstanceId>,
        deploy_id: DeployId,
        environment: Environment,
        now: u64,
    ) -> EngineResult<()> {
        let horizon = self.horizons.horizon_for(environment);
        self.candidates
            .retain(|c| !(c.expired(horizon, now) && instance_ids.iter().any(|id| c.contains(id))));

        if let Some(conflict) = self
            .candidates
            .iter()
            .flat_map(|c| &c.instance_ids)
            .find(|id| instance_ids.contains(*id))
        {
            return Err(EngineError::RollbackConflict(conflict.clone()));
        }

        instance_ids.sort();
        info!(deploy_id, ?instance_ids, %environment, "recording rollback candidate");
        self.candidates.push(RollbackCandidate {
            instance_ids,
            deploy_id,
            created_at: now,
        });
        Ok(())
    }

    /// Live candidate containing `instance_id`, if any.
    ///
    /// A matching candidate past the environment horizon is purged and
    /// reported absent.
    pub fn find_candidate(
        &mut self,
        instance_id: &str,
        environment: Environment,
        now: u64,
    ) -> Option<RollbackCandidate> {
        let horizon = self.horizons.horizon_for(environment);
        let index = self.candidates.iter().position(|c| c.contains(instance_id))?;

        if self.candidates[index].expired(horizon, now) {
            let stale = self.candidates.swap_remove(index);
            debug!(
                deploy_id = stale.deploy_id,
                instance_id, "purged expired rollback candidate"
            );
            return None;
        }
        Some(self.candidates[index].clone())
    }

    /// Delete the candidate keyed by exactly this instance set.
    pub fn remove(&mut self, instance_ids: &[InstanceId]) {
        let mut key: Vec<InstanceId> = instance_ids.to_vec();
        key.sort();
        self.candidates.retain(|c| c.instance_ids != key);
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}
