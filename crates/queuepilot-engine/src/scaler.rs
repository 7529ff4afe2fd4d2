//! Scaler — evaluates forecasted queues and drives scale actions.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tracing::{debug, info, warn};

use queuepilot_core::{DeployId, InstanceId, QueuePilotConfig, SizeClass};
use queuepilot_deploy::{
    BuildHistory, DeployBackend, DeployError, InstanceMetadata, ScaleRequest,
};
use queuepilot_forecast::{ForecastGate, Forecaster};
use queuepilot_metrics::{MetricsSource, SeriesMap, group_by_instance, render_targets};
use queuepilot_model::{Forecast, InstanceQueue};

use crate::error::{EngineError, EngineResult};
use crate::rollback::RollbackRegistry;

/// The single action emitted for a queue in one pass.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    NoAction,
    Upscale { target: SizeClass },
    Downscale { target: SizeClass },
    Rollback {
        deploy_id: DeployId,
        instance_ids: Vec<InstanceId>,
    },
}

/// The scaling control loop: metrics in, deploy actions out.
///
/// Generic over its four collaborators so tests can drive a pass without
/// any network. All cross-pass state lives in the rollback registry.
pub struct Scaler<M, F, D, I> {
    config: QueuePilotConfig,
    metrics: M,
    gate: ForecastGate<F>,
    deploy: D,
    inventory: I,
    registry: RollbackRegistry,
}

impl<M, F, D, I> Scaler<M, F, D, I>
where
    M: MetricsSource,
    F: Forecaster,
    D: DeployBackend + BuildHistory,
    I: InstanceMetadata,
{
    pub fn new(config: QueuePilotConfig, metrics: M, forecaster: F, deploy: D, inventory: I) -> Self {
        let gate = ForecastGate::from_config(forecaster, &config.model);
        let registry = RollbackRegistry::new(config.rollback.clone());
        Self {
            config,
            metrics,
            gate,
            deploy,
            inventory,
            registry,
        }
    }

    /// Read access to the registry, for inspection in tests and diagnostics.
    pub fn registry(&self) -> &RollbackRegistry {
        &self.registry
    }

    /// The deploy backend collaborator.
    pub fn deploy(&self) -> &D {
        &self.deploy
    }

    /// Decide what to do with one forecasted queue.
    ///
    /// Pure given the forecast, the service policy, and the registry state:
    /// the same three inputs always yield the same decision. The upscale /
    /// rollback branch is checked strictly before the downscale branch.
    pub fn decide(
        &mut self,
        queue: &InstanceQueue,
        forecast: &Forecast,
        now: u64,
    ) -> EngineResult<Decision> {
        let policy = self
            .config
            .policy(&queue.service)
            .ok_or_else(|| EngineError::MissingPolicy(queue.service.clone()))?;

        let max_upscale = max_over(&forecast.mean, policy.upscale_horizon);
        let max_downscale = max_over(&forecast.mean, policy.downscale_horizon);

        if max_upscale > policy.upscale_limit {
            info!(
                service = %queue.service,
                instance = %queue.instance_id,
                forecast_max = max_upscale,
                limit = policy.upscale_limit,
                "utilization forecast exceeds upscale limit"
            );

            // A recent upscale on record means this load spike follows a
            // resize we just made; undo that deployment instead of
            // stacking another size change on top.
            if let Some(candidate) =
                self.registry
                    .find_candidate(&queue.instance_id, queue.environment, now)
            {
                return Ok(Decision::Rollback {
                    deploy_id: candidate.deploy_id,
                    instance_ids: candidate.instance_ids,
                });
            }

            let target = self
                .config
                .steps
                .next_larger(&queue.instance_size)
                .ok_or_else(|| EngineError::NoLargerSize(queue.instance_size.clone()))?;
            return Ok(Decision::Upscale { target });
        }

        if max_downscale < policy.downscale_limit {
            info!(
                service = %queue.service,
                instance = %queue.instance_id,
                forecast_max = max_downscale,
                limit = policy.downscale_limit,
                "utilization forecast never exceeds downscale limit"
            );
            let target = self
                .config
                .steps
                .next_smaller(&queue.instance_size)
                .ok_or_else(|| EngineError::NoSmallerSize(queue.instance_size.clone()))?;
            return Ok(Decision::Downscale { target });
        }

        Ok(Decision::NoAction)
    }

    /// Carry a decision out against the deploy backend.
    ///
    /// A backend failure propagates without mutating the registry: no
    /// candidate is recorded for an upscale that never happened, and a
    /// candidate is only removed once its rollback succeeded.
    pub async fn apply(
        &mut self,
        queue: &InstanceQueue,
        decision: &Decision,
        now: u64,
    ) -> EngineResult<()> {
        match decision {
            Decision::NoAction => {
                info!(
                    service = %queue.service,
                    instance = %queue.instance_id,
                    "no action taken"
                );
            }
            Decision::Upscale { target } => {
                let deploy_id = self.scale_to(queue, target).await?;
                if deploy_id <= 0 {
                    // No-op sentinel or backend error-blank; neither is a
                    // real deployment to roll back later.
                    debug!(deploy_id, "sentinel deployment id, skipping rollback record");
                    return Ok(());
                }
                let instance_ids = self.deploy.instance_ids(deploy_id).await?;
                self.registry
                    .record(instance_ids, deploy_id, queue.environment, now)?;
            }
            Decision::Downscale { target } => {
                self.scale_to(queue, target).await?;
            }
            Decision::Rollback {
                deploy_id,
                instance_ids,
            } => {
                self.deploy.rollback(*deploy_id).await?;
                self.registry.remove(instance_ids);
            }
        }
        Ok(())
    }

    async fn scale_to(&self, queue: &InstanceQueue, target: &SizeClass) -> EngineResult<DeployId> {
        let build_id = self.deploy.latest_build(&queue.service).await?;
        let request = ScaleRequest {
            environment: queue.environment,
            service: queue.service.clone(),
            current_size: queue.instance_size.clone(),
            target_size: target.clone(),
            legacy: queue.legacy,
            build_id,
        };
        Ok(self.deploy.scale(&request).await?)
    }

    /// Decide and act on one queue with an attached forecast.
    pub async fn evaluate_queue(
        &mut self,
        queue: &InstanceQueue,
        now: u64,
    ) -> EngineResult<Decision> {
        let forecast = queue.forecast().ok_or(EngineError::NoForecast)?;
        let decision = self.decide(queue, forecast, now)?;
        self.apply(queue, &decision, now).await?;
        Ok(decision)
    }

    /// Construct instance queues from the grouped arrival-rate and
    /// service-time series.
    ///
    /// Instances missing from either series map, unknown to the inventory,
    /// or with mismatched series are logged and skipped; none of them
    /// aborts the pass.
    async fn build_queues(&self, rates: SeriesMap, times: SeriesMap) -> Vec<InstanceQueue> {
        let mut queues = Vec::new();

        for (env, services) in rates {
            for (service, instances) in services {
                for (instance_id, arrival_rate) in instances {
                    let Some(service_time) = times
                        .get(&env)
                        .and_then(|s| s.get(&service))
                        .and_then(|i| i.get(&instance_id))
                    else {
                        debug!(%service, %instance_id, "no service-time series, skipping");
                        continue;
                    };

                    let size = match self.inventory.instance_size(env, &instance_id).await {
                        Ok(size) => size,
                        Err(DeployError::InstanceNotFound { .. }) => {
                            warn!(%service, %instance_id, "instance does not exist, continuing");
                            continue;
                        }
                        Err(e) => {
                            warn!(%service, %instance_id, error = %e, "inventory lookup failed");
                            continue;
                        }
                    };

                    match InstanceQueue::new(
                        env,
                        service.clone(),
                        instance_id.clone(),
                        size,
                        service_time.clone(),
                        arrival_rate,
                    ) {
                        Ok(queue) => queues.push(queue),
                        Err(e) => {
                            warn!(%service, %instance_id, error = %e, "rejected instance series");
                        }
                    }
                }
            }
        }

        queues
    }

    /// Run one full evaluation pass: fetch, group, forecast, decide, act.
    ///
    /// Returns the decision made for every evaluated queue. A metrics-source
    /// failure aborts the pass; per-queue failures are logged and skipped.
    pub async fn evaluate_pass(&mut self) -> EngineResult<Vec<(InstanceId, Decision)>> {
        let targets = render_targets(&self.config.services);
        let raw_rates = self
            .metrics
            .render(&targets.arrival_rates, &self.config.render)
            .await?;
        let raw_times = self
            .metrics
            .render(&targets.service_times, &self.config.render)
            .await?;

        let window = self.config.ingest.window;
        let rates = group_by_instance(raw_rates, window)?;
        let times = group_by_instance(raw_times, window)?;

        let mut queues = self.build_queues(rates, times).await;
        info!(queues = queues.len(), "evaluating instance queues");

        let now = epoch_secs();
        let mut decisions = Vec::new();

        for queue in &mut queues {
            let forecast = match self.gate.evaluate(queue).await {
                Ok(Some(forecast)) => forecast,
                Ok(None) => continue,
                Err(e) => {
                    warn!(
                        service = %queue.service,
                        instance = %queue.instance_id,
                        error = %e,
                        "forecast failed, skipping queue"
                    );
                    continue;
                }
            };

            if let Err(e) = queue.attach_forecast(forecast, self.config.model.horizon) {
                warn!(
                    service = %queue.service,
                    instance = %queue.instance_id,
                    error = %e,
                    "rejected forecast"
                );
                continue;
            }

            match self.evaluate_queue(queue, now).await {
                Ok(decision) => decisions.push((queue.instance_id.clone(), decision)),
                Err(e) => {
                    warn!(
                        service = %queue.service,
                        instance = %queue.instance_id,
                        error = %e,
                        "queue evaluation failed"
                    );
                }
            }
        }

        Ok(decisions)
    }

    /// Run the evaluation loop until shutdown.
    pub async fn run(&mut self, interval: Duration, mut shutdown: tokio::sync::watch::Receiver<bool>) {
        info!(interval_secs = interval.as_secs(), "scaler started");

        loop {
            tokio::select! {
                _ = tokio::time::sleep(interval) => {
                    info!("beginning scaling evaluation pass");
                    match self.evaluate_pass().await {
                        Ok(decisions) => {
                            info!(evaluated = decisions.len(), "evaluation pass complete");
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "evaluation pass failed, retrying next interval");
                        }
                    }
                }
                _ = shutdown.changed() => {
                    info!("scaler shutting down");
                    break;
                }
            }
        }
    }
}

/// Max over the leading `horizon` forecast points.
fn max_over(values: &[f64], horizon: usize) -> f64 {
    values
        .iter()
        .take(horizon)
        .fold(f64::NEG_INFINITY, |acc, v| acc.max(*v))
}

fn epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
