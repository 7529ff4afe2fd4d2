//! End-to-end evaluation passes over stub collaborators.
//!
//! Drives `Scaler::evaluate_pass` through the full chain: render records →
//! smoothing/grouping → queue construction → forecast gate → decision →
//! deploy calls → rollback registry.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use queuepilot_core::config::ScalingPolicy;
use queuepilot_core::{BuildId, DeployId, Environment, InstanceId, QueuePilotConfig, SizeClass};
use queuepilot_deploy::{
    BuildHistory, DeployBackend, DeployError, DeployResult, InstanceMetadata, ScaleRequest,
};
use queuepilot_engine::{Decision, Scaler};
use queuepilot_forecast::{ForecastOutput, ForecastResult, Forecaster};
use queuepilot_metrics::{IngestError, IngestResult, MetricsSource, RenderSeries};

const SERVICE_TIME_NAME: &str =
    "Knewton.Production.Webservice-KRS.Instance.i-deadbeef.proxy_service_time_avg";
const ARRIVAL_RATE_NAME: &str =
    "Knewton.Production.Webservice-KRS.Instance.i-deadbeef.arrival_rate";

/// Render stub serving one instance's two series.
struct StubMetrics {
    service_time: Vec<Option<f64>>,
    arrival_rate: Vec<Option<f64>>,
    fail: bool,
}

impl StubMetrics {
    fn steady(service_time: f64, arrival_rate: f64) -> Self {
        Self {
            service_time: vec![Some(service_time); 10],
            arrival_rate: vec![Some(arrival_rate); 10],
            fail: false,
        }
    }
}

#[async_trait::async_trait]
impl MetricsSource for StubMetrics {
    async fn render(
        &self,
        targets: &[String],
        _options: &BTreeMap<String, String>,
    ) -> IngestResult<Vec<RenderSeries>> {
        if self.fail {
            return Err(IngestError::Source("render API unreachable".to_string()));
        }
        let arrival = targets.iter().any(|t| t.contains("arrival_rate"));
        let (name, values) = if arrival {
            (ARRIVAL_RATE_NAME, self.arrival_rate.clone())
        } else {
            (SERVICE_TIME_NAME, self.service_time.clone())
        };
        Ok(vec![RenderSeries {
            name: name.to_string(),
            start: 1000,
            step: 60,
            values,
        }])
    }
}

/// Forecaster stub echoing a fixed mean at the requested horizon.
struct StubForecaster {
    level: f64,
}

#[async_trait::async_trait]
impl Forecaster for StubForecaster {
    async fn forecast(
        &self,
        series: &[f64],
        _model_type: &str,
        horizon: usize,
    ) -> ForecastResult<Option<ForecastOutput>> {
        Ok(Some(ForecastOutput {
            fitted: series.to_vec(),
            mean: vec![self.level; horizon],
            method: "ETS(A,N,N)".to_string(),
        }))
    }
}

/// Deploy stub recording every call.
struct StubDeploy {
    deploy_id: DeployId,
    provisioned: Vec<InstanceId>,
    fail_scale: AtomicBool,
    calls: Mutex<Vec<String>>,
}

impl StubDeploy {
    fn new(deploy_id: DeployId, provisioned: &[&str]) -> Self {
        Self {
            deploy_id,
            provisioned: provisioned.iter().map(|s| s.to_string()).collect(),
            fail_scale: AtomicBool::new(false),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl DeployBackend for StubDeploy {
    async fn scale(&self, request: &ScaleRequest) -> DeployResult<DeployId> {
        if self.fail_scale.load(Ordering::Relaxed) {
            return Err(DeployError::Backend("scale rejected".to_string()));
        }
        self.calls.lock().unwrap().push(format!(
            "scale {} {} -> {}",
            request.service, request.current_size, request.target_size
        ));
        Ok(self.deploy_id)
    }

    async fn rollback(&self, deploy_id: DeployId) -> DeployResult<()> {
        self.calls.lock().unwrap().push(format!("rollback {deploy_id}"));
        Ok(())
    }

    async fn instance_ids(&self, _deploy_id: DeployId) -> DeployResult<Vec<InstanceId>> {
        Ok(self.provisioned.clone())
    }
}

#[async_trait::async_trait]
impl BuildHistory for StubDeploy {
    async fn latest_build(&self, _service: &str) -> DeployResult<BuildId> {
        Ok(4242)
    }
}

/// Inventory stub returning a fixed size for every instance.
struct StubInventory {
    size: &'static str,
}

#[async_trait::async_trait]
impl InstanceMetadata for StubInventory {
    async fn instance_size(
        &self,
        _environment: Environment,
        _instance_id: &InstanceId,
    ) -> DeployResult<SizeClass> {
        SizeClass::parse(self.size).map_err(|e| DeployError::Decode(e.to_string()))
    }
}

fn test_config() -> QueuePilotConfig {
    let mut config = QueuePilotConfig::default();
    config.services = vec!["Webservice-KRS".to_string()];
    config.ingest.window = 5;
    config.model.horizon = 2;
    config.policies.insert(
        "kbs.KRS".to_string(),
        ScalingPolicy {
            upscale_limit: 0.8,
            downscale_limit: 0.2,
            upscale_horizon: 2,
            downscale_horizon: 2,
        },
    );
    config.validate().unwrap();
    config
}

#[tokio::test]
async fn overloaded_queue_upscales_and_records_candidate() {
    // st 0.09 × ar 10 → utilization 0.9, forecast at 0.9 over the limit.
    let mut scaler = Scaler::new(
        test_config(),
        StubMetrics::steady(0.09, 10.0),
        StubForecaster { level: 0.9 },
        StubDeploy::new(555, &["i-deadbeef"]),
        StubInventory { size: "m1.small" },
    );

    let decisions = scaler.evaluate_pass().await.unwrap();

    assert_eq!(decisions.len(), 1);
    assert_eq!(decisions[0].0, "i-deadbeef");
    assert_eq!(
        decisions[0].1,
        Decision::Upscale {
            target: SizeClass::parse("m1.medium").unwrap()
        }
    );
    assert_eq!(scaler.registry().len(), 1);
}

#[tokio::test]
async fn second_overload_rolls_back_the_recorded_upscale() {
    let mut scaler = Scaler::new(
        test_config(),
        StubMetrics::steady(0.09, 10.0),
        StubForecaster { level: 0.9 },
        StubDeploy::new(555, &["i-deadbeef"]),
        StubInventory { size: "m1.small" },
    );

    // First pass upscales; the forecast stays hot, so the second pass
    // rolls the fresh deployment back instead of upscaling again.
    scaler.evaluate_pass().await.unwrap();
    let decisions = scaler.evaluate_pass().await.unwrap();

    assert_eq!(
        decisions[0].1,
        Decision::Rollback {
            deploy_id: 555,
            instance_ids: vec!["i-deadbeef".to_string()],
        }
    );
    assert!(scaler.registry().is_empty());
}

#[tokio::test]
async fn idle_queue_downscales_without_registry_entry() {
    let mut scaler = Scaler::new(
        test_config(),
        StubMetrics::steady(0.01, 1.0),
        StubForecaster { level: 0.05 },
        StubDeploy::new(555, &["i-deadbeef"]),
        StubInventory { size: "m1.medium" },
    );

    let decisions = scaler.evaluate_pass().await.unwrap();

    assert_eq!(
        decisions[0].1,
        Decision::Downscale {
            target: SizeClass::parse("m1.small").unwrap()
        }
    );
    assert!(scaler.registry().is_empty());
    assert_eq!(
        scaler.deploy().calls(),
        vec!["scale kbs.KRS m1.medium -> m1.small"]
    );
}

#[tokio::test]
async fn deploy_failure_skips_queue_and_leaves_registry_empty() {
    let deploy = StubDeploy::new(555, &["i-deadbeef"]);
    deploy.fail_scale.store(true, Ordering::Relaxed);
    let mut scaler = Scaler::new(
        test_config(),
        StubMetrics::steady(0.09, 10.0),
        StubForecaster { level: 0.9 },
        deploy,
        StubInventory { size: "m1.small" },
    );

    // The failure is logged per-instance; the pass itself succeeds.
    let decisions = scaler.evaluate_pass().await.unwrap();
    assert!(decisions.is_empty());
    assert!(scaler.registry().is_empty());
}

#[tokio::test]
async fn silent_instance_is_skipped_entirely() {
    // All-zero series: smoothing leaves zeros, the gate reports no
    // forecastable signal, and the deploy backend is never consulted.
    let mut scaler = Scaler::new(
        test_config(),
        StubMetrics::steady(0.0, 0.0),
        StubForecaster { level: 0.9 },
        StubDeploy::new(555, &["i-deadbeef"]),
        StubInventory { size: "m1.small" },
    );

    let decisions = scaler.evaluate_pass().await.unwrap();
    assert!(decisions.is_empty());
    assert!(scaler.deploy().calls().is_empty());
}

#[tokio::test]
async fn unreachable_metrics_source_fails_the_pass() {
    let mut metrics = StubMetrics::steady(0.09, 10.0);
    metrics.fail = true;
    let mut scaler = Scaler::new(
        test_config(),
        metrics,
        StubForecaster { level: 0.9 },
        StubDeploy::new(555, &["i-deadbeef"]),
        StubInventory { size: "m1.small" },
    );

    assert!(scaler.evaluate_pass().await.is_err());
}
