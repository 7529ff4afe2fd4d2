//! queuepilot.toml configuration parser.
//!
//! All sections default so a minimal config only needs the monitored
//! service list and a policy per service. `validate()` runs once at startup;
//! anything it rejects is a deployment mistake, not a runtime condition.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::names::deploy_service_name;
use crate::steps::SizeSteps;
use crate::types::Environment;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QueuePilotConfig {
    /// Metric-side names of monitored services (`Webservice-*`, `Application-*`).
    pub services: Vec<String>,
    /// Render-API options forwarded verbatim on every metrics query.
    pub render: BTreeMap<String, String>,
    pub metrics: MetricsConfig,
    pub ingest: IngestConfig,
    pub model: ModelConfig,
    pub rollback: RollbackConfig,
    /// Scaling policy per deploy-side service name.
    pub policies: BTreeMap<String, ScalingPolicy>,
    pub deploy: DeployConfig,
    pub forecast: ForecastConfig,
    pub inventory: InventoryConfig,
    pub steps: SizeSteps,
}

impl Default for QueuePilotConfig {
    fn default() -> Self {
        Self {
            services: Vec::new(),
            render: BTreeMap::from([("from".to_string(), "-180min".to_string())]),
            metrics: MetricsConfig::default(),
            ingest: IngestConfig::default(),
            model: ModelConfig::default(),
            rollback: RollbackConfig::default(),
            policies: BTreeMap::new(),
            deploy: DeployConfig::default(),
            forecast: ForecastConfig::default(),
            inventory: InventoryConfig::default(),
            steps: SizeSteps::default(),
        }
    }
}

/// Metrics store connection settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// `host:port` of the render API.
    pub addr: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:8100".to_string(),
        }
    }
}

/// Series smoothing parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Trailing moving-average window, in samples.
    pub window: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self { window: 5 }
    }
}

/// Forecast model selection and horizon.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Model selection string passed to the forecasting collaborator.
    pub model_type: String,
    /// Number of future points every forecast must produce.
    pub horizon: usize,
    /// Trailing samples inspected for the all-zero "dormant instance" check.
    pub recent_window: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_type: "ZZZ".to_string(),
            horizon: 30,
            recent_window: 120,
        }
    }
}

/// Per-environment rollback horizons, in seconds.
///
/// A scale-up deployment older than its environment's horizon is no longer
/// a rollback target.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RollbackConfig {
    pub production: u64,
    pub staging: u64,
    pub utility: u64,
}

impl Default for RollbackConfig {
    fn default() -> Self {
        Self {
            production: 3600,
            staging: 600,
            utility: 600,
        }
    }
}

impl RollbackConfig {
    pub fn horizon_for(&self, env: Environment) -> u64 {
        match env {
            Environment::Production => self.production,
            Environment::Staging => self.staging,
            Environment::Utility => self.utility,
        }
    }
}

/// Per-service scaling thresholds and look-ahead horizons.
#[derive(Debug, Clone, Deserialize)]
pub struct ScalingPolicy {
    /// Forecast utilization above this triggers an upscale (or rollback).
    pub upscale_limit: f64,
    /// Forecast utilization never exceeding this triggers a downscale.
    pub downscale_limit: f64,
    /// Leading forecast points considered for the upscale check.
    #[serde(default = "default_upscale_horizon")]
    pub upscale_horizon: usize,
    /// Leading forecast points considered for the downscale check.
    #[serde(default = "default_downscale_horizon")]
    pub downscale_horizon: usize,
}

fn default_upscale_horizon() -> usize {
    5
}

fn default_downscale_horizon() -> usize {
    15
}

/// Deploy backend connection settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    /// `host:port` of the deployment API.
    pub api_addr: String,
    /// Log scale actions without issuing them.
    pub noop: bool,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            api_addr: "127.0.0.1:8200".to_string(),
            noop: false,
        }
    }
}

/// Forecast service connection settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// `host:port` of the forecasting service.
    pub addr: String,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:8300".to_string(),
        }
    }
}

/// Instance inventory connection settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InventoryConfig {
    /// `host:port` of the instance inventory service.
    pub addr: String,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:8400".to_string(),
        }
    }
}

impl QueuePilotConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: QueuePilotConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Scaling policy for a deploy-side service name.
    pub fn policy(&self, service: &str) -> Option<&ScalingPolicy> {
        self.policies.get(service)
    }

    /// Reject configs that would fail mid-pass instead of at startup.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.services.is_empty() {
            return Err(ConfigError::NoServices);
        }
        if self.model.horizon == 0 {
            return Err(ConfigError::ZeroModelHorizon);
        }
        if self.ingest.window == 0 {
            return Err(ConfigError::ZeroWindow);
        }

        // Every monitored service must translate to a deploy-side name with
        // a policy, so look-ahead bounds can be checked here rather than
        // surfacing as slice errors during evaluation.
        for metric_name in &self.services {
            let Some(service) = deploy_service_name(metric_name) else {
                return Err(ConfigError::UnknownService(metric_name.clone()));
            };
            let Some(policy) = self.policies.get(service) else {
                return Err(ConfigError::MissingPolicy(service.to_string()));
            };
            if policy.upscale_horizon == 0 || policy.downscale_horizon == 0 {
                return Err(ConfigError::ZeroHorizon {
                    service: service.to_string(),
                });
            }
            if policy.upscale_horizon > self.model.horizon {
                return Err(ConfigError::HorizonOutOfRange {
                    service: service.to_string(),
                    direction: "upscale",
                    horizon: policy.upscale_horizon,
                    model_horizon: self.model.horizon,
                });
            }
            if policy.downscale_horizon > self.model.horizon {
                return Err(ConfigError::HorizonOutOfRange {
                    service: service.to_string(),
                    direction: "downscale",
                    horizon: policy.downscale_horizon,
                    model_horizon: self.model.horizon,
                });
            }
            if policy.downscale_limit >= policy.upscale_limit {
                return Err(ConfigError::InvertedLimits {
                    service: service.to_string(),
                    upscale: policy.upscale_limit,
                    downscale: policy.downscale_limit,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MINIMAL: &str = r#"
services = ["Webservice-KRS"]

[policies."kbs.KRS"]
upscale_limit = 0.8
downscale_limit = 0.2
"#;

    #[test]
    fn parse_minimal() {
        let config: QueuePilotConfig = toml::from_str(MINIMAL).unwrap();
        config.validate().unwrap();

        assert_eq!(config.services, vec!["Webservice-KRS"]);
        let policy = config.policy("kbs.KRS").unwrap();
        assert_eq!(policy.upscale_limit, 0.8);
        assert_eq!(policy.upscale_horizon, 5);
        assert_eq!(policy.downscale_horizon, 15);
        // Section defaults.
        assert_eq!(config.ingest.window, 5);
        assert_eq!(config.model.horizon, 30);
        assert_eq!(config.model.model_type, "ZZZ");
        assert_eq!(config.rollback.production, 3600);
        assert_eq!(config.rollback.staging, 600);
        assert!(!config.deploy.noop);
    }

    #[test]
    fn from_file_roundtrip() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(MINIMAL.as_bytes()).unwrap();
        let config = QueuePilotConfig::from_file(file.path()).unwrap();
        assert_eq!(config.services.len(), 1);
    }

    #[test]
    fn empty_services_rejected() {
        let config = QueuePilotConfig::default();
        assert!(matches!(config.validate(), Err(ConfigError::NoServices)));
    }

    #[test]
    fn missing_policy_rejected() {
        let toml_str = r#"services = ["Webservice-KRS"]"#;
        let config: QueuePilotConfig = toml::from_str(toml_str).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingPolicy(s)) if s == "kbs.KRS"
        ));
    }

    #[test]
    fn untranslatable_service_rejected() {
        let toml_str = r#"services = ["Webservice-Mystery"]"#;
        let config: QueuePilotConfig = toml::from_str(toml_str).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnknownService(s)) if s == "Webservice-Mystery"
        ));
    }

    #[test]
    fn horizon_beyond_model_rejected() {
        let toml_str = r#"
services = ["Webservice-KRS"]

[model]
horizon = 10

[policies."kbs.KRS"]
upscale_limit = 0.8
downscale_limit = 0.2
upscale_horizon = 11
"#;
        let config: QueuePilotConfig = toml::from_str(toml_str).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::HorizonOutOfRange { direction: "upscale", .. })
        ));
    }

    #[test]
    fn inverted_limits_rejected() {
        let toml_str = r#"
services = ["Webservice-KRS"]

[policies."kbs.KRS"]
upscale_limit = 0.2
downscale_limit = 0.8
"#;
        let config: QueuePilotConfig = toml::from_str(toml_str).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvertedLimits { .. })
        ));
    }

    #[test]
    fn rollback_horizon_per_environment() {
        let config = QueuePilotConfig::default();
        assert_eq!(config.rollback.horizon_for(Environment::Production), 3600);
        assert_eq!(config.rollback.horizon_for(Environment::Staging), 600);
        assert_eq!(config.rollback.horizon_for(Environment::Utility), 600);
    }

    #[test]
    fn step_table_overrides_from_toml() {
        let toml_str = r#"
services = ["Webservice-KRS"]

[policies."kbs.KRS"]
upscale_limit = 0.8
downscale_limit = 0.2

[steps.upscale.m3]
medium = "large"
"#;
        let config: QueuePilotConfig = toml::from_str(toml_str).unwrap();
        let m3 = crate::types::SizeClass::parse("m3.medium").unwrap();
        assert_eq!(
            config.steps.next_larger(&m3).unwrap().to_string(),
            "m3.large"
        );
    }
}
