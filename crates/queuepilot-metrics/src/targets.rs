//! Render target generation for the monitored service list.

use queuepilot_core::Environment;

/// Arrival rates are reported per minute; service times in seconds. The
/// scale factor (1/60) puts both on the same time unit.
const ARRIVAL_RATE_SCALE: &str = "0.016666";

const TARGET_ENVIRONMENTS: [Environment; 2] = [Environment::Production, Environment::Staging];

/// The two query sets issued every evaluation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Targets {
    pub arrival_rates: Vec<String>,
    pub service_times: Vec<String>,
}

/// Build arrival-rate and service-time queries for each monitored service
/// in each scaled environment.
pub fn render_targets(services: &[String]) -> Targets {
    let mut arrival_rates = Vec::new();
    let mut service_times = Vec::new();

    for service in services {
        for env in TARGET_ENVIRONMENTS {
            let env = env_segment(env);
            arrival_rates.push(format!(
                "scale(*.{env}.{service}.Instance.*.arrival_rate,{ARRIVAL_RATE_SCALE})"
            ));
            service_times.push(format!(
                "*.{env}.{service}.Instance.*.proxy_service_time_avg"
            ));
        }
    }

    Targets {
        arrival_rates,
        service_times,
    }
}

/// Namespace segment for an environment (capitalized, unlike `Display`).
fn env_segment(env: Environment) -> &'static str {
    match env {
        Environment::Production => "Production",
        Environment::Staging => "Staging",
        Environment::Utility => "Utility",
    }
}
