//! Instance queue — one monitored service instance at evaluation time.

use queuepilot_core::{Environment, InstanceId, ServiceName, SizeClass, TimeSeries};
use queuepilot_core::types::is_legacy_service;
use tracing::debug;

use crate::error::{ModelError, ModelResult};
use crate::utilization::{self, ResidencyPoint};

/// Utilization forecast attached to a queue after the forecast gate runs.
///
/// Either both sequences are present and non-empty, or there is no forecast
/// at all (`Option<Forecast>` upstream) — there is no partially populated
/// state.
#[derive(Debug, Clone, PartialEq)]
pub struct Forecast {
    /// Predicted utilization, one point per future step.
    pub mean: Vec<f64>,
    /// In-sample fitted values (one-step-ahead forecasts).
    pub fitted: Vec<f64>,
    /// Forecasting method reported by the collaborator, for diagnostics.
    pub method: String,
}

impl Forecast {
    pub fn new(mean: Vec<f64>, fitted: Vec<f64>, method: String) -> ModelResult<Self> {
        if mean.is_empty() || fitted.is_empty() {
            return Err(ModelError::InvalidInput(
                "forecast sequences must be non-empty".to_string(),
            ));
        }
        Ok(Self { mean, fitted, method })
    }
}

/// One monitored instance of one service in one environment.
///
/// Constructed fresh every evaluation pass from ingested series; read-only
/// after construction except for the optionally attached forecast; discarded
/// at the end of the pass.
#[derive(Debug, Clone)]
pub struct InstanceQueue {
    pub environment: Environment,
    pub service: ServiceName,
    pub instance_id: InstanceId,
    pub instance_size: SizeClass,
    /// Whether the service uses the legacy deploy naming scheme.
    pub legacy: bool,
    pub service_time: TimeSeries,
    pub arrival_rate: TimeSeries,
    pub utilization: Vec<f64>,
    pub residency_time: Vec<ResidencyPoint>,
    forecast: Option<Forecast>,
}

impl InstanceQueue {
    /// Build a queue from its two instrumented series, deriving utilization
    /// and residency time.
    ///
    /// The series must share length and index; mismatches are rejected here
    /// rather than deferred to first use.
    pub fn new(
        environment: Environment,
        service: ServiceName,
        instance_id: InstanceId,
        instance_size: SizeClass,
        service_time: TimeSeries,
        arrival_rate: TimeSeries,
    ) -> ModelResult<Self> {
        if service_time.start != arrival_rate.start || service_time.step != arrival_rate.step {
            return Err(ModelError::IndexMismatch {
                left: service_time.start,
                right: arrival_rate.start,
            });
        }
        let (utilization, residency_time) =
            utilization::compute(&service_time.values, &arrival_rate.values)?;

        let legacy = is_legacy_service(&service);
        debug!(%service, %instance_id, %environment, size = %instance_size, "queue constructed");

        Ok(Self {
            environment,
            service,
            instance_id,
            instance_size,
            legacy,
            service_time,
            arrival_rate,
            utilization,
            residency_time,
            forecast: None,
        })
    }

    /// Attach a utilization forecast, checking its length against the
    /// configured horizon.
    pub fn attach_forecast(&mut self, forecast: Forecast, horizon: usize) -> ModelResult<()> {
        if forecast.mean.len() != horizon {
            return Err(ModelError::ForecastLength {
                expected: horizon,
                actual: forecast.mean.len(),
            });
        }
        self.forecast = Some(forecast);
        Ok(())
    }

    pub fn forecast(&self) -> Option<&Forecast> {
        self.forecast.as_ref()
    }

    /// Epoch timestamp of the first utilization value.
    pub fn first_timestamp(&self) -> u64 {
        self.service_time.start
    }
}
