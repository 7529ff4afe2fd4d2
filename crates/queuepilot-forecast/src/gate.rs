//! Forecast gate — decides whether a queue gets a forecast this pass.

use queuepilot_core::config::ModelConfig;
use queuepilot_model::{Forecast, InstanceQueue};
use tracing::{debug, info};

use crate::error::{ForecastError, ForecastResult};

/// Raw output of the forecasting collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastOutput {
    /// In-sample fitted values (one-step-ahead forecasts).
    pub fitted: Vec<f64>,
    /// Predicted values, one per future step.
    pub mean: Vec<f64>,
    /// Method the collaborator selected (e.g. `ETS(A,N,N)`).
    pub method: String,
}

/// Capability interface over the forecasting collaborator.
///
/// `Ok(None)` is the explicit insufficient-data signal — a normal outcome,
/// not an error.
#[async_trait::async_trait]
pub trait Forecaster {
    async fn forecast(
        &self,
        series: &[f64],
        model_type: &str,
        horizon: usize,
    ) -> ForecastResult<Option<ForecastOutput>>;
}

/// Wraps the forecasting collaborator with engine-side gating.
pub struct ForecastGate<F> {
    forecaster: F,
    model_type: String,
    /// Configured horizon; when absent, defaults to a tenth of the series.
    horizon: Option<usize>,
    /// Trailing samples inspected for the dormant-instance check.
    recent_window: usize,
}

impl<F: Forecaster> ForecastGate<F> {
    pub fn new(forecaster: F, model_type: impl Into<String>, horizon: Option<usize>) -> Self {
        Self {
            forecaster,
            model_type: model_type.into(),
            horizon,
            recent_window: 120,
        }
    }

    pub fn from_config(forecaster: F, model: &ModelConfig) -> Self {
        Self {
            forecaster,
            model_type: model.model_type.clone(),
            horizon: Some(model.horizon),
            recent_window: model.recent_window,
        }
    }

    pub fn with_recent_window(mut self, window: usize) -> Self {
        self.recent_window = window;
        self
    }

    /// Horizon used for a series of `len` samples.
    fn horizon_for(&self, len: usize) -> usize {
        match self.horizon {
            Some(h) => h,
            None => ((0.1 * len as f64).round() as usize).max(1),
        }
    }

    /// Produce a utilization forecast for a queue, or `None` when the
    /// queue's recent history holds no usable data.
    pub async fn evaluate(&self, queue: &InstanceQueue) -> ForecastResult<Option<Forecast>> {
        let series = &queue.utilization;

        // Dormant check: an instance reporting nothing but zeros over the
        // recent window has no forecastable signal. Zero-filled ingest gaps
        // land here too, so a silent instance is skipped rather than
        // forecast as zero load.
        let window_start = series.len().saturating_sub(self.recent_window);
        if series[window_start..].iter().all(|v| *v == 0.0) {
            info!(
                service = %queue.service,
                instance = %queue.instance_id,
                "no recent samples, skipping forecast"
            );
            return Ok(None);
        }

        let horizon = self.horizon_for(series.len());
        debug!(
            service = %queue.service,
            instance = %queue.instance_id,
            horizon,
            model = %self.model_type,
            "requesting forecast"
        );

        let output = self
            .forecaster
            .forecast(series, &self.model_type, horizon)
            .await?;

        let Some(output) = output else {
            return Ok(None);
        };

        if output.mean.len() != horizon {
            return Err(ForecastError::HorizonMismatch {
                expected: horizon,
                actual: output.mean.len(),
            });
        }

        let forecast = Forecast::new(output.mean, output.fitted, output.method)?;
        Ok(Some(forecast))
    }
}
