//! Utilization and residency-time computation.

use crate::error::{ModelError, ModelResult};

/// Residency time at one sample point.
///
/// `Unstable` marks points where the M/M/1 denominator `1 - ρ·E[S]` went
/// non-positive: the queue is overloaded and the formula's output is not a
/// usable residency estimate. The literal formula value is preserved so the
/// computation stays observable — it is applied as-is, never clamped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResidencyPoint {
    Stable(f64),
    Unstable(f64),
}

impl ResidencyPoint {
    /// The literal formula value, regardless of stability.
    pub fn raw(&self) -> f64 {
        match self {
            ResidencyPoint::Stable(v) | ResidencyPoint::Unstable(v) => *v,
        }
    }

    pub fn is_stable(&self) -> bool {
        matches!(self, ResidencyPoint::Stable(_))
    }
}

/// Derive utilization and residency time from service-time and arrival-rate
/// samples.
///
/// Both slices must be non-empty, equal length, and non-negative; outputs
/// share the input index exactly.
pub fn compute(
    service_time: &[f64],
    arrival_rate: &[f64],
) -> ModelResult<(Vec<f64>, Vec<ResidencyPoint>)> {
    if service_time.is_empty() || arrival_rate.is_empty() {
        return Err(ModelError::EmptyInput);
    }
    if service_time.len() != arrival_rate.len() {
        return Err(ModelError::ShapeMismatch {
            left: service_time.len(),
            right: arrival_rate.len(),
        });
    }
    if let Some(v) = service_time
        .iter()
        .chain(arrival_rate.iter())
        .find(|v| **v < 0.0 || !v.is_finite())
    {
        return Err(ModelError::InvalidInput(format!(
            "series values must be finite and non-negative, got {v}"
        )));
    }

    let utilization: Vec<f64> = service_time
        .iter()
        .zip(arrival_rate)
        .map(|(st, ar)| st * ar)
        .collect();

    let residency = service_time
        .iter()
        .zip(&utilization)
        .map(|(st, util)| {
            let denominator = 1.0 - util * st;
            let value = st / denominator;
            if denominator > 0.0 {
                ResidencyPoint::Stable(value)
            } else {
                ResidencyPoint::Unstable(value)
            }
        })
        .collect();

    Ok((utilization, residency))
}
