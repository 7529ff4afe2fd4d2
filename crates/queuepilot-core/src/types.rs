//! Shared domain types used across QueuePilot crates.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Deploy-side service name (e.g. `kbs.KRS`, `knewmena`).
pub type ServiceName = String;

/// Cloud instance identifier (e.g. `i-deadbeef`).
pub type InstanceId = String;

/// Deployment id returned by the deploy backend.
///
/// `0` is the backend's error-blank and is never recorded as a rollback
/// candidate; [`NOOP_DEPLOY_ID`] is returned when no-op mode is active.
pub type DeployId = i64;

/// Build identifier used when issuing a scale deployment.
pub type BuildId = i64;

/// Deployment id sentinel returned in no-op mode.
pub const NOOP_DEPLOY_ID: DeployId = -1;

/// Deployment environment an instance runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Production,
    Staging,
    Utility,
}

impl Environment {
    /// Parse a metric namespace segment (`Production`, `Staging`, `Utility`).
    pub fn from_segment(segment: &str) -> Option<Self> {
        match segment {
            "Production" => Some(Environment::Production),
            "Staging" => Some(Environment::Staging),
            "Utility" => Some(Environment::Utility),
            _ => None,
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Environment::Production => "production",
            Environment::Staging => "staging",
            Environment::Utility => "utility",
        };
        f.write_str(name)
    }
}

/// Instance size class, split into a family and a size (`m1.small`).
///
/// The split form is what the size step tables are keyed by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeClass {
    pub family: String,
    pub size: String,
}

impl SizeClass {
    /// Parse a `family.size` string into a size class.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s.split_once('.') {
            Some((family, size)) if !family.is_empty() && !size.is_empty() => Ok(SizeClass {
                family: family.to_string(),
                size: size.to_string(),
            }),
            _ => Err(CoreError::InvalidSizeClass(s.to_string())),
        }
    }
}

impl fmt::Display for SizeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.family, self.size)
    }
}

/// A regularly sampled metric series.
///
/// Index `i` corresponds to wall-clock time `start + i * step` (epoch
/// seconds). Values have already been smoothed and gap-filled by ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    /// Epoch seconds of the first sample.
    pub start: u64,
    /// Sampling interval in seconds.
    pub step: u64,
    pub values: Vec<f64>,
}

impl TimeSeries {
    pub fn new(start: u64, step: u64, values: Vec<f64>) -> Self {
        Self { start, step, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Epoch timestamp of the sample at `index`.
    pub fn timestamp_at(&self, index: usize) -> u64 {
        self.start + index as u64 * self.step
    }
}

/// Whether a service uses the legacy deploy naming scheme.
///
/// Services migrated to the build system carry a `kbs.` prefix on their
/// deploy-side name; everything else is legacy and needs the `--legacy`
/// deploy flag.
pub fn is_legacy_service(service: &str) -> bool {
    !service.starts_with("kbs.")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_from_segment() {
        assert_eq!(
            Environment::from_segment("Production"),
            Some(Environment::Production)
        );
        assert_eq!(
            Environment::from_segment("Staging"),
            Some(Environment::Staging)
        );
        assert_eq!(
            Environment::from_segment("Utility"),
            Some(Environment::Utility)
        );
        // Lowercase segments are not valid namespace components.
        assert_eq!(Environment::from_segment("production"), None);
        assert_eq!(Environment::from_segment("Prod"), None);
    }

    #[test]
    fn environment_display_is_lowercase() {
        assert_eq!(Environment::Production.to_string(), "production");
        assert_eq!(Environment::Staging.to_string(), "staging");
    }

    #[test]
    fn size_class_parse_roundtrip() {
        let size = SizeClass::parse("m1.small").unwrap();
        assert_eq!(size.family, "m1");
        assert_eq!(size.size, "small");
        assert_eq!(size.to_string(), "m1.small");
    }

    #[test]
    fn size_class_rejects_malformed() {
        assert!(SizeClass::parse("m1small").is_err());
        assert!(SizeClass::parse("m1.").is_err());
        assert!(SizeClass::parse(".small").is_err());
        assert!(SizeClass::parse("").is_err());
    }

    #[test]
    fn size_class_splits_on_first_dot() {
        // Some families carry dotted suffixes; only the first dot splits.
        let size = SizeClass::parse("m2.2xlarge").unwrap();
        assert_eq!(size.family, "m2");
        assert_eq!(size.size, "2xlarge");
    }

    #[test]
    fn timeseries_timestamps() {
        let series = TimeSeries::new(1000, 60, vec![1.0, 2.0, 3.0]);
        assert_eq!(series.timestamp_at(0), 1000);
        assert_eq!(series.timestamp_at(2), 1120);
        assert_eq!(series.len(), 3);
    }

    #[test]
    fn legacy_naming() {
        assert!(is_legacy_service("knewmena"));
        assert!(is_legacy_service("study_service"));
        assert!(!is_legacy_service("kbs.KRS"));
    }
}
