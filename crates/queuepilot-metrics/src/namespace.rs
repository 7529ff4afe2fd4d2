//! Metric namespace parsing.
//!
//! A namespace like `Knewton.Staging.Webservice-KRS.i-deadbeef` carries the
//! instance's identity across dot-separated segments in no fixed order:
//! exactly one segment names the environment, exactly one names the service
//! (translated to its deploy-side name), and exactly one is an instance id.

use queuepilot_core::{Environment, deploy_service_name};
use regex::Regex;
use tracing::debug;

use crate::error::{IngestError, IngestResult};

/// Anchored pattern for instance-id segments.
pub const INSTANCE_ID_PATTERN: &str = r"^i-[0-9a-f]+$";

/// Extract `(environment, deploy-side service, instance id)` from a metric
/// namespace.
///
/// Each of the three must be identified by exactly one segment; zero or
/// multiple candidates for any of them make the namespace unparsable.
pub fn parse_namespace(namespace: &str) -> IngestResult<(Environment, String, String)> {
    let instance_re = Regex::new(INSTANCE_ID_PATTERN)?;
    parse_with(namespace, &instance_re)
}

/// As [`parse_namespace`], with a caller-compiled instance-id pattern so
/// bulk ingest compiles it once.
pub fn parse_with(
    namespace: &str,
    instance_re: &Regex,
) -> IngestResult<(Environment, String, String)> {
    let mut env = None;
    let mut service = None;
    let mut instance = None;

    for segment in namespace.split('.') {
        if let Some(parsed) = Environment::from_segment(segment) {
            if env.replace(parsed).is_some() {
                return Err(IngestError::UnparsableNamespace(namespace.to_string()));
            }
        } else if segment.contains("Application") || segment.contains("Webservice") {
            let Some(mapped) = deploy_service_name(segment) else {
                return Err(IngestError::UnparsableNamespace(namespace.to_string()));
            };
            if service.replace(mapped).is_some() {
                return Err(IngestError::UnparsableNamespace(namespace.to_string()));
            }
        } else if instance_re.is_match(segment) {
            if instance.replace(segment).is_some() {
                return Err(IngestError::UnparsableNamespace(namespace.to_string()));
            }
        }
    }

    match (env, service, instance) {
        (Some(env), Some(service), Some(instance)) => {
            debug!(%env, service, instance, "parsed namespace");
            Ok((env, service.to_string(), instance.to_string()))
        }
        _ => Err(IngestError::UnparsableNamespace(namespace.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_namespace() {
        let (env, service, instance) =
            parse_namespace("Knewton.Staging.Webservice-KRS.i-deadbeef").unwrap();
        assert_eq!(env, Environment::Staging);
        assert_eq!(service, "kbs.KRS");
        assert_eq!(instance, "i-deadbeef");
    }

    #[test]
    fn segment_order_does_not_matter() {
        let (env, service, instance) = parse_namespace(
            "scale(Knewton.Production.Application-Knewmena.Instance.i-0badf00d.arrival_rate)",
        )
        .unwrap();
        assert_eq!(env, Environment::Production);
        assert_eq!(service, "knewmena");
        assert_eq!(instance, "i-0badf00d");
    }

    #[test]
    fn missing_instance_segment_is_unparsable() {
        let err = parse_namespace("Knewton.Staging.Webservice-KRS.metric").unwrap_err();
        assert!(matches!(err, IngestError::UnparsableNamespace(_)));
    }

    #[test]
    fn missing_environment_is_unparsable() {
        assert!(parse_namespace("Knewton.Webservice-KRS.i-deadbeef").is_err());
    }

    #[test]
    fn unknown_service_is_unparsable() {
        assert!(parse_namespace("Knewton.Staging.Webservice-Nope.i-deadbeef").is_err());
    }

    #[test]
    fn duplicate_environment_is_unparsable() {
        assert!(parse_namespace("Production.Staging.Webservice-KRS.i-deadbeef").is_err());
    }

    #[test]
    fn duplicate_instance_is_unparsable() {
        assert!(parse_namespace("Knewton.Staging.Webservice-KRS.i-deadbeef.i-0badf00d").is_err());
    }

    #[test]
    fn instance_pattern_is_anchored() {
        // "Instance" and "api-frontend" must not read as instance ids.
        let (_, _, instance) =
            parse_namespace("Production.Webservice-Course.Instance.i-00c0ffee").unwrap();
        assert_eq!(instance, "i-00c0ffee");
    }
}
