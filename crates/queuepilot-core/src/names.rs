//! Translation between metric-side and deploy-side service names.
//!
//! The metrics store namespaces services as `Application-*` / `Webservice-*`;
//! the deploy backend uses its own short names. This table maps the former
//! to the latter. Services absent from the table are not monitored.

/// Deploy-side name for a metric-side service segment, if known.
pub fn deploy_service_name(metric_name: &str) -> Option<&'static str> {
    let name = match metric_name {
        "Application-Knewmena" => "knewmena",
        "Application-Proctoring" => "proctoring_application",
        "Application-Knewdle" => "knewdle",
        "Application-BuyFlow" => "buy_flow",
        "Webservice-KRS" => "kbs.KRS",
        "Webservice-Observation" => "kbs.Observation",
        "Webservice-Course" => "kbs.Course",
        "Webservice-Authentication" => "kbs.Authentication",
        "Webservice-Study" => "study_service",
        "Webservice-Schedule" => "schedule_service",
        _ => return None,
    };
    Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_webservice_maps_to_kbs_name() {
        assert_eq!(deploy_service_name("Webservice-KRS"), Some("kbs.KRS"));
    }

    #[test]
    fn known_application_maps_to_short_name() {
        assert_eq!(deploy_service_name("Application-Knewmena"), Some("knewmena"));
    }

    #[test]
    fn unknown_service_is_none() {
        assert_eq!(deploy_service_name("Webservice-Unknown"), None);
    }
}
