//! Instance inventory client.

use queuepilot_core::{Environment, InstanceId, SizeClass};
use serde::Deserialize;
use tracing::debug;

use crate::error::{DeployError, DeployResult};
use crate::traits::InstanceMetadata;
use crate::transport;

/// Client for the instance inventory service.
#[derive(Debug, Clone)]
pub struct InventoryClient {
    /// `host:port` of the inventory service.
    addr: String,
}

#[derive(Debug, Deserialize)]
struct InstanceResponseBody {
    size_class: String,
}

impl InventoryClient {
    pub fn new(addr: impl Into<String>) -> Self {
        Self { addr: addr.into() }
    }
}

#[async_trait::async_trait]
impl InstanceMetadata for InventoryClient {
    async fn instance_size(
        &self,
        environment: Environment,
        instance_id: &InstanceId,
    ) -> DeployResult<SizeClass> {
        debug!(%environment, %instance_id, "looking up instance size");

        let path = format!("/instances/{environment}/{instance_id}");
        let response = transport::get(&self.addr, &path).await?;

        if response.status == http::StatusCode::NOT_FOUND {
            return Err(DeployError::InstanceNotFound {
                environment,
                instance_id: instance_id.clone(),
            });
        }
        if !response.status.is_success() {
            return Err(DeployError::Backend(format!(
                "inventory returned {}",
                response.status
            )));
        }

        let decoded: InstanceResponseBody = serde_json::from_slice(&response.body)
            .map_err(|e| DeployError::Decode(e.to_string()))?;
        SizeClass::parse(&decoded.size_class).map_err(|e| DeployError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_instance_response() {
        let decoded: InstanceResponseBody =
            serde_json::from_str(r#"{"size_class": "m1.xlarge"}"#).unwrap();
        assert_eq!(decoded.size_class, "m1.xlarge");
        assert!(SizeClass::parse(&decoded.size_class).is_ok());
    }
}
