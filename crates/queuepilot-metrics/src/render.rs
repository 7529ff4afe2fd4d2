//! Render API client.
//!
//! Fetches raw metric series from a Graphite-style `/render` endpoint.
//! The response is a JSON array of records, one per matched namespace:
//! `{ "name": ..., "start": epoch-secs, "step": secs, "values": [...] }`
//! with `null` for missing samples.

use std::collections::BTreeMap;
use std::time::Duration;

use http_body_util::BodyExt;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{IngestError, IngestResult};

const RENDER_TIMEOUT: Duration = Duration::from_secs(30);

/// One raw series returned by the render API.
#[derive(Debug, Clone, Deserialize)]
pub struct RenderSeries {
    pub name: String,
    /// Epoch seconds of the first sample.
    pub start: u64,
    /// Sampling interval in seconds.
    #[serde(default = "default_step")]
    pub step: u64,
    /// Raw samples; `None` where the store had no data.
    pub values: Vec<Option<f64>>,
}

fn default_step() -> u64 {
    60
}

/// Capability interface over the metrics store.
#[async_trait::async_trait]
pub trait MetricsSource {
    /// Fetch one raw series per target query.
    async fn render(
        &self,
        targets: &[String],
        options: &BTreeMap<String, String>,
    ) -> IngestResult<Vec<RenderSeries>>;
}

/// HTTP client for the render API.
#[derive(Debug, Clone)]
pub struct GraphiteClient {
    /// `host:port` of the render endpoint.
    addr: String,
}

impl GraphiteClient {
    pub fn new(addr: impl Into<String>) -> Self {
        Self { addr: addr.into() }
    }

    /// Build the `/render` path and query string for a set of targets.
    ///
    /// Render options are forwarded verbatim; each target becomes its own
    /// `&target=` parameter.
    pub fn build_render_path(targets: &[String], options: &BTreeMap<String, String>) -> String {
        let mut path = String::from("/render/?format=json");
        for (key, value) in options {
            path.push('&');
            path.push_str(key);
            path.push('=');
            path.push_str(value);
        }
        for target in targets {
            path.push_str("&target=");
            path.push_str(target);
        }
        path
    }
}

#[async_trait::async_trait]
impl MetricsSource for GraphiteClient {
    async fn render(
        &self,
        targets: &[String],
        options: &BTreeMap<String, String>,
    ) -> IngestResult<Vec<RenderSeries>> {
        let path = Self::build_render_path(targets, options);
        info!(addr = %self.addr, targets = targets.len(), "querying render API");

        let body = http_get(&self.addr, &path).await?;
        let records: Vec<RenderSeries> = serde_json::from_slice(&body)?;
        debug!(records = records.len(), "render response decoded");
        Ok(records)
    }
}

/// Plain HTTP/1.1 GET, returning the response body.
async fn http_get(addr: &str, path: &str) -> IngestResult<bytes::Bytes> {
    let fetch = async {
        let stream = tokio::net::TcpStream::connect(addr)
            .await
            .map_err(|e| IngestError::Source(format!("connect {addr}: {e}")))?;

        let io = hyper_util::rt::TokioIo::new(stream);
        let (mut sender, conn) = hyper::client::conn::http1::handshake(io)
            .await
            .map_err(|e| IngestError::Source(format!("handshake: {e}")))?;

        // Drive the connection in the background.
        tokio::spawn(async move {
            let _ = conn.await;
        });

        let req = http::Request::builder()
            .method("GET")
            .uri(path)
            .header("host", addr)
            .header("user-agent", "queuepilot-metrics/0.1")
            .body(http_body_util::Empty::<bytes::Bytes>::new())
            .map_err(|e| IngestError::Source(format!("request build: {e}")))?;

        let resp = sender
            .send_request(req)
            .await
            .map_err(|e| IngestError::Source(format!("request: {e}")))?;

        if !resp.status().is_success() {
            return Err(IngestError::Source(format!(
                "render API returned {}",
                resp.status()
            )));
        }

        let body = resp
            .into_body()
            .collect()
            .await
            .map_err(|e| IngestError::Source(format!("body: {e}")))?;
        Ok(body.to_bytes())
    };

    match tokio::time::timeout(RENDER_TIMEOUT, fetch).await {
        Ok(result) => result,
        Err(_) => Err(IngestError::Source(format!("render API timed out ({addr})"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_path_includes_options_and_targets() {
        let options = BTreeMap::from([("from".to_string(), "-180min".to_string())]);
        let targets = vec![
            "*.Production.Webservice-KRS.Instance.*.proxy_service_time_avg".to_string(),
            "*.Staging.Webservice-KRS.Instance.*.proxy_service_time_avg".to_string(),
        ];
        let path = GraphiteClient::build_render_path(&targets, &options);

        assert!(path.starts_with("/render/?format=json"));
        assert!(path.contains("&from=-180min"));
        assert_eq!(path.matches("&target=").count(), 2);
    }

    #[test]
    fn decode_render_response() {
        let payload = r#"[
            {
                "name": "Knewton.Staging.Webservice-KRS.i-deadbeef",
                "start": 1000,
                "step": 60,
                "values": [0.5, null, 1.5]
            }
        ]"#;
        let records: Vec<RenderSeries> = serde_json::from_str(payload).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].values, vec![Some(0.5), None, Some(1.5)]);
    }

    #[test]
    fn decode_defaults_step() {
        let payload = r#"[{"name": "n", "start": 0, "values": []}]"#;
        let records: Vec<RenderSeries> = serde_json::from_str(payload).unwrap();
        assert_eq!(records[0].step, 60);
    }
}
