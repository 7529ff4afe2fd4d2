//! HTTP client for the forecasting service.
//!
//! `POST /forecast` with the smoothed series and model selection; the
//! service answers either with the forecast payload or an explicit
//! insufficient-data status.

use std::time::Duration;

use http_body_util::BodyExt;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ForecastError, ForecastResult};
use crate::gate::{ForecastOutput, Forecaster};

const FORECAST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Serialize)]
struct ForecastRequestBody<'a> {
    series: &'a [f64],
    model_type: &'a str,
    horizon: usize,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum ForecastResponseBody {
    Ok {
        fitted: Vec<f64>,
        mean: Vec<f64>,
        method: String,
    },
    InsufficientData,
}

/// Forecast service client.
#[derive(Debug, Clone)]
pub struct ForecastClient {
    /// `host:port` of the forecast service.
    addr: String,
}

impl ForecastClient {
    pub fn new(addr: impl Into<String>) -> Self {
        Self { addr: addr.into() }
    }
}

#[async_trait::async_trait]
impl Forecaster for ForecastClient {
    async fn forecast(
        &self,
        series: &[f64],
        model_type: &str,
        horizon: usize,
    ) -> ForecastResult<Option<ForecastOutput>> {
        let body = serde_json::to_vec(&ForecastRequestBody {
            series,
            model_type,
            horizon,
        })
        .map_err(|e| ForecastError::Unavailable(format!("encode request: {e}")))?;

        let response = http_post(&self.addr, "/forecast", body).await?;
        let decoded: ForecastResponseBody = serde_json::from_slice(&response)
            .map_err(|e| ForecastError::Unavailable(format!("decode response: {e}")))?;

        match decoded {
            ForecastResponseBody::Ok { fitted, mean, method } => {
                debug!(addr = %self.addr, %method, points = mean.len(), "forecast received");
                Ok(Some(ForecastOutput { fitted, mean, method }))
            }
            ForecastResponseBody::InsufficientData => Ok(None),
        }
    }
}

/// Plain HTTP/1.1 POST with a JSON body, returning the response body.
async fn http_post(addr: &str, path: &str, body: Vec<u8>) -> ForecastResult<bytes::Bytes> {
    let unavailable = |msg: String| ForecastError::Unavailable(msg);

    let send = async {
        let stream = tokio::net::TcpStream::connect(addr)
            .await
            .map_err(|e| unavailable(format!("connect {addr}: {e}")))?;

        let io = hyper_util::rt::TokioIo::new(stream);
        let (mut sender, conn) = hyper::client::conn::http1::handshake(io)
            .await
            .map_err(|e| unavailable(format!("handshake: {e}")))?;

        tokio::spawn(async move {
            let _ = conn.await;
        });

        let req = http::Request::builder()
            .method("POST")
            .uri(path)
            .header("host", addr)
            .header("content-type", "application/json")
            .header("user-agent", "queuepilot-forecast/0.1")
            .body(http_body_util::Full::new(bytes::Bytes::from(body)))
            .map_err(|e| unavailable(format!("request build: {e}")))?;

        let resp = sender
            .send_request(req)
            .await
            .map_err(|e| unavailable(format!("request: {e}")))?;

        if !resp.status().is_success() {
            return Err(unavailable(format!(
                "forecast service returned {}",
                resp.status()
            )));
        }

        let collected = resp
            .into_body()
            .collect()
            .await
            .map_err(|e| unavailable(format!("body: {e}")))?;
        Ok(collected.to_bytes())
    };

    match tokio::time::timeout(FORECAST_TIMEOUT, send).await {
        Ok(result) => result,
        Err(_) => Err(ForecastError::Unavailable(format!(
            "forecast service timed out ({addr})"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_ok_response() {
        let payload = r#"{
            "status": "ok",
            "fitted": [0.1, 0.2],
            "mean": [0.5, 0.6, 0.7],
            "method": "ETS(A,N,N)"
        }"#;
        let decoded: ForecastResponseBody = serde_json::from_str(payload).unwrap();
        assert!(matches!(
            decoded,
            ForecastResponseBody::Ok { ref mean, .. } if mean.len() == 3
        ));
    }

    #[test]
    fn decode_insufficient_data_response() {
        let decoded: ForecastResponseBody =
            serde_json::from_str(r#"{"status": "insufficient_data"}"#).unwrap();
        assert!(matches!(decoded, ForecastResponseBody::InsufficientData));
    }

    #[test]
    fn encode_request_body() {
        let body = ForecastRequestBody {
            series: &[0.1, 0.2],
            model_type: "ZZZ",
            horizon: 5,
        };
        let encoded = serde_json::to_string(&body).unwrap();
        assert!(encoded.contains(r#""model_type":"ZZZ""#));
        assert!(encoded.contains(r#""horizon":5"#));
    }
}
