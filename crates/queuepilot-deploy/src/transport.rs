//! Minimal HTTP/1.1 plumbing shared by the deploy-side clients.

use std::time::Duration;

use http_body_util::BodyExt;

use crate::error::{DeployError, DeployResult};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Response status and body; callers decide what non-2xx means.
pub(crate) struct RawResponse {
    pub status: http::StatusCode,
    pub body: bytes::Bytes,
}

pub(crate) async fn get(addr: &str, path: &str) -> DeployResult<RawResponse> {
    request(addr, "GET", path, None).await
}

pub(crate) async fn post_json(addr: &str, path: &str, body: Vec<u8>) -> DeployResult<RawResponse> {
    request(addr, "POST", path, Some(body)).await
}

async fn request(
    addr: &str,
    method: &str,
    path: &str,
    body: Option<Vec<u8>>,
) -> DeployResult<RawResponse> {
    let send = async {
        let stream = tokio::net::TcpStream::connect(addr)
            .await
            .map_err(|e| DeployError::Transport(format!("connect {addr}: {e}")))?;

        let io = hyper_util::rt::TokioIo::new(stream);
        let (mut sender, conn) = hyper::client::conn::http1::handshake(io)
            .await
            .map_err(|e| DeployError::Transport(format!("handshake: {e}")))?;

        tokio::spawn(async move {
            let _ = conn.await;
        });

        let mut builder = http::Request::builder()
            .method(method)
            .uri(path)
            .header("host", addr)
            .header("user-agent", "queuepilot-deploy/0.1");
        if body.is_some() {
            builder = builder.header("content-type", "application/json");
        }
        let req = builder
            .body(http_body_util::Full::new(bytes::Bytes::from(
                body.unwrap_or_default(),
            )))
            .map_err(|e| DeployError::Transport(format!("request build: {e}")))?;

        let resp = sender
            .send_request(req)
            .await
            .map_err(|e| DeployError::Transport(format!("request: {e}")))?;

        let status = resp.status();
        let collected = resp
            .into_body()
            .collect()
            .await
            .map_err(|e| DeployError::Transport(format!("body: {e}")))?;

        Ok(RawResponse {
            status,
            body: collected.to_bytes(),
        })
    };

    match tokio::time::timeout(REQUEST_TIMEOUT, send).await {
        Ok(result) => result,
        Err(_) => Err(DeployError::Transport(format!("timed out ({addr})"))),
    }
}
