//! A single HTTP send, behind a trait so the retry loop can be exercised
//! without a network.

use async_trait::async_trait;
use reqwest::Url;
use reqwest::header::HeaderMap;
use std::time::Duration;
use thiserror::Error;

/// Per-send transport failure. Recorded by the retry loop, never surfaced
/// to callers on its own.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SendError {
    #[error("request to {url} timed out after {timeout_ms}ms")]
    Timeout { url: String, timeout_ms: u128 },

    #[error("could not connect to {url}: {message}")]
    Connect { url: String, message: String },

    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },
}

/// Fully prepared POST.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
    pub timeout: Duration,
}

/// Status and body of a response that arrived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs one POST and reports what came back
#[async_trait]
pub trait RequestSender: Send + Sync {
    async fn send(&self, request: &OutboundRequest) -> Result<RawResponse, SendError>;
}

/// [`RequestSender`] backed by a shared `reqwest::Client`
#[derive(Debug, Clone, Default)]
pub struct ReqwestSender {
    client: reqwest::Client,
}

impl ReqwestSender {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RequestSender for ReqwestSender {
    async fn send(&self, request: &OutboundRequest) -> Result<RawResponse, SendError> {
        let classify = |e: reqwest::Error| {
            let url = request.url.to_string();
            if e.is_timeout() {
                SendError::Timeout {
                    url,
                    timeout_ms: request.timeout.as_millis(),
                }
            } else if e.is_connect() {
                SendError::Connect {
                    url,
                    message: e.to_string(),
                }
            } else {
                SendError::Request {
                    url,
                    message: e.to_string(),
                }
            }
        };

        let response = self
            .client
            .post(request.url.clone())
            .headers(request.headers.clone())
            .body(request.body.clone())
            .timeout(request.timeout)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(classify)?;

        Ok(RawResponse { status, body })
    }
}
