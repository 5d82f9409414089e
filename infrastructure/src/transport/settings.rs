//! Immutable settings handed to the transport at construction.

use super::backoff::BackoffPolicy;
use reqwest::Url;
use std::fmt;
use std::net::IpAddr;
use std::time::Duration;

/// Network behaviour of a dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    /// DNS servers to query; empty means the system configuration
    pub resolvers: Vec<IpAddr>,
    /// Numeric addresses tried when the endpoint host does not resolve
    pub fallback_addresses: Vec<IpAddr>,
    /// Passes over the candidate list, at least 1
    pub retry_attempts: u32,
    pub backoff: BackoffPolicy,
    /// Per-send timeout
    pub timeout: Duration,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            resolvers: vec![
                IpAddr::from([8, 8, 8, 8]),
                IpAddr::from([1, 1, 1, 1]),
            ],
            fallback_addresses: Vec::new(),
            retry_attempts: 3,
            backoff: BackoffPolicy::default(),
            timeout: Duration::from_millis(10_000),
        }
    }
}

/// What to ask the completion endpoint for, and who is asking
#[derive(Clone)]
pub struct CompletionSettings {
    pub endpoint: Url,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub api_key: String,
    pub referer: String,
    pub title: String,
    pub user_agent: String,
}

// Keep the credential out of logs
impl fmt::Debug for CompletionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionSettings")
            .field("endpoint", &self.endpoint.as_str())
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("api_key", &"<redacted>")
            .field("referer", &self.referer)
            .field("title", &self.title)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}
