//! Completion transport port
//!
//! Defines the interface for sending a chat-completion request and getting
//! back a deserialized [`Envelope`]. Retries, backoff and address fallback
//! are the adapter's business; callers only see the aggregated outcome.

use async_trait::async_trait;
use quizgen_domain::{CompletionRequest, Envelope};
use thiserror::Error;

/// Errors that surface from a dispatch once the adapter has given up
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// Every attempt against every candidate URL failed.
    #[error("request failed after {attempts} attempt(s) and {sends} send(s): {last_error}")]
    Exhausted {
        attempts: u32,
        sends: u32,
        last_error: String,
    },

    /// A response body arrived that is not JSON. Never retried.
    #[error("response body is not valid JSON: {0}")]
    MalformedEnvelope(String),

    /// The request could not even be prepared (bad URL, serialization).
    #[error("could not build request: {0}")]
    InvalidRequest(String),
}

impl DispatchError {
    /// Message of the last recorded failure, if retries were exhausted.
    pub fn last_error(&self) -> Option<&str> {
        match self {
            DispatchError::Exhausted { last_error, .. } => Some(last_error),
            _ => None,
        }
    }
}

/// Transport for chat-completion calls
///
/// Implementations live in the infrastructure layer. A single instance is
/// shared by concurrent generation requests, so implementations must not
/// keep per-request mutable state.
#[async_trait]
pub trait CompletionTransport: Send + Sync {
    /// Send `request` and return the first envelope that carries content.
    async fn dispatch(&self, request: &CompletionRequest) -> Result<Envelope, DispatchError>;
}
