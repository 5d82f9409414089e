//! HTTP completion transport
//!
//! Implements [`CompletionTransport`] over the retry schedule:
//!
//! - transport failures and error statuses are recorded and retried
//! - a body that is not JSON stops the dispatch at once
//! - the first success status carrying content wins

use super::retry::{RetrySchedule, RetryStep};
use super::sender::{OutboundRequest, RawResponse, ReqwestSender, RequestSender};
use super::settings::{CompletionSettings, NetworkConfig};
use crate::network::{DnsHostResolver, HostResolver, plan_candidates};
use async_trait::async_trait;
use quizgen_application::{CompletionTransport, DispatchError};
use quizgen_domain::core::string::truncate;
use quizgen_domain::{ChatMessage, CompletionRequest, Envelope};
use reqwest::header::{
    AUTHORIZATION, CONTENT_TYPE, HOST, HeaderMap, HeaderName, HeaderValue, USER_AGENT,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Error bodies are cut to this many bytes in logs and messages.
pub const MAX_ERROR_BODY_BYTES: usize = 500;

const MISSING_CONTENT: &str = "response missing choices[0].message.content";

const HTTP_REFERER: HeaderName = HeaderName::from_static("http-referer");
const X_TITLE: HeaderName = HeaderName::from_static("x-title");

/// Errors that can occur while building the transport
#[derive(Error, Debug)]
pub enum TransportBuildError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Wire body of a chat-completion call
#[derive(Debug, Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

/// What a single received response means for the retry loop
enum Outcome {
    Delivered(Envelope),
    Failed(String),
}

/// Completion transport with DNS fallback and bounded retries
///
/// Holds only immutable settings and shared handles, so one instance can
/// serve concurrent requests.
pub struct HttpCompletionTransport {
    settings: Arc<CompletionSettings>,
    network: Arc<NetworkConfig>,
    sender: Arc<dyn RequestSender>,
    resolver: Arc<dyn HostResolver>,
}

impl HttpCompletionTransport {
    /// Build with a reqwest client and a hickory resolver.
    pub fn new(
        settings: CompletionSettings,
        network: NetworkConfig,
    ) -> Result<Self, TransportBuildError> {
        let client = reqwest::Client::builder().build()?;
        let resolver = DnsHostResolver::new(&network.resolvers, network.timeout);
        Ok(Self::with_parts(
            settings,
            network,
            Arc::new(ReqwestSender::new(client)),
            Arc::new(resolver),
        ))
    }

    /// Build from explicit collaborators.
    pub fn with_parts(
        settings: CompletionSettings,
        network: NetworkConfig,
        sender: Arc<dyn RequestSender>,
        resolver: Arc<dyn HostResolver>,
    ) -> Self {
        Self {
            settings: Arc::new(settings),
            network: Arc::new(network),
            sender,
            resolver,
        }
    }

    pub fn settings(&self) -> &CompletionSettings {
        &self.settings
    }

    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }

    fn body(&self, request: &CompletionRequest) -> Result<Vec<u8>, DispatchError> {
        let body = ChatCompletionBody {
            model: &self.settings.model,
            messages: &request.messages,
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        };
        serde_json::to_vec(&body).map_err(|e| DispatchError::InvalidRequest(e.to_string()))
    }

    fn headers(&self, host_header: Option<&str>) -> Result<HeaderMap, DispatchError> {
        let value = |name: &str, raw: &str| {
            HeaderValue::from_str(raw)
                .map_err(|e| DispatchError::InvalidRequest(format!("invalid {} header: {}", name, e)))
        };

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut authorization = value(
            "Authorization",
            &format!("Bearer {}", self.settings.api_key),
        )?;
        authorization.set_sensitive(true);
        headers.insert(AUTHORIZATION, authorization);

        if !self.settings.referer.is_empty() {
            headers.insert(HTTP_REFERER, value("HTTP-Referer", &self.settings.referer)?);
        }
        if !self.settings.title.is_empty() {
            headers.insert(X_TITLE, value("X-Title", &self.settings.title)?);
        }
        if !self.settings.user_agent.is_empty() {
            headers.insert(USER_AGENT, value("User-Agent", &self.settings.user_agent)?);
        }
        if let Some(host) = host_header {
            headers.insert(HOST, value("Host", host)?);
        }

        Ok(headers)
    }
}

/// Classify a response that arrived.
///
/// A body that is not JSON is fatal for the whole dispatch.
fn interpret(response: RawResponse) -> Result<Outcome, DispatchError> {
    let value: Value = serde_json::from_str(&response.body).map_err(|e| {
        DispatchError::MalformedEnvelope(format!(
            "{} (HTTP {}, body: {})",
            e,
            response.status,
            truncate(&response.body, MAX_ERROR_BODY_BYTES)
        ))
    })?;

    if !response.is_success() {
        return Ok(Outcome::Failed(format!(
            "HTTP {}: {}",
            response.status,
            truncate(&value.to_string(), MAX_ERROR_BODY_BYTES)
        )));
    }

    match Envelope::from_value(value) {
        Ok(envelope) if envelope.content().is_some() => Ok(Outcome::Delivered(envelope)),
        Ok(_) => Ok(Outcome::Failed(MISSING_CONTENT.to_string())),
        Err(e) => Ok(Outcome::Failed(format!("response envelope has unexpected shape: {}", e))),
    }
}

#[async_trait]
impl CompletionTransport for HttpCompletionTransport {
    async fn dispatch(&self, request: &CompletionRequest) -> Result<Envelope, DispatchError> {
        let body = self.body(request)?;
        let candidates = plan_candidates(
            &self.settings.endpoint,
            self.resolver.as_ref(),
            &self.network.fallback_addresses,
        )
        .await;

        let outbound = candidates
            .iter()
            .map(|candidate| {
                Ok(OutboundRequest {
                    url: candidate.url.clone(),
                    headers: self.headers(candidate.host_header.as_deref())?,
                    body: body.clone(),
                    timeout: self.network.timeout,
                })
            })
            .collect::<Result<Vec<_>, DispatchError>>()?;

        let mut schedule = RetrySchedule::new(
            self.network.retry_attempts,
            outbound.len(),
            self.network.backoff,
        );

        loop {
            match schedule.next_step() {
                RetryStep::Send { attempt, url_index } => {
                    let outbound = &outbound[url_index];
                    debug!(attempt, url = %outbound.url, model = %self.settings.model, "Sending completion request");

                    let failure = match self.sender.send(outbound).await {
                        Ok(response) => match interpret(response)? {
                            Outcome::Delivered(envelope) => {
                                info!(attempt, url = %outbound.url, sends = schedule.sends(), "Completion received");
                                return Ok(envelope);
                            }
                            Outcome::Failed(message) => message,
                        },
                        Err(e) => e.to_string(),
                    };

                    warn!(attempt, url = %outbound.url, error = %failure, "Completion request failed");
                    schedule.record_failure(failure);
                }
                RetryStep::Backoff {
                    after_attempt,
                    delay,
                } => {
                    debug!(
                        attempt = after_attempt,
                        delay_ms = delay.as_millis() as u64,
                        "Backing off before retry"
                    );
                    tokio::time::sleep(delay).await;
                }
                RetryStep::Exhausted {
                    attempts,
                    sends,
                    last_error,
                } => {
                    warn!(attempts, sends, error = %last_error, "Completion retries exhausted");
                    return Err(DispatchError::Exhausted {
                        attempts,
                        sends,
                        last_error,
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::LookupError;
    use crate::transport::backoff::BackoffPolicy;
    use crate::transport::sender::SendError;
    use reqwest::Url;
    use serde_json::json;
    use std::net::IpAddr;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::time::Instant;

    type Responder = Box<dyn Fn(usize, &OutboundRequest) -> Result<RawResponse, SendError> + Send + Sync>;

    struct FakeSender {
        responder: Responder,
        sent: Mutex<Vec<OutboundRequest>>,
    }

    impl FakeSender {
        fn new(
            responder: impl Fn(usize, &OutboundRequest) -> Result<RawResponse, SendError>
            + Send
            + Sync
            + 'static,
        ) -> Arc<Self> {
            Arc::new(Self {
                responder: Box::new(responder),
                sent: Mutex::new(Vec::new()),
            })
        }

        fn sent_urls(&self) -> Vec<String> {
            self.sent
                .lock()
                .unwrap()
                .iter()
                .map(|r| r.url.to_string())
                .collect()
        }
    }

    #[async_trait]
    impl RequestSender for FakeSender {
        async fn send(&self, request: &OutboundRequest) -> Result<RawResponse, SendError> {
            let index = {
                let mut sent = self.sent.lock().unwrap();
                sent.push(request.clone());
                sent.len() - 1
            };
            (self.responder)(index, request)
        }
    }

    struct Unresolvable;

    #[async_trait]
    impl HostResolver for Unresolvable {
        async fn resolve(&self, host: &str) -> Result<Vec<IpAddr>, LookupError> {
            Err(LookupError::NoAddresses {
                host: host.to_string(),
            })
        }
    }

    struct Resolvable;

    #[async_trait]
    impl HostResolver for Resolvable {
        async fn resolve(&self, _host: &str) -> Result<Vec<IpAddr>, LookupError> {
            Ok(vec![IpAddr::from([203, 0, 113, 9])])
        }
    }

    fn settings() -> CompletionSettings {
        CompletionSettings {
            endpoint: Url::parse("https://api.example.test/v1/chat/completions").unwrap(),
            model: "openai/gpt-4o-mini".to_string(),
            temperature: 0.7,
            max_tokens: 2000,
            api_key: "sk-test".to_string(),
            referer: "https://quizgen.local".to_string(),
            title: "quizgen".to_string(),
            user_agent: "quizgen/test".to_string(),
        }
    }

    fn network(fallbacks: &[&str], retry_attempts: u32) -> NetworkConfig {
        NetworkConfig {
            resolvers: vec![],
            fallback_addresses: fallbacks.iter().map(|s| s.parse().unwrap()).collect(),
            retry_attempts,
            backoff: BackoffPolicy::from_millis(1000, 8000),
            timeout: Duration::from_millis(10_000),
        }
    }

    fn ok_body(content: &str) -> Result<RawResponse, SendError> {
        Ok(RawResponse::new(
            200,
            json!({"choices": [{"message": {"role": "assistant", "content": content}}]}).to_string(),
        ))
    }

    fn timeout(request: &OutboundRequest) -> Result<RawResponse, SendError> {
        Err(SendError::Timeout {
            url: request.url.to_string(),
            timeout_ms: 10_000,
        })
    }

    fn transport(
        network: NetworkConfig,
        sender: Arc<FakeSender>,
        resolver: Arc<dyn HostResolver>,
    ) -> HttpCompletionTransport {
        HttpCompletionTransport::with_parts(settings(), network, sender, resolver)
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_candidate_succeeds_after_first_times_out() {
        let sender = FakeSender::new(|_, request| {
            if request.url.host_str() == Some("10.0.0.1") {
                timeout(request)
            } else {
                ok_body("{\"title\":\"T\"}")
            }
        });
        let transport = transport(
            network(&["10.0.0.1", "10.0.0.2"], 3),
            Arc::clone(&sender),
            Arc::new(Unresolvable),
        );
        let start = Instant::now();

        let envelope = transport.dispatch(&CompletionRequest::user("q")).await.unwrap();

        assert_eq!(envelope.content(), Some("{\"title\":\"T\"}"));
        assert_eq!(
            sender.sent_urls(),
            vec![
                "https://10.0.0.1/v1/chat/completions",
                "https://10.0.0.2/v1/chat/completions"
            ]
        );
        // No backoff within a single attempt
        assert_eq!(start.elapsed(), Duration::ZERO);
        for request in sender.sent.lock().unwrap().iter() {
            assert_eq!(request.headers.get(HOST).unwrap(), "api.example.test");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_reports_last_error_and_send_count() {
        let sender = FakeSender::new(|index, request| {
            if index % 2 == 0 {
                timeout(request)
            } else {
                Ok(RawResponse::new(
                    503,
                    json!({"error": {"message": format!("overloaded #{}", index)}}).to_string(),
                ))
            }
        });
        let transport = transport(
            network(&["10.0.0.1", "10.0.0.2"], 3),
            Arc::clone(&sender),
            Arc::new(Unresolvable),
        );
        let start = Instant::now();

        let err = transport
            .dispatch(&CompletionRequest::user("q"))
            .await
            .unwrap_err();

        match &err {
            DispatchError::Exhausted {
                attempts,
                sends,
                last_error,
            } => {
                assert_eq!(*attempts, 3);
                assert_eq!(*sends, 6);
                assert!(last_error.starts_with("HTTP 503"));
                assert!(last_error.contains("overloaded #5"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(sender.sent_urls().len(), 6);
        // Backoff after attempts 1 and 2 only
        assert_eq!(start.elapsed(), Duration::from_millis(3000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_json_body_stops_immediately() {
        let sender = FakeSender::new(|_, _| Ok(RawResponse::new(502, "<html>Bad Gateway</html>")));
        let transport = transport(network(&[], 3), Arc::clone(&sender), Arc::new(Resolvable));

        let err = transport
            .dispatch(&CompletionRequest::user("q"))
            .await
            .unwrap_err();

        assert!(matches!(err, DispatchError::MalformedEnvelope(ref m) if m.contains("HTTP 502")));
        assert_eq!(sender.sent_urls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_without_content_is_retried() {
        let sender = FakeSender::new(|index, _| {
            if index < 2 {
                Ok(RawResponse::new(200, r#"{"choices":[]}"#))
            } else {
                ok_body("quiz")
            }
        });
        let transport = transport(network(&[], 3), Arc::clone(&sender), Arc::new(Resolvable));
        let start = Instant::now();

        let envelope = transport.dispatch(&CompletionRequest::user("q")).await.unwrap();

        assert_eq!(envelope.content(), Some("quiz"));
        assert_eq!(sender.sent_urls().len(), 3);
        assert_eq!(start.elapsed(), Duration::from_millis(3000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_content_message_on_exhaustion() {
        let sender = FakeSender::new(|_, _| Ok(RawResponse::new(200, r#"{"choices":[{"message":{"content":"  "}}]}"#)));
        let transport = transport(network(&[], 2), Arc::clone(&sender), Arc::new(Resolvable));

        let err = transport
            .dispatch(&CompletionRequest::user("q"))
            .await
            .unwrap_err();
        assert_eq!(err.last_error(), Some(MISSING_CONTENT));
    }

    #[tokio::test(start_paused = true)]
    async fn test_misshapen_envelope_is_reported_as_such() {
        let sender = FakeSender::new(|_, _| {
            Ok(RawResponse::new(200, r#"{"choices":[{"message":{"content":42}}]}"#))
        });
        let transport = transport(network(&[], 1), Arc::clone(&sender), Arc::new(Resolvable));

        let err = transport
            .dispatch(&CompletionRequest::user("q"))
            .await
            .unwrap_err();
        let last_error = err.last_error().unwrap();
        assert!(last_error.starts_with("response envelope has unexpected shape"));
        assert_ne!(last_error, MISSING_CONTENT);
    }

    #[tokio::test(start_paused = true)]
    async fn test_extra_fields_of_any_type_still_deliver() {
        let sender = FakeSender::new(|_, _| {
            Ok(RawResponse::new(
                200,
                json!({
                    "model": 7,
                    "choices": [{"message": {"role": null, "content": "quiz"}, "finish_reason": 1}]
                })
                .to_string(),
            ))
        });
        let transport = transport(network(&[], 1), Arc::clone(&sender), Arc::new(Resolvable));

        let envelope = transport.dispatch(&CompletionRequest::user("q")).await.unwrap();
        assert_eq!(envelope.content(), Some("quiz"));
        assert_eq!(sender.sent_urls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wire_body_and_headers() {
        let sender = FakeSender::new(|_, _| ok_body("quiz"));
        let transport = transport(network(&["10.0.0.1"], 1), Arc::clone(&sender), Arc::new(Resolvable));

        transport
            .dispatch(&CompletionRequest::user("Make a quiz"))
            .await
            .unwrap();

        let sent = sender.sent.lock().unwrap();
        let request = &sent[0];
        assert_eq!(
            request.url.as_str(),
            "https://api.example.test/v1/chat/completions"
        );

        let body: Value = serde_json::from_slice(&request.body).unwrap();
        assert_eq!(body["model"], "openai/gpt-4o-mini");
        assert_eq!(body["max_tokens"], 2000);
        assert!((body["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
        assert_eq!(
            body["messages"],
            json!([{"role": "user", "content": "Make a quiz"}])
        );

        let headers = &request.headers;
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer sk-test");
        assert_eq!(headers.get(HTTP_REFERER).unwrap(), "https://quizgen.local");
        assert_eq!(headers.get(X_TITLE).unwrap(), "quizgen");
        assert_eq!(headers.get(USER_AGENT).unwrap(), "quizgen/test");
        assert!(headers.get(HOST).is_none());
    }

    #[test]
    fn test_error_bodies_are_truncated() {
        let long = json!({"error": "x".repeat(2000)}).to_string();
        match interpret(RawResponse::new(500, long)).unwrap() {
            Outcome::Failed(message) => {
                assert!(message.len() <= "HTTP 500: ".len() + MAX_ERROR_BODY_BYTES);
                assert!(message.ends_with("..."));
            }
            Outcome::Delivered(_) => panic!("error status must not deliver"),
        }
    }
}
