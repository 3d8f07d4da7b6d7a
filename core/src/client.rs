use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::config::MediConfig;
use crate::errors::GatewayFailure;
use crate::render::API_ERROR_MARKER;
use crate::retry::{execute_with_retry, RetryPolicy};
use crate::types::*;

/// Status, reason phrase and body of one HTTP exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub status_text: String,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends one JSON request and hands back the raw response
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post_json(
        &self,
        url: &str,
        request: &GenerateContentRequest,
    ) -> Result<RawResponse, GatewayFailure>;
}

/// [`Transport`] over HTTP using reqwest
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_json(
        &self,
        url: &str,
        request: &GenerateContentRequest,
    ) -> Result<RawResponse, GatewayFailure> {
        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|e| GatewayFailure::Transport(e.without_url().to_string()))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            GatewayFailure::Transport(format!("Failed to read response body: {}", e.without_url()))
        })?;

        Ok(RawResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            body,
        })
    }
}

/// Where requests go and which key to use when the caller has none
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub base_url: String,
    pub model_name: String,
    pub fallback_key: String,
}

impl Endpoint {
    pub fn from_config(config: &MediConfig) -> Self {
        Self {
            base_url: config.api_base_url().trim_end_matches('/').to_string(),
            model_name: config.model_name().to_string(),
            fallback_key: config.fallback_api_key().to_string(),
        }
    }

    /// Uses the manual key when it is non-empty, otherwise the fallback key
    pub fn url_for(&self, manual_key: Option<&str>) -> String {
        let key = manual_key
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .unwrap_or(&self.fallback_key);

        format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model_name, key
        )
    }
}

/// Result of a gateway call once retries are settled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayOutcome {
    Content(String),
    Failure(String),
}

impl GatewayOutcome {
    /// Single-channel form used by the transcript and renderer
    pub fn into_display_text(self) -> String {
        match self {
            GatewayOutcome::Content(text) => text,
            GatewayOutcome::Failure(reason) => error_text(&reason),
        }
    }
}

/// Marker-prefixed error string
pub fn error_text(reason: &str) -> String {
    format!("{} {}", API_ERROR_MARKER, reason)
}

/// Gateway to the generateContent endpoint
#[derive(Debug, Clone)]
pub struct GeminiGateway<T: Transport = HttpTransport> {
    transport: T,
    endpoint: Endpoint,
    policy: RetryPolicy,
}

impl GeminiGateway<HttpTransport> {
    /// Create a gateway over HTTP from configuration
    pub fn from_config(config: &MediConfig) -> Self {
        Self::new(
            HttpTransport::new(),
            Endpoint::from_config(config),
            RetryPolicy::new(config.max_attempts(), config.base_delay()),
        )
    }
}

impl<T: Transport> GeminiGateway<T> {
    pub fn new(transport: T, endpoint: Endpoint, policy: RetryPolicy) -> Self {
        Self {
            transport,
            endpoint,
            policy,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Sends `request`, retrying classified failures with backoff.
    ///
    /// Never fails: the outcome is either the reply text or the last failure
    /// message.
    pub async fn call(
        &self,
        request: &GenerateContentRequest,
        manual_key: Option<&str>,
        expect_structured: bool,
    ) -> GatewayOutcome {
        let manual_key_used = manual_key.is_some_and(|key| !key.trim().is_empty());
        let endpoint_url = self.endpoint.url_for(manual_key);
        info!(
            model = %self.endpoint.model_name,
            turns = request.contents.len(),
            expect_structured,
            manual_key_used,
            "Calling Gemini API"
        );

        let url = endpoint_url.as_str();
        let result = execute_with_retry(&self.policy, |attempt| {
            async move {
                debug!(attempt = attempt + 1, "Sending generateContent request");
                let response = self.transport.post_json(url, request).await?;
                extract_reply(response, manual_key_used)
            }
        })
        .await;

        match result {
            Ok(text) => GatewayOutcome::Content(text),
            Err(failure) => {
                warn!(error = %failure, "Gemini API call failed");
                GatewayOutcome::Failure(failure.to_string())
            }
        }
    }
}

fn extract_reply(response: RawResponse, manual_key_used: bool) -> Result<String, GatewayFailure> {
    if !response.is_success() {
        return Err(GatewayFailure::from_status(
            response.status,
            &response.status_text,
            &response.body,
            manual_key_used,
        ));
    }

    let parsed: GenerateContentResponse = serde_json::from_str(&response.body)
        .map_err(|e| GatewayFailure::MalformedBody(e.to_string()))?;

    parsed
        .first_text()
        .map(str::to_string)
        .ok_or(GatewayFailure::Structure)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::time::Instant;

    /// Transport that replays canned responses and records every request.
    #[derive(Default)]
    pub(crate) struct ScriptedTransport {
        responses: Mutex<VecDeque<Result<RawResponse, GatewayFailure>>>,
        fallback: Option<RawResponse>,
        pub(crate) requests: Mutex<Vec<(String, Value)>>,
    }

    impl ScriptedTransport {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        /// Responds with `response` whenever the script runs out
        pub(crate) fn always(response: RawResponse) -> Self {
            Self {
                fallback: Some(response),
                ..Self::default()
            }
        }

        pub(crate) fn then(self, response: RawResponse) -> Self {
            self.responses.lock().unwrap().push_back(Ok(response));
            self
        }

        pub(crate) fn then_fail(self, failure: GatewayFailure) -> Self {
            self.responses.lock().unwrap().push_back(Err(failure));
            self
        }

        pub(crate) fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        pub(crate) fn request(&self, index: usize) -> Value {
            self.requests.lock().unwrap()[index].1.clone()
        }

        pub(crate) fn url(&self, index: usize) -> String {
            self.requests.lock().unwrap()[index].0.clone()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn post_json(
            &self,
            url: &str,
            request: &GenerateContentRequest,
        ) -> Result<RawResponse, GatewayFailure> {
            self.requests
                .lock()
                .unwrap()
                .push((url.to_string(), serde_json::to_value(request).unwrap()));

            let next = self.responses.lock().unwrap().pop_front();
            match (next, &self.fallback) {
                (Some(response), _) => response,
                (None, Some(fallback)) => Ok(fallback.clone()),
                (None, None) => Err(GatewayFailure::Transport("script exhausted".to_string())),
            }
        }
    }

    pub(crate) fn reply(text: &str) -> RawResponse {
        RawResponse {
            status: 200,
            status_text: "OK".to_string(),
            body: json!({
                "candidates": [{"content": {"role": "model", "parts": [{"text": text}]}}]
            })
            .to_string(),
        }
    }

    pub(crate) fn status(status: u16, status_text: &str, body: &str) -> RawResponse {
        RawResponse {
            status,
            status_text: status_text.to_string(),
            body: body.to_string(),
        }
    }

    pub(crate) fn endpoint() -> Endpoint {
        Endpoint {
            base_url: "https://example.test/v1beta".to_string(),
            model_name: "gemini-test".to_string(),
            fallback_key: "ENV_KEY".to_string(),
        }
    }

    fn gateway(transport: ScriptedTransport) -> GeminiGateway<ScriptedTransport> {
        GeminiGateway::new(transport, endpoint(), RetryPolicy::default())
    }

    fn request() -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content::with_role(ROLE_USER, "What helps a headache?")],
            ..GenerateContentRequest::default()
        }
    }

    const UNREGISTERED: &str = r#"{"error":{"code":403,"message":"Method doesn't allow unregistered callers (callers without established identity)."}}"#;

    #[test]
    fn test_endpoint_prefers_manual_key() {
        let endpoint = endpoint();
        assert_eq!(
            endpoint.url_for(Some("MANUAL")),
            "https://example.test/v1beta/models/gemini-test:generateContent?key=MANUAL"
        );
        assert!(endpoint.url_for(Some("   ")).ends_with("key=ENV_KEY"));
        assert!(endpoint.url_for(None).ends_with("key=ENV_KEY"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_after_two_failures() {
        let transport = ScriptedTransport::new()
            .then(status(503, "Service Unavailable", "overloaded"))
            .then_fail(GatewayFailure::Transport("connection reset".to_string()))
            .then(reply("Rest and hydrate."));
        let gateway = gateway(transport);

        let start = Instant::now();
        let outcome = gateway.call(&request(), None, false).await;
        let elapsed = start.elapsed();

        assert_eq!(outcome, GatewayOutcome::Content("Rest and hydrate.".to_string()));
        assert_eq!(gateway.transport().request_count(), 3);
        assert!(elapsed >= Duration::from_millis(3000), "elapsed {elapsed:?}");
        assert!(elapsed < Duration::from_millis(3100), "elapsed {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_returns_marker_text() {
        let gateway = gateway(ScriptedTransport::always(status(
            500,
            "Internal Server Error",
            "backend exploded",
        )));

        let outcome = gateway.call(&request(), None, false).await;
        assert_eq!(gateway.transport().request_count(), 3);

        let text = outcome.into_display_text();
        assert!(text.starts_with("**API Error:**"), "{text}");
        assert!(text.contains("500"), "{text}");
        assert!(text.contains("Internal Server Error"), "{text}");
        assert!(text.contains("backend exploded"), "{text}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_unregistered_without_manual_key() {
        let gateway = gateway(ScriptedTransport::always(status(403, "Forbidden", UNREGISTERED)));

        let outcome = gateway.call(&request(), None, false).await;
        match outcome {
            GatewayOutcome::Failure(reason) => {
                assert!(reason.contains("could not be provided by the execution environment"));
                assert!(!reason.contains("Invalid API Key"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(gateway.transport().url(0).ends_with("key=ENV_KEY"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unregistered_with_manual_key() {
        let gateway = gateway(ScriptedTransport::always(status(403, "Forbidden", UNREGISTERED)));

        let outcome = gateway.call(&request(), Some("BAD_KEY"), false).await;
        assert_eq!(
            outcome,
            GatewayOutcome::Failure(
                "Invalid API Key (403): The key provided is likely incorrect or expired."
                    .to_string()
            )
        );
        assert!(gateway.transport().url(2).ends_with("key=BAD_KEY"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_text_is_structural_failure() {
        let empty = RawResponse {
            status: 200,
            status_text: "OK".to_string(),
            body: json!({"candidates": [{"finishReason": "SAFETY"}]}).to_string(),
        };
        let gateway = gateway(ScriptedTransport::always(empty));

        let outcome = gateway.call(&request(), None, true).await;
        assert_eq!(
            outcome,
            GatewayOutcome::Failure(
                "API response structure unexpected or model returned no content.".to_string()
            )
        );
        assert_eq!(gateway.transport().request_count(), 3);
    }

    #[test]
    fn test_null_levels_are_structural_failures() {
        let bodies = [
            json!({"candidates": null}),
            json!({"candidates": [{"content": {"parts": null}}]}),
        ];

        for body in bodies {
            let result = extract_reply(status(200, "OK", &body.to_string()), false);
            assert_eq!(result, Err(GatewayFailure::Structure), "{body}");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_null_candidates_reports_structure_message() {
        let gateway = gateway(ScriptedTransport::always(status(
            200,
            "OK",
            r#"{"candidates": null}"#,
        )));

        let outcome = gateway.call(&request(), None, false).await;
        assert_eq!(
            outcome,
            GatewayOutcome::Failure(
                "API response structure unexpected or model returned no content.".to_string()
            )
        );
        assert_eq!(gateway.transport().request_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_last_failure_wins() {
        let transport = ScriptedTransport::new()
            .then(status(403, "Forbidden", UNREGISTERED))
            .then(status(500, "Internal Server Error", "first"))
            .then(status(502, "Bad Gateway", "second"));
        let gateway = gateway(transport);

        let text = gateway.call(&request(), None, false).await.into_display_text();
        assert!(text.starts_with("**API Error:** HTTP Error 502 (Bad Gateway)"), "{text}");
    }

    #[tokio::test]
    async fn test_request_body_is_sent_unchanged() {
        let gateway = gateway(ScriptedTransport::new().then(reply("ok")));
        gateway.call(&request(), None, false).await;

        let body = gateway.transport().request(0);
        assert_eq!(body["contents"][0]["parts"][0]["text"], "What helps a headache?");
        assert!(body.get("tools").is_none());
    }
}
