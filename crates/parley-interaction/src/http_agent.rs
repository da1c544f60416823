//! HttpChatAgent - live chat transport.
//!
//! Posts the full conversation history to the chat endpoint as
//! `{ "messages": [ {"role", "content"}, ... ] }` and reads the reply from
//! the response body. The session token is read through the [`TokenSource`]
//! seam on every request so a login mid-session takes effect immediately.

use std::sync::Arc;
use std::time::Duration;

use parley_core::conversation::Message;
use parley_core::error::{ParleyError, Result};
use parley_core::token::TokenSource;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, warn};

/// Reply shown when a 2xx response does not carry a `reply` string.
const FALLBACK_REPLY: &str = "…";

#[derive(Serialize)]
struct ChatRequest<'a> {
    messages: Vec<WireMessage<'a>>,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// Chat transport that talks to the configured HTTP endpoint.
pub struct HttpChatAgent {
    client: Client,
    endpoint: String,
    tokens: Arc<dyn TokenSource>,
}

impl HttpChatAgent {
    /// Creates a new agent.
    ///
    /// # Arguments
    ///
    /// * `endpoint` - Chat endpoint URL
    /// * `timeout` - Per-request deadline; a hung request fails instead of
    ///   leaving the exchange unresolved
    /// * `tokens` - Source for the optional bearer token
    pub fn new(
        endpoint: impl Into<String>,
        timeout: Duration,
        tokens: Arc<dyn TokenSource>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ParleyError::internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            tokens,
        })
    }

    fn build_request<'a>(history: &'a [Message]) -> ChatRequest<'a> {
        ChatRequest {
            // A pending placeholder has no resolved content to send.
            messages: history
                .iter()
                .filter(|m| !m.pending)
                .map(|m| WireMessage {
                    role: m.role.as_str(),
                    content: &m.text,
                })
                .collect(),
        }
    }
}

#[async_trait::async_trait]
impl crate::ChatAgent for HttpChatAgent {
    async fn reply(&self, history: &[Message]) -> Result<String> {
        let body = Self::build_request(history);

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(token) = self.tokens.current_token().await {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ParleyError::transport(None, format!("request failed: {e}")))?;

        let status = response.status();
        debug!(status = %status, "chat response received");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %body, "chat endpoint returned an error");
            return Err(ParleyError::transport(
                Some(status.as_u16()),
                format!("HTTP {}", status.as_u16()),
            ));
        }

        let value: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ParleyError::transport(None, format!("failed to parse chat response: {e}")))?;

        Ok(value
            .get("reply")
            .and_then(|r| r.as_str())
            .unwrap_or(FALLBACK_REPLY)
            .to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ChatAgent;
    use parley_core::token::TokenSource;
    use wiremock::matchers::{body_json, header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct StaticTokens(Option<String>);

    #[async_trait::async_trait]
    impl TokenSource for StaticTokens {
        async fn current_token(&self) -> Option<String> {
            self.0.clone()
        }
    }

    fn agent(server: &MockServer, token: Option<&str>) -> HttpChatAgent {
        HttpChatAgent::new(
            format!("{}/chat", server.uri()),
            Duration::from_secs(5),
            Arc::new(StaticTokens(token.map(String::from))),
        )
        .unwrap()
    }

    fn history() -> Vec<Message> {
        vec![Message::assistant("Welcome"), Message::user("hello")]
    }

    #[tokio::test]
    async fn test_posts_full_history_as_role_content_pairs() {
        let server = MockServer::start().await;

        let expected_body = serde_json::json!({
            "messages": [
                { "role": "assistant", "content": "Welcome" },
                { "role": "user", "content": "hello" },
            ]
        });

        Mock::given(method("POST"))
            .and(path("/chat"))
            .and(body_json(&expected_body))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"reply": "hi!"})),
            )
            .mount(&server)
            .await;

        let reply = agent(&server, None).reply(&history()).await.unwrap();
        assert_eq!(reply, "hi!");
    }

    #[tokio::test]
    async fn test_pending_placeholder_is_not_sent() {
        let server = MockServer::start().await;

        let expected_body = serde_json::json!({
            "messages": [
                { "role": "user", "content": "hello" },
            ]
        });

        Mock::given(method("POST"))
            .and(path("/chat"))
            .and(body_json(&expected_body))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"reply": "ok"})),
            )
            .mount(&server)
            .await;

        let mut history = vec![Message::user("hello")];
        history.push(Message::pending_assistant());

        let reply = agent(&server, None).reply(&history).await.unwrap();
        assert_eq!(reply, "ok");
    }

    #[tokio::test]
    async fn test_bearer_header_attached_when_token_present() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat"))
            .and(header("authorization", "Bearer secret-token"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"reply": "authed"})),
            )
            .mount(&server)
            .await;

        let reply = agent(&server, Some("secret-token"))
            .reply(&history())
            .await
            .unwrap();
        assert_eq!(reply, "authed");
    }

    #[tokio::test]
    async fn test_no_auth_header_without_token() {
        let server = MockServer::start().await;

        // Any request carrying an Authorization header is a failure here.
        Mock::given(method("POST"))
            .and(path("/chat"))
            .and(header_exists("authorization"))
            .respond_with(ResponseTemplate::new(500))
            .with_priority(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"reply": "anon"})),
            )
            .with_priority(5)
            .mount(&server)
            .await;

        let reply = agent(&server, None).reply(&history()).await.unwrap();
        assert_eq!(reply, "anon");
    }

    #[tokio::test]
    async fn test_server_error_embeds_status_code() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = agent(&server, None).reply(&history()).await.unwrap_err();
        assert_eq!(err.status_code(), Some(500));
        assert!(err.to_string().contains("HTTP 500"), "got: {err}");
    }

    #[tokio::test]
    async fn test_reply_missing_degrades_to_ellipsis() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"unexpected": true})),
            )
            .mount(&server)
            .await;

        let reply = agent(&server, None).reply(&history()).await.unwrap();
        assert_eq!(reply, FALLBACK_REPLY);
    }
}
