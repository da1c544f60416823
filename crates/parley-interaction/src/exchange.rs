//! Authorization-code exchange client.
//!
//! Trades a validated `{code, state}` pair for the application's session
//! token at the trusted backend. The token itself is opaque to the client.

use std::time::Duration;

use parley_core::error::{ParleyError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Serialize)]
struct ExchangeRequest<'a> {
    code: &'a str,
    state: &'a str,
}

#[derive(Deserialize)]
struct ExchangeResponse {
    token: String,
}

/// HTTP client for the code-for-token exchange endpoint.
pub struct ExchangeClient {
    client: Client,
    endpoint: String,
}

impl ExchangeClient {
    /// Creates a new exchange client.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ParleyError::internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// Exchanges the authorization code for a session token.
    ///
    /// # Returns
    ///
    /// - `Ok(token)`: The backend accepted the code
    /// - `Err(ParleyError::Auth)`: Transport failure, non-2xx status, or a
    ///   response without a token
    pub async fn exchange(&self, code: &str, state: &str) -> Result<String> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&ExchangeRequest { code, state })
            .send()
            .await
            .map_err(|e| ParleyError::auth(format!("exchange request failed: {e}")))?;

        let status = response.status();
        debug!(status = %status, "exchange response received");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = if body.trim().is_empty() {
                format!("exchange failed: HTTP {}", status.as_u16())
            } else {
                body
            };
            return Err(ParleyError::auth(message));
        }

        let parsed: ExchangeResponse = response
            .json()
            .await
            .map_err(|_| ParleyError::auth("exchange response had no token"))?;

        Ok(parsed.token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> ExchangeClient {
        ExchangeClient::new(
            format!("{}/api/auth/exchange", server.uri()),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_exchange_posts_code_and_state() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/auth/exchange"))
            .and(body_json(
                serde_json::json!({"code": "abc", "state": "xyz"}),
            ))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"token": "srv-token"})),
            )
            .mount(&server)
            .await;

        let token = client(&server).exchange("abc", "xyz").await.unwrap();
        assert_eq!(token, "srv-token");
    }

    #[tokio::test]
    async fn test_exchange_failure_carries_body_text() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/auth/exchange"))
            .respond_with(ResponseTemplate::new(400).set_body_string("code already used"))
            .mount(&server)
            .await;

        let err = client(&server).exchange("abc", "xyz").await.unwrap_err();
        assert!(err.is_auth());
        assert!(err.to_string().contains("code already used"), "got: {err}");
    }

    #[tokio::test]
    async fn test_exchange_failure_without_body_names_the_status() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/auth/exchange"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = client(&server).exchange("abc", "xyz").await.unwrap_err();
        assert!(err.to_string().contains("HTTP 503"), "got: {err}");
    }

    #[tokio::test]
    async fn test_response_without_token_is_an_auth_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/auth/exchange"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .mount(&server)
            .await;

        let err = client(&server).exchange("abc", "xyz").await.unwrap_err();
        assert!(err.is_auth());
        assert!(err.to_string().contains("no token"), "got: {err}");
    }
}
