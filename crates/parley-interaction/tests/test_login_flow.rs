//! End-to-end tests for the login flow: authorization control outcome →
//! state validation → code exchange → token persistence.

use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use parley_core::auth::CANCELLED_TEXT;
use parley_core::error::Result;
use parley_core::token::TokenSink;
use parley_interaction::{
    AuthOutcome, AuthorizeControl, ExchangeClient, LoginFlow, LoginResult, StubAuthorizeControl,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Records every token write so tests can assert on write counts.
#[derive(Default)]
struct RecordingSink {
    written: Mutex<Vec<String>>,
}

impl RecordingSink {
    fn tokens(&self) -> Vec<String> {
        self.written.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl TokenSink for RecordingSink {
    async fn store_token(&self, token: &str) -> Result<()> {
        self.written.lock().unwrap().push(token.to_string());
        Ok(())
    }
}

/// Control that returns a code with a state value of its own choosing.
struct ForgedStateControl;

#[async_trait::async_trait]
impl AuthorizeControl for ForgedStateControl {
    async fn authorize(&self, _state: &str) -> AuthOutcome {
        AuthOutcome::Authorized {
            code: "stolen-code".to_string(),
            state: "someone-elses-state".to_string(),
        }
    }
}

struct CancellingControl;

#[async_trait::async_trait]
impl AuthorizeControl for CancellingControl {
    async fn authorize(&self, _state: &str) -> AuthOutcome {
        AuthOutcome::Cancelled
    }
}

struct FailingControl;

#[async_trait::async_trait]
impl AuthorizeControl for FailingControl {
    async fn authorize(&self, _state: &str) -> AuthOutcome {
        AuthOutcome::Failed("provider unavailable".to_string())
    }
}

fn exchange_client(server: &MockServer) -> ExchangeClient {
    ExchangeClient::new(
        format!("{}/api/auth/exchange", server.uri()),
        Duration::from_secs(5),
    )
    .unwrap()
}

async fn mount_exchange_ok(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/auth/exchange"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"token": "srv-token"})),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_successful_login_stores_the_token_exactly_once() {
    let server = MockServer::start().await;
    mount_exchange_ok(&server).await;

    let sink = Arc::new(RecordingSink::default());
    let flow = LoginFlow::new(
        Arc::new(StubAuthorizeControl),
        exchange_client(&server),
        sink.clone(),
    );

    let result = flow.run().await;

    assert_eq!(result, LoginResult::Authenticated);
    assert_eq!(sink.tokens(), vec!["srv-token".to_string()]);
}

#[tokio::test]
async fn test_forged_state_never_reaches_the_exchange() {
    let server = MockServer::start().await;

    // Any request to the exchange endpoint is a failure here.
    Mock::given(method("POST"))
        .and(path("/api/auth/exchange"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"token": "srv-token"})),
        )
        .expect(0)
        .mount(&server)
        .await;

    let sink = Arc::new(RecordingSink::default());
    let flow = LoginFlow::new(
        Arc::new(ForgedStateControl),
        exchange_client(&server),
        sink.clone(),
    );

    let result = flow.run().await;

    match result {
        LoginResult::Failed { status } => {
            assert!(status.contains("state mismatch"), "got: {status}")
        }
        other => panic!("expected Failed, got {other:?}"),
    }
    assert!(sink.tokens().is_empty());
}

#[tokio::test]
async fn test_cancellation_sets_status_and_writes_nothing() {
    let server = MockServer::start().await;
    mount_exchange_ok(&server).await;

    let sink = Arc::new(RecordingSink::default());
    let flow = LoginFlow::new(
        Arc::new(CancellingControl),
        exchange_client(&server),
        sink.clone(),
    );

    let result = flow.run().await;

    assert_eq!(
        result,
        LoginResult::Cancelled {
            status: CANCELLED_TEXT.to_string()
        }
    );
    assert!(sink.tokens().is_empty());
}

#[tokio::test]
async fn test_provider_error_surfaces_its_message() {
    let server = MockServer::start().await;
    mount_exchange_ok(&server).await;

    let sink = Arc::new(RecordingSink::default());
    let flow = LoginFlow::new(
        Arc::new(FailingControl),
        exchange_client(&server),
        sink.clone(),
    );

    let result = flow.run().await;

    match result {
        LoginResult::Failed { status } => {
            assert_eq!(status, "provider unavailable")
        }
        other => panic!("expected Failed, got {other:?}"),
    }
    assert!(sink.tokens().is_empty());
}

#[tokio::test]
async fn test_exchange_rejection_fails_the_attempt() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/exchange"))
        .respond_with(ResponseTemplate::new(400).set_body_string("code already used"))
        .mount(&server)
        .await;

    let sink = Arc::new(RecordingSink::default());
    let flow = LoginFlow::new(
        Arc::new(StubAuthorizeControl),
        exchange_client(&server),
        sink.clone(),
    );

    let result = flow.run().await;

    match result {
        LoginResult::Failed { status } => {
            assert!(status.contains("code already used"), "got: {status}")
        }
        other => panic!("expected Failed, got {other:?}"),
    }
    assert!(sink.tokens().is_empty());
}
