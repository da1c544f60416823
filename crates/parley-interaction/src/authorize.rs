//! Seam for the external authorization control.
//!
//! The provider's hosted login UI (redirect handling, browser lifecycle) is
//! not this crate's concern. Its entire contract surface is: given the
//! attempt's state nonce, yield exactly one [`AuthOutcome`].

use uuid::Uuid;

/// The single outcome of one pass through the authorization control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// The provider redirected back with an authorization code and the echoed
    /// state value. The code must not be trusted until the state is
    /// validated against the issued nonce.
    Authorized { code: String, state: String },
    /// The user backed out of the provider flow.
    Cancelled,
    /// The provider reported an error.
    Failed(String),
}

/// External authorization control.
#[async_trait::async_trait]
pub trait AuthorizeControl: Send + Sync {
    /// Runs the provider flow with the given anti-forgery state nonce.
    async fn authorize(&self, state: &str) -> AuthOutcome;
}

/// Development stand-in for the provider's hosted control.
///
/// Immediately "redirects back" with a fresh code and the echoed state, so
/// the rest of the login path (state validation, exchange, token persistence)
/// runs for real against whatever backend is configured.
pub struct StubAuthorizeControl;

#[async_trait::async_trait]
impl AuthorizeControl for StubAuthorizeControl {
    async fn authorize(&self, state: &str) -> AuthOutcome {
        AuthOutcome::Authorized {
            code: format!("dev-code-{}", Uuid::new_v4().simple()),
            state: state.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stub_echoes_the_issued_state() {
        let outcome = StubAuthorizeControl.authorize("nonce-123").await;
        match outcome {
            AuthOutcome::Authorized { code, state } => {
                assert_eq!(state, "nonce-123");
                assert!(code.starts_with("dev-code-"));
            }
            other => panic!("expected Authorized, got {other:?}"),
        }
    }
}
