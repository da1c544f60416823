//! Login flow: one authorization attempt end to end.
//!
//! Drives the [`AuthorizeControl`], validates the echoed state nonce,
//! exchanges the code at the trusted backend, and persists the resulting
//! session token. A token is never fabricated locally and a code is never
//! exchanged without a matching state.

use std::sync::Arc;

use parley_core::auth::AuthAttempt;
use parley_core::token::TokenSink;
use tracing::{info, warn};

use crate::authorize::{AuthOutcome, AuthorizeControl};
use crate::exchange::ExchangeClient;

/// Terminal result of one login attempt, for the front end to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginResult {
    /// The session token is stored; transition to the authenticated surface.
    Authenticated,
    /// The user cancelled; show the status message, stay where we are.
    Cancelled { status: String },
    /// Validation, exchange, or persistence failed; show the status message
    /// interruptively.
    Failed { status: String },
}

/// Orchestrates the control, the exchange client, and the token store.
pub struct LoginFlow {
    control: Arc<dyn AuthorizeControl>,
    exchange: ExchangeClient,
    tokens: Arc<dyn TokenSink>,
}

impl LoginFlow {
    pub fn new(
        control: Arc<dyn AuthorizeControl>,
        exchange: ExchangeClient,
        tokens: Arc<dyn TokenSink>,
    ) -> Self {
        Self {
            control,
            exchange,
            tokens,
        }
    }

    /// Runs one authorization attempt to its terminal outcome.
    pub async fn run(&self) -> LoginResult {
        let mut attempt = AuthAttempt::begin();
        info!("starting authorization attempt");

        match self.control.authorize(attempt.nonce()).await {
            AuthOutcome::Cancelled => {
                attempt.cancel();
                info!("authorization cancelled by user");
                LoginResult::Cancelled {
                    status: attempt.status().to_string(),
                }
            }
            AuthOutcome::Failed(message) => {
                warn!(error = %message, "authorization control reported an error");
                attempt.fail(message);
                LoginResult::Failed {
                    status: attempt.status().to_string(),
                }
            }
            AuthOutcome::Authorized { code, state } => {
                if let Err(e) = attempt.validate_state(&state) {
                    warn!("authorization response failed state validation");
                    attempt.fail(e.to_string());
                    return LoginResult::Failed {
                        status: attempt.status().to_string(),
                    };
                }

                let token = match self.exchange.exchange(&code, &state).await {
                    Ok(token) => token,
                    Err(e) => {
                        warn!(error = %e, "code exchange failed");
                        attempt.fail(e.to_string());
                        return LoginResult::Failed {
                            status: attempt.status().to_string(),
                        };
                    }
                };

                if let Err(e) = self.tokens.store_token(&token).await {
                    warn!(error = %e, "failed to persist session token");
                    attempt.fail(e.to_string());
                    return LoginResult::Failed {
                        status: attempt.status().to_string(),
                    };
                }

                attempt.resolve();
                info!("authorization resolved, session token stored");
                LoginResult::Authenticated
            }
        }
    }
}
