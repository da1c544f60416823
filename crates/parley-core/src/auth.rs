//! Authorization attempt state machine.
//!
//! Models one pass through the external authorization control: the attempt
//! starts `Idle`, issues a fresh anti-forgery state nonce, and ends in
//! exactly one of `Resolved`, `Cancelled`, or `Errored`. A new attempt means
//! a new `AuthAttempt`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ParleyError, Result};

/// Status text shown when the user backs out of the provider flow.
pub const CANCELLED_TEXT: &str = "Login cancelled";

/// Terminal-or-initial phase of an authorization attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthPhase {
    /// Waiting on the authorization control.
    Idle,
    /// The code was exchanged and a session token stored.
    Resolved,
    /// The user cancelled at the provider.
    Cancelled,
    /// The provider reported an error, or validation/exchange failed.
    Errored,
}

/// One authorization attempt with its nonce and free-text status message.
#[derive(Debug, Clone)]
pub struct AuthAttempt {
    nonce: String,
    phase: AuthPhase,
    status: String,
}

impl AuthAttempt {
    /// Starts a new attempt with a fresh state nonce and empty status.
    pub fn begin() -> Self {
        Self {
            nonce: Uuid::new_v4().to_string(),
            phase: AuthPhase::Idle,
            status: String::new(),
        }
    }

    /// The anti-forgery nonce handed to the authorization control.
    pub fn nonce(&self) -> &str {
        &self.nonce
    }

    pub fn phase(&self) -> AuthPhase {
        self.phase
    }

    /// The current status message, empty until an outcome sets one.
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Checks the state value echoed back by the provider redirect.
    ///
    /// The authorization code must not be trusted unless this passes.
    pub fn validate_state(&self, returned_state: &str) -> Result<()> {
        if returned_state == self.nonce {
            Ok(())
        } else {
            Err(ParleyError::auth(
                "state mismatch: authorization response does not belong to this attempt",
            ))
        }
    }

    /// Marks the attempt resolved after a successful exchange.
    pub fn resolve(&mut self) {
        self.phase = AuthPhase::Resolved;
        self.status.clear();
    }

    /// Marks the attempt cancelled. No navigation, no storage write.
    pub fn cancel(&mut self) {
        self.phase = AuthPhase::Cancelled;
        self.status = CANCELLED_TEXT.to_string();
    }

    /// Marks the attempt errored with a display message.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.phase = AuthPhase::Errored;
        self.status = message.into();
    }
}
