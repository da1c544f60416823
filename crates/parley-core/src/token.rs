//! Session token seams.
//!
//! The chat transport reads the token on every outbound request, and the
//! login flow writes it exactly once per successful authorization. Both sides
//! talk to the durable store through these traits so the network layer never
//! touches the filesystem directly.
//!
//! # Security Note
//!
//! Implementations must never log or embed the token value in error messages.

use crate::error::Result;

/// Read side of the token store.
#[async_trait::async_trait]
pub trait TokenSource: Send + Sync {
    /// Returns the stored session token, or `None` when unauthenticated.
    ///
    /// Storage failures read as `None`: an unreadable token degrades the
    /// request to unauthenticated rather than failing the exchange.
    async fn current_token(&self) -> Option<String>;
}

/// Write side of the token store.
#[async_trait::async_trait]
pub trait TokenSink: Send + Sync {
    /// Persists the session token under the store's fixed key.
    async fn store_token(&self, token: &str) -> Result<()>;
}
