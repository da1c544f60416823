//! Network layer: chat transports, the authorization-control seam, and the
//! code-for-token exchange.

pub mod authorize;
pub mod exchange;
pub mod http_agent;
pub mod login;
pub mod mock_agent;

use parley_core::conversation::Message;
use parley_core::error::Result;

pub use authorize::{AuthOutcome, AuthorizeControl, StubAuthorizeControl};
pub use exchange::ExchangeClient;
pub use http_agent::HttpChatAgent;
pub use login::{LoginFlow, LoginResult};
pub use mock_agent::MockChatAgent;

/// A chat transport: takes the conversation history (ending in the new user
/// turn) and produces the assistant reply.
///
/// The REPL swaps implementations by configuration: [`HttpChatAgent`] in live
/// mode, [`MockChatAgent`] in mock mode.
#[async_trait::async_trait]
pub trait ChatAgent: Send + Sync {
    async fn reply(&self, history: &[Message]) -> Result<String>;
}
