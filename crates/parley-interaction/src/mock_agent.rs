//! MockChatAgent - fixed-delay synthetic replies for development and tests.

use std::time::Duration;

use parley_core::conversation::{Message, MessageRole};
use parley_core::error::{ParleyError, Result};

/// Small "typing" delay before the synthetic reply resolves.
pub const MOCK_REPLY_DELAY: Duration = Duration::from_millis(600);

/// Chat transport that echoes the user's last turn without any network.
pub struct MockChatAgent {
    delay: Duration,
}

impl MockChatAgent {
    /// Creates a mock agent with the standard delay.
    pub fn new() -> Self {
        Self {
            delay: MOCK_REPLY_DELAY,
        }
    }

    /// Overrides the delay (for tests).
    pub fn with_delay(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for MockChatAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl crate::ChatAgent for MockChatAgent {
    async fn reply(&self, history: &[Message]) -> Result<String> {
        let user_text = history
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::User)
            .map(|m| m.text.clone())
            .ok_or_else(|| ParleyError::internal("mock reply requested with no user turn"))?;

        tokio::time::sleep(self.delay).await;

        Ok(format!("You said: \"{user_text}\". (Mock reply)"))
    }
}
