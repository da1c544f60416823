//! Application configuration model.
//!
//! Deserialized from `config.toml`; every field has a default so an absent or
//! partial file still yields a working configuration.

use serde::{Deserialize, Serialize};

/// Environment variable that overrides `chat.mock`.
///
/// Any value other than `false` selects mock mode, so development setups stay
/// in mock mode unless explicitly switched off.
pub const MOCK_ENV_VAR: &str = "PARLEY_MOCK";

fn default_chat_endpoint() -> String {
    "http://127.0.0.1:5000/chat".to_string()
}

fn default_exchange_endpoint() -> String {
    "http://127.0.0.1:5000/api/auth/exchange".to_string()
}

fn default_mock() -> bool {
    true
}

fn default_request_timeout_secs() -> u64 {
    30
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub chat: ChatConfig,
    pub auth: AuthConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ChatConfig {
    /// Endpoint the conversation history is posted to.
    pub endpoint: String,
    /// When true, the live exchange is replaced by a fixed synthetic reply.
    pub mock: bool,
    /// Deadline for one exchange; a hung request resolves as an error.
    pub request_timeout_secs: u64,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AuthConfig {
    /// Endpoint that exchanges `{code, state}` for `{token}`.
    pub exchange_endpoint: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            endpoint: default_chat_endpoint(),
            mock: default_mock(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            exchange_endpoint: default_exchange_endpoint(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            chat: ChatConfig::default(),
            auth: AuthConfig::default(),
        }
    }
}

impl AppConfig {
    /// Effective mock-mode flag: the `PARLEY_MOCK` environment variable wins
    /// over the config file when set.
    pub fn mock_mode(&self) -> bool {
        self.resolve_mock(std::env::var(MOCK_ENV_VAR).ok().as_deref())
    }

    fn resolve_mock(&self, env_value: Option<&str>) -> bool {
        match env_value {
            Some(value) => value != "false",
            None => self.chat.mock,
        }
    }
}
