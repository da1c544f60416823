//! Filesystem storage for configuration and the session token.

mod config_storage;
mod token_storage;

pub use config_storage::{ConfigStorage, ConfigStorageError};
pub use token_storage::{TokenStorage, TokenStorageError};
