//! Unified path management for parley configuration files.
//!
//! All parley configuration and the session token live under a single
//! per-user config directory resolved through the `dirs` crate, so every
//! storage type agrees on where files go.

use std::path::PathBuf;

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home/config directory could not be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find user config directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Unified path management for parley.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/parley/            # Config directory (platform-specific root)
/// ├── config.toml              # Application configuration
/// └── token.json               # Session token store
/// ```
pub struct ParleyPaths;

impl ParleyPaths {
    /// Returns the parley configuration directory.
    ///
    /// # Returns
    ///
    /// - `Ok(PathBuf)`: Path to config directory (e.g., `~/.config/parley/`)
    /// - `Err(PathError::ConfigDirNotFound)`: Could not determine directory
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join("parley"))
            .ok_or(PathError::ConfigDirNotFound)
    }

    /// Returns the path to the main configuration file.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the path to the session token file.
    ///
    /// # Security Note
    ///
    /// The token store keeps this file at mode 600 on Unix so other users
    /// cannot read the session credential.
    pub fn token_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("token.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_dir() {
        let config_dir = ParleyPaths::config_dir().unwrap();
        assert!(config_dir.ends_with("parley"));
    }

    #[test]
    fn test_config_file() {
        let config_file = ParleyPaths::config_file().unwrap();
        assert!(config_file.ends_with("config.toml"));
        let config_dir = ParleyPaths::config_dir().unwrap();
        assert!(config_file.starts_with(&config_dir));
    }

    #[test]
    fn test_token_file() {
        let token_file = ParleyPaths::token_file().unwrap();
        assert!(token_file.ends_with("token.json"));
        let config_dir = ParleyPaths::config_dir().unwrap();
        assert!(token_file.starts_with(&config_dir));
    }
}
