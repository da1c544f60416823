//! Session token file storage.
//!
//! The durable local key-value store behind login: one JSON file holding the
//! opaque session token under the fixed `token` key. Written once per
//! successful authorization, read on every outbound chat request, cleared on
//! logout.

use std::fs::{self, File, OpenOptions};
use std::io::Write as IoWrite;
use std::path::{Path, PathBuf};

use parley_core::error::ParleyError;
use parley_core::token::{TokenSink, TokenSource};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::paths::ParleyPaths;

/// Errors that can occur during token storage operations.
#[derive(Debug)]
pub enum TokenStorageError {
    /// File I/O error.
    IoError(std::io::Error),
    /// JSON parsing error.
    ParseError(serde_json::Error),
    /// Config directory not found.
    ConfigDirNotFound,
    /// File locking error.
    LockError(String),
}

impl std::fmt::Display for TokenStorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenStorageError::IoError(e) => write!(f, "I/O error: {}", e),
            TokenStorageError::ParseError(e) => write!(f, "JSON parse error: {}", e),
            TokenStorageError::ConfigDirNotFound => {
                write!(f, "Could not determine config directory")
            }
            TokenStorageError::LockError(e) => write!(f, "Lock error: {}", e),
        }
    }
}

impl std::error::Error for TokenStorageError {}

impl From<std::io::Error> for TokenStorageError {
    fn from(e: std::io::Error) -> Self {
        TokenStorageError::IoError(e)
    }
}

impl From<serde_json::Error> for TokenStorageError {
    fn from(e: serde_json::Error) -> Self {
        TokenStorageError::ParseError(e)
    }
}

impl From<TokenStorageError> for ParleyError {
    fn from(e: TokenStorageError) -> Self {
        ParleyError::data_access(e.to_string())
    }
}

/// On-disk shape of token.json. The single fixed key is `token`.
#[derive(Debug, Serialize, Deserialize, Default)]
struct TokenFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    token: Option<String>,
}

/// Storage for the session token file (token.json).
///
/// Responsibilities:
/// - Load/save/clear the opaque token under the fixed `token` key
/// - Atomic writes (tmp file + fsync + atomic rename)
/// - Exclusive advisory lock while writing
/// - File mode 600 on Unix
///
/// Does NOT:
/// - Validate or interpret the token value
/// - Handle encryption (plaintext JSON storage)
pub struct TokenStorage {
    path: PathBuf,
}

impl TokenStorage {
    /// Creates a new TokenStorage with the default path (~/.config/parley/token.json).
    pub fn new() -> Result<Self, TokenStorageError> {
        let path = ParleyPaths::token_file().map_err(|_| TokenStorageError::ConfigDirNotFound)?;
        Ok(Self { path })
    }

    /// Creates a new TokenStorage with a custom path (for testing).
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// Returns the path to the token file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the stored token.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(token))`: A token is stored
    /// - `Ok(None)`: File or key absent (unauthenticated)
    /// - `Err`: Failed to read or parse the file
    pub fn load(&self) -> Result<Option<String>, TokenStorageError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(None);
        }

        let file: TokenFile = serde_json::from_str(&content)?;
        Ok(file.token)
    }

    /// Saves the token atomically, replacing any previous value.
    pub fn save(&self, token: &str) -> Result<(), TokenStorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let _lock = FileLock::acquire(&self.path)?;

        let json = serde_json::to_string_pretty(&TokenFile {
            token: Some(token.to_string()),
        })?;

        // Write to temporary file in the same directory
        let tmp_path = self.temp_path()?;
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(json.as_bytes())?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        // Lock down permissions before the file becomes visible
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&tmp_path, fs::Permissions::from_mode(0o600))?;
        }

        fs::rename(&tmp_path, &self.path)?;

        Ok(())
    }

    /// Removes the stored token. A missing file already counts as cleared.
    pub fn clear(&self) -> Result<(), TokenStorageError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn temp_path(&self) -> Result<PathBuf, TokenStorageError> {
        let parent = self.path.parent().ok_or_else(|| {
            TokenStorageError::IoError(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Path has no parent directory",
            ))
        })?;

        let file_name = self.path.file_name().ok_or_else(|| {
            TokenStorageError::IoError(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Path has no file name",
            ))
        })?;

        let tmp_name = format!(".{}.tmp", file_name.to_string_lossy());
        Ok(parent.join(tmp_name))
    }
}

#[async_trait::async_trait]
impl TokenSource for TokenStorage {
    async fn current_token(&self) -> Option<String> {
        match self.load() {
            Ok(token) => token,
            Err(e) => {
                // Degrade to unauthenticated rather than failing the request.
                warn!(error = %e, "failed to read token store");
                None
            }
        }
    }
}

#[async_trait::async_trait]
impl TokenSink for TokenStorage {
    async fn store_token(&self, token: &str) -> parley_core::error::Result<()> {
        self.save(token)?;
        Ok(())
    }
}

/// A file lock guard that automatically releases the lock when dropped.
struct FileLock {
    #[allow(dead_code)]
    file: File,
    lock_path: PathBuf,
}

impl FileLock {
    /// Acquires an exclusive lock next to the given path.
    fn acquire(path: &Path) -> Result<Self, TokenStorageError> {
        let lock_path = path.with_extension("lock");

        if let Some(parent) = lock_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .open(&lock_path)?;

        #[cfg(unix)]
        {
            use fs2::FileExt;
            file.lock_exclusive()
                .map_err(|e| TokenStorageError::LockError(format!("Failed to acquire lock: {}", e)))?;
        }

        #[cfg(not(unix))]
        {
            // On non-Unix systems, we don't have file locking
            // This is acceptable for single-user desktop apps
        }

        Ok(FileLock { file, lock_path })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        // Unlock is automatic when the file handle is dropped
        let _ = fs::remove_file(&self.lock_path);
    }
}
