//! File-backed token store.
//!
//! Persists the shared auth token as a single line in the same directory as
//! the config file, so a companion paired once keeps working across host
//! restarts.  On Unix the file is written with mode `0600` and the directory
//! with `0700`: the token is the only credential in the system, and it must
//! not be readable by other local users.

use std::path::{Path, PathBuf};

use relay_core::TokenStore;

use crate::infrastructure::storage::{self, ConfigError};

/// [`TokenStore`] that keeps the token in a plain file.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Creates a store at the platform-default location
    /// (config directory + `token`).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoPlatformConfigDir`] when the platform config
    /// directory cannot be determined from the environment.
    pub fn at_default_location() -> Result<Self, ConfigError> {
        Ok(Self {
            path: storage::config_dir()?.join("token"),
        })
    }

    /// Creates a store at an explicit path.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// The file this store reads and writes.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    /// Reads the stored token, trimming surrounding whitespace.
    ///
    /// Returns `None` when the file is missing, unreadable, or holds only
    /// whitespace; the caller then generates a fresh token.
    fn load(&self) -> Option<String> {
        let content = std::fs::read_to_string(&self.path).ok()?;
        let trimmed = content.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    /// Writes the token, creating the directory first and tightening file
    /// permissions on Unix.
    fn save(&self, token: &str) -> std::io::Result<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(&self.path, token)?;

        // Owner-only: 0600 on the token, 0700 on its directory.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))?;
            if let Some(dir) = self.path.parent() {
                std::fs::set_permissions(dir, std::fs::Permissions::from_mode(0o700))?;
            }
        }

        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
