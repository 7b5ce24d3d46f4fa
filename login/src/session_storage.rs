//! Session storage
//!
//! Persists the signed-in session so the CLI stays signed in across runs.
//!
//! Storage location: `<taskpad home>/session.json` (alongside `config.toml`)

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use taskpad_core::models::Session;
use thiserror::Error;

/// Default filename for the stored session
pub const SESSION_FILE: &str = "session.json";

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// File format
#[derive(Debug, Serialize, Deserialize)]
struct StoredSession {
    /// Schema version for migration
    #[serde(default = "default_version")]
    version: u32,
    /// When the session was written (unix seconds)
    stored_at: i64,
    session: Session,
}

fn default_version() -> u32 {
    1
}

/// Reads and writes the session file.
#[derive(Debug, Clone)]
pub struct SessionStorage {
    file_path: PathBuf,
}

impl SessionStorage {
    /// Storage at `<home>/session.json`.
    pub fn new(home: &Path) -> Self {
        Self::with_path(home.join(SESSION_FILE))
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self { file_path: path }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// The stored session, or `None` when nothing is stored.
    pub fn load(&self) -> Result<Option<Session>, StorageError> {
        if !self.file_path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.file_path)?;
        let stored: StoredSession = serde_json::from_str(&content)?;
        Ok(Some(stored.session))
    }

    pub fn save(&self, session: &Session) -> Result<(), StorageError> {
        if let Some(parent) = self.file_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let stored = StoredSession {
            version: default_version(),
            stored_at: chrono::Utc::now().timestamp(),
            session: session.clone(),
        };
        let content = serde_json::to_string_pretty(&stored)?;
        fs::write(&self.file_path, content)?;

        // Set file permissions to user-only (Unix)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = fs::Permissions::from_mode(0o600);
            fs::set_permissions(&self.file_path, permissions)?;
        }

        Ok(())
    }

    /// Removes the file. Missing is not an error.
    pub fn clear(&self) -> Result<(), StorageError> {
        match fs::remove_file(&self.file_path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
