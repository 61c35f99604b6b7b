//! File-backed credential store.
//!
//! Keeps the logged-in user and bearer token in a single JSON file. Writes go
//! to `<file>.tmp` first and are renamed into place, so a crash mid-write
//! never leaves a truncated session behind.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::domain::foundation::{AuthenticatedSession, AuthenticatedUser, Credential};
use crate::ports::{CredentialStore, CredentialStoreError};

/// On-disk shape of a stored session.
#[derive(Serialize, Deserialize)]
struct StoredSession {
    user: AuthenticatedUser,
    token: String,
}

/// Credential store persisting to a JSON file.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Returns the session file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_error(action: &str, path: &Path, e: std::io::Error) -> CredentialStoreError {
        CredentialStoreError::IoError(format!("Failed to {} {}: {}", action, path.display(), e))
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn load(&self) -> Result<Option<AuthenticatedSession>, CredentialStoreError> {
        let json = match fs::read_to_string(&self.path).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Self::io_error("read", &self.path, e)),
        };

        let stored: StoredSession = serde_json::from_str(&json)
            .map_err(|e| CredentialStoreError::DeserializationFailed(e.to_string()))?;

        // A blank token means the file was written by hand or half-cleared.
        match Credential::new(stored.token) {
            Ok(credential) => Ok(Some(AuthenticatedSession::new(stored.user, credential))),
            Err(_) => {
                warn!(path = %self.path.display(), "Stored session has no token, ignoring");
                Ok(None)
            }
        }
    }

    async fn save(&self, session: &AuthenticatedSession) -> Result<(), CredentialStoreError> {
        let stored = StoredSession {
            user: session.user.clone(),
            token: session.credential.expose().to_string(),
        };
        let json = serde_json::to_string_pretty(&stored)
            .map_err(|e| CredentialStoreError::SerializationFailed(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| Self::io_error("create directory", parent, e))?;
        }

        let temp_path = self.temp_path();
        let mut file = fs::File::create(&temp_path)
            .await
            .map_err(|e| Self::io_error("create", &temp_path, e))?;
        file.write_all(json.as_bytes())
            .await
            .map_err(|e| Self::io_error("write", &temp_path, e))?;
        file.sync_all()
            .await
            .map_err(|e| Self::io_error("sync", &temp_path, e))?;

        fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| Self::io_error("rename", &temp_path, e))?;

        debug!(user = %session.user.id, "Session saved");
        Ok(())
    }

    async fn clear(&self) -> Result<(), CredentialStoreError> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::io_error("remove", &self.path, e)),
        }
    }
}
