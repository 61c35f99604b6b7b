//! Credential Store Port - Interface for persisting the authenticated session.
//!
//! The login flow itself lives elsewhere; this port only keeps the resulting
//! user and bearer credential between runs.

use async_trait::async_trait;

use crate::domain::foundation::AuthenticatedSession;

/// Errors that can occur while persisting the session.
#[derive(Debug, thiserror::Error)]
pub enum CredentialStoreError {
    #[error("Failed to serialize session: {0}")]
    SerializationFailed(String),

    #[error("Failed to deserialize session: {0}")]
    DeserializationFailed(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// Port for loading and saving the authenticated session.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Loads the stored session.
    ///
    /// # Returns
    /// `None` when nobody is logged in
    async fn load(&self) -> Result<Option<AuthenticatedSession>, CredentialStoreError>;

    /// Replaces the stored session.
    async fn save(&self, session: &AuthenticatedSession) -> Result<(), CredentialStoreError>;

    /// Removes the stored session. Clearing an empty store succeeds.
    async fn clear(&self) -> Result<(), CredentialStoreError>;
}
