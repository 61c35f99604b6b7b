//! In-memory credential store for tests and short-lived sessions.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::AuthenticatedSession;
use crate::ports::{CredentialStore, CredentialStoreError};

/// Credential store that forgets everything when dropped.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCredentialStore {
    session: Arc<RwLock<Option<AuthenticatedSession>>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds a session.
    pub fn with_session(session: AuthenticatedSession) -> Self {
        Self {
            session: Arc::new(RwLock::new(Some(session))),
        }
    }

    /// Returns true if a session is stored.
    pub async fn is_populated(&self) -> bool {
        self.session.read().await.is_some()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn load(&self) -> Result<Option<AuthenticatedSession>, CredentialStoreError> {
        Ok(self.session.read().await.clone())
    }

    async fn save(&self, session: &AuthenticatedSession) -> Result<(), CredentialStoreError> {
        *self.session.write().await = Some(session.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), CredentialStoreError> {
        *self.session.write().await = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{AuthenticatedUser, Credential, UserId};

    fn session() -> AuthenticatedSession {
        AuthenticatedSession::new(
            AuthenticatedUser::new(UserId::new("u1").unwrap(), "a@b.c", None),
            Credential::new("t").unwrap(),
        )
    }

    #[tokio::test]
    async fn starts_empty() {
        let store = InMemoryCredentialStore::new();
        assert!(store.load().await.unwrap().is_none());
        assert!(!store.is_populated().await);
    }

    #[tokio::test]
    async fn clones_share_state() {
        let store = InMemoryCredentialStore::new();
        let other = store.clone();

        store.save(&session()).await.unwrap();
        assert!(other.is_populated().await);

        other.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
    }
}
