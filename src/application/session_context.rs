//! Explicit session context.
//!
//! Holds the logged-in user, their bearer credential and the conversation
//! identity sent to the service. Created at login, cleared at logout or when
//! the service rejects the credential.

use std::sync::Arc;
use tracing::{debug, info};

use crate::domain::foundation::{
    AuthenticatedSession, AuthenticatedUser, Credential, SessionIdentity,
};
use crate::ports::{CredentialStore, CredentialStoreError};

/// Authenticated session plus conversation identity.
pub struct SessionContext {
    store: Arc<dyn CredentialStore>,
    current: Option<AuthenticatedSession>,
    identity: SessionIdentity,
}

impl SessionContext {
    /// Creates an empty context backed by `store`.
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self {
            store,
            current: None,
            identity: SessionIdentity::anonymous(),
        }
    }

    /// Restores a persisted session, if any.
    ///
    /// # Returns
    /// `true` when a session was restored
    pub async fn load(&mut self) -> Result<bool, CredentialStoreError> {
        match self.store.load().await? {
            Some(session) => {
                debug!(user = %session.user.id, "Session restored");
                self.identity = SessionIdentity::for_user(&session.user.id);
                self.current = Some(session);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Persists a new login and makes it current.
    pub async fn save(&mut self, session: AuthenticatedSession) -> Result<(), CredentialStoreError> {
        self.store.save(&session).await?;
        info!(user = %session.user.id, "Logged in");
        self.identity = SessionIdentity::for_user(&session.user.id);
        self.current = Some(session);
        Ok(())
    }

    /// Forgets the session locally and in the store.
    ///
    /// The local copy is dropped even if the store fails.
    pub async fn clear(&mut self) -> Result<(), CredentialStoreError> {
        if let Some(session) = self.current.take() {
            info!(user = %session.user.id, "Session cleared");
        }
        self.identity = SessionIdentity::anonymous();
        self.store.clear().await
    }

    /// Mints a fresh conversation identity for a new consultation.
    pub fn reseed(&mut self) -> &SessionIdentity {
        self.identity = match &self.current {
            Some(session) => SessionIdentity::mint(&session.user.id),
            None => SessionIdentity::anonymous(),
        };
        &self.identity
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    pub fn user(&self) -> Option<&AuthenticatedUser> {
        self.current.as_ref().map(|s| &s.user)
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.current.as_ref().map(|s| &s.credential)
    }

    pub fn identity(&self) -> &SessionIdentity {
        &self.identity
    }
}
