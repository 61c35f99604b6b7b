//! Authentication types for the domain layer.
//!
//! The identity/session provider hands the core an authenticated user and a
//! bearer credential. The core only reads them; when they are absent every
//! conversational operation is deferred.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::{UserId, ValidationError};

/// Profile of the logged-in user as supplied by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    /// Stable user identifier.
    #[serde(rename = "user_id")]
    pub id: UserId,

    /// User's email address.
    pub email: String,

    /// Display name, if the provider knows one.
    #[serde(default, rename = "name")]
    pub display_name: Option<String>,
}

impl AuthenticatedUser {
    /// Creates a new authenticated user.
    pub fn new(id: UserId, email: impl Into<String>, display_name: Option<String>) -> Self {
        Self {
            id,
            email: email.into(),
            display_name,
        }
    }

    /// Returns the user's display name, or email as fallback.
    pub fn display_name_or_email(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.email)
    }
}

/// Bearer credential attached to every remote call.
#[derive(Clone)]
pub struct Credential(SecretString);

impl Credential {
    /// Wraps a raw token, rejecting blank values.
    pub fn new(token: impl Into<String>) -> Result<Self, ValidationError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(ValidationError::empty_field("credential"));
        }
        Ok(Self(SecretString::new(token)))
    }

    /// Exposes the raw token for building an `Authorization` header.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential([REDACTED])")
    }
}

/// A logged-in user together with the credential issued for them.
#[derive(Debug, Clone)]
pub struct AuthenticatedSession {
    pub user: AuthenticatedUser,
    pub credential: Credential,
}

impl AuthenticatedSession {
    /// Pairs a user with their credential.
    pub fn new(user: AuthenticatedUser, credential: Credential) -> Self {
        Self { user, credential }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user() -> AuthenticatedUser {
        AuthenticatedUser::new(UserId::new("user-123").unwrap(), "pat@example.com", None)
    }

    #[test]
    fn display_name_falls_back_to_email() {
        assert_eq!(test_user().display_name_or_email(), "pat@example.com");

        let named = AuthenticatedUser {
            display_name: Some("Pat".to_string()),
            ..test_user()
        };
        assert_eq!(named.display_name_or_email(), "Pat");
    }

    #[test]
    fn credential_rejects_blank_token() {
        assert!(Credential::new("").is_err());
        assert!(Credential::new("  ").is_err());
    }

    #[test]
    fn credential_debug_is_redacted() {
        let credential = Credential::new("very-secret").unwrap();
        let debug = format!("{:?}", credential);
        assert!(!debug.contains("very-secret"));
        assert_eq!(credential.expose(), "very-secret");
    }

    #[test]
    fn user_deserializes_from_provider_shape() {
        let json = r#"{"user_id":"u-1","email":"a@b.c","name":"Ann"}"#;
        let user: AuthenticatedUser = serde_json::from_str(json).unwrap();
        assert_eq!(user.id.as_str(), "u-1");
        assert_eq!(user.display_name.as_deref(), Some("Ann"));
    }
}
