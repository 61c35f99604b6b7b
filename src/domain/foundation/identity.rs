//! Opaque conversation identity sent with every dialogue call.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::{Timestamp, UserId};

/// Identifier the remote service keys its dialogue context on.
///
/// A fresh identity is minted on every new consultation so the service can
/// never attach a new conversation to stale context.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionIdentity(String);

impl SessionIdentity {
    /// Identity used right after login: the stable user id itself.
    pub fn for_user(user_id: &UserId) -> Self {
        Self(user_id.as_str().to_string())
    }

    /// Mints a new identity for the user at the given moment.
    pub fn mint_at(user_id: &UserId, now: Timestamp) -> Self {
        Self(format!("user-{}-session-{}", user_id, now.as_millis()))
    }

    /// Mints a new identity for the user now.
    pub fn mint(user_id: &UserId) -> Self {
        Self::mint_at(user_id, Timestamp::now())
    }

    /// Identity for a visitor without a known user id.
    pub fn anonymous() -> Self {
        let simple = Uuid::new_v4().simple().to_string();
        Self(format!("user-{}", &simple[..9]))
    }

    /// Returns the identity string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> UserId {
        UserId::new("abc123").unwrap()
    }

    #[test]
    fn for_user_reuses_user_id() {
        assert_eq!(SessionIdentity::for_user(&user()).as_str(), "abc123");
    }

    #[test]
    fn minted_identity_embeds_user_and_time() {
        let now = Timestamp::from_millis(1_700_000_000_000).unwrap();
        let identity = SessionIdentity::mint_at(&user(), now);
        assert_eq!(identity.as_str(), "user-abc123-session-1700000000000");
    }

    #[test]
    fn minting_at_different_moments_differs() {
        let now = Timestamp::from_millis(1_000).unwrap();
        let a = SessionIdentity::mint_at(&user(), now);
        let b = SessionIdentity::mint_at(&user(), now.plus_secs(1));
        assert_ne!(a, b);
    }

    #[test]
    fn anonymous_identity_has_short_random_suffix() {
        let identity = SessionIdentity::anonymous();
        assert!(identity.as_str().starts_with("user-"));
        assert_eq!(identity.as_str().len(), "user-".len() + 9);
        assert_ne!(identity, SessionIdentity::anonymous());
    }
}
