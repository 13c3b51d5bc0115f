//! Session identity
//!
//! Either the anonymous guest or an authenticated user. Storage keys are
//! namespaced by `namespace()`.

use serde::{Deserialize, Serialize};

/// Namespace used for unauthenticated data
pub const GUEST_NAMESPACE: &str = "guest";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    pub user_id: String,
    /// Bearer token for the remote row, when the auth provider has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

impl UserIdentity {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            access_token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Identity {
    #[default]
    Guest,
    User(UserIdentity),
}

impl Identity {
    pub fn user(user_id: impl Into<String>) -> Self {
        Identity::User(UserIdentity::new(user_id))
    }

    pub fn namespace(&self) -> &str {
        match self {
            Identity::Guest => GUEST_NAMESPACE,
            Identity::User(user) => &user.user_id,
        }
    }

    pub fn as_user(&self) -> Option<&UserIdentity> {
        match self {
            Identity::Guest => None,
            Identity::User(user) => Some(user),
        }
    }

    pub fn is_guest(&self) -> bool {
        matches!(self, Identity::Guest)
    }

    /// Same storage namespace; token refreshes do not count as a switch.
    pub fn same_namespace(&self, other: &Identity) -> bool {
        self.namespace() == other.namespace()
    }
}

impl From<Option<UserIdentity>> for Identity {
    fn from(user: Option<UserIdentity>) -> Self {
        match user {
            // A user literally named "guest" would collide with the guest namespace.
            Some(user) if user.user_id != GUEST_NAMESPACE && !user.user_id.is_empty() => {
                Identity::User(user)
            }
            _ => Identity::Guest,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace() {
        assert_eq!(Identity::Guest.namespace(), "guest");
        assert_eq!(Identity::user("u-1").namespace(), "u-1");
    }

    #[test]
    fn test_token_refresh_is_same_namespace() {
        let a = Identity::User(UserIdentity::new("u-1"));
        let b = Identity::User(UserIdentity::new("u-1").with_token("t"));
        assert!(a.same_namespace(&b));
        assert!(!a.same_namespace(&Identity::Guest));
    }

    #[test]
    fn test_reserved_names_map_to_guest() {
        assert_eq!(Identity::from(Some(UserIdentity::new("guest"))), Identity::Guest);
        assert_eq!(Identity::from(Some(UserIdentity::new(""))), Identity::Guest);
        assert_eq!(Identity::from(None), Identity::Guest);
    }
}
