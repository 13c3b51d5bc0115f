//! External collaborators
//!
//! Interfaces the engine consumes but does not implement for real: an
//! authentication provider and the platform's notification permission.
//! Local implementations back the binary and the tests.

use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::domain::UserIdentity;

/// Source of the signed-in user
pub trait AuthProvider: Send + Sync {
    /// The current session's user, or `None` when signed out
    fn current_identity(&self) -> Option<UserIdentity>;

    /// Fires whenever the session changes (sign-in, sign-out, token refresh)
    fn subscribe(&self) -> watch::Receiver<Option<UserIdentity>>;
}

/// Auth provider driven by explicit sign-in/sign-out calls
pub struct LocalAuthProvider {
    session: watch::Sender<Option<UserIdentity>>,
}

impl Default for LocalAuthProvider {
    fn default() -> Self {
        let (session, _) = watch::channel(None);
        Self { session }
    }
}

impl LocalAuthProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sign_in(&self, user: UserIdentity) {
        log::info!("signed in as {}", user.user_id);
        self.session.send_replace(Some(user));
    }

    pub fn sign_out(&self) {
        log::info!("signed out");
        self.session.send_replace(None);
    }
}

impl AuthProvider for LocalAuthProvider {
    fn current_identity(&self) -> Option<UserIdentity> {
        self.session.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Option<UserIdentity>> {
        self.session.subscribe()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionState {
    Default,
    Granted,
    Denied,
    Unsupported,
}

#[async_trait]
pub trait NotificationPermission: Send + Sync {
    fn current(&self) -> PermissionState;

    /// Prompt the user; resolves to the resulting state
    async fn request(&self) -> PermissionState;
}

/// Permission source that answers every request with a fixed verdict
pub struct StaticPermission {
    state: Mutex<PermissionState>,
    answer: PermissionState,
}

impl StaticPermission {
    pub fn new(initial: PermissionState, answer: PermissionState) -> Self {
        Self {
            state: Mutex::new(initial),
            answer,
        }
    }

    pub fn granting() -> Self {
        Self::new(PermissionState::Default, PermissionState::Granted)
    }

    pub fn unsupported() -> Self {
        Self::new(PermissionState::Unsupported, PermissionState::Unsupported)
    }
}

#[async_trait]
impl NotificationPermission for StaticPermission {
    fn current(&self) -> PermissionState {
        self.state
            .lock()
            .map(|s| *s)
            .unwrap_or(PermissionState::Unsupported)
    }

    async fn request(&self) -> PermissionState {
        let current = self.current();
        if current == PermissionState::Unsupported || current == PermissionState::Denied {
            return current;
        }
        if let Ok(mut state) = self.state.lock() {
            *state = self.answer;
        }
        self.answer
    }
}
