//! Session Commands
//!
//! Sign-in/out through the auth collaborator, sync status and flushing.

use super::AppState;
use crate::domain::UserIdentity;
use crate::session::HydrationReport;
use crate::sync::SyncStatus;

/// Sign in and hydrate the user's namespace (`None` if already active)
pub async fn sign_in(
    state: &AppState,
    user_id: String,
    access_token: Option<String>,
) -> Result<Option<HydrationReport>, String> {
    if user_id.trim().is_empty() {
        return Err("A user id is required to sign in.".to_string());
    }
    let mut user = UserIdentity::new(user_id);
    if let Some(token) = access_token {
        user = user.with_token(token);
    }
    state.auth.sign_in(user);

    // A push still pending for the previous identity is dropped by the switch
    let mut session = state.session.lock().await;
    Ok(session.sync_identity(state.auth.as_ref()).await)
}

/// Sign out and fall back to the guest namespace
pub async fn sign_out(state: &AppState) -> Result<Option<HydrationReport>, String> {
    state.auth.sign_out();
    let mut session = state.session.lock().await;
    Ok(session.sync_identity(state.auth.as_ref()).await)
}

pub async fn get_sync_status(state: &AppState) -> Result<SyncStatus, String> {
    Ok(state.session.lock().await.sync_status())
}

/// Push any pending edit now
pub async fn flush(state: &AppState) -> Result<SyncStatus, String> {
    let mut session = state.session.lock().await;
    session.flush().await;
    Ok(session.sync_status())
}
