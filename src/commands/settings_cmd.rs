//! Settings Commands
//!
//! Essentials, measurement mode, quick-add options, backup/restore and the
//! session-only toggles (notices, recipe steps, notifications).

use super::AppState;
use crate::domain::{AppliedFields, MeasurementMode};

pub async fn add_essential(state: &AppState, name: String) -> Result<bool, String> {
    let mut session = state.session.lock().await;
    session.add_essential(&name).map_err(|e| e.to_string())
}

pub async fn remove_essential(state: &AppState, name: String) -> Result<bool, String> {
    Ok(state.session.lock().await.remove_essential(&name))
}

pub async fn set_measurement_mode(state: &AppState, mode: MeasurementMode) -> Result<MeasurementMode, String> {
    let mut session = state.session.lock().await;
    session.set_measurement_mode(mode);
    Ok(session.state().measurement_mode)
}

pub async fn toggle_quick_add_option(state: &AppState, name: String) -> Result<bool, String> {
    let mut session = state.session.lock().await;
    session
        .toggle_quick_add_option(&name)
        .map_err(|e| e.to_string())
}

/// Pretty JSON backup of the whole state
pub async fn export_state(state: &AppState) -> Result<String, String> {
    state
        .session
        .lock()
        .await
        .export_state()
        .map_err(|e| e.to_string())
}

pub async fn import_state(state: &AppState, payload: String) -> Result<AppliedFields, String> {
    let mut session = state.session.lock().await;
    session.import_state(&payload).map_err(|e| e.to_string())
}

pub async fn dismiss_notice(state: &AppState, id: String) -> Result<(), String> {
    state.session.lock().await.dismiss_notice(&id);
    Ok(())
}

pub async fn toggle_recipe_step(state: &AppState, recipe_id: String, step: usize) -> Result<bool, String> {
    let mut session = state.session.lock().await;
    session
        .toggle_recipe_step(&recipe_id, step)
        .map_err(|e| e.to_string())
}

pub async fn toggle_notifications(state: &AppState) -> Result<bool, String> {
    let mut session = state.session.lock().await;
    Ok(session.toggle_notifications(state.permission.as_ref()).await)
}
