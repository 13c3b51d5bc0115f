//! Shopping List Commands
//!
//! Adds are idempotent by name: a duplicate answers `false`, not an error.

use super::AppState;
use crate::domain::ShoppingEntry;

pub async fn add_shopping_item(
    state: &AppState,
    name: String,
    reason: Option<String>,
    recipe_name: Option<String>,
) -> Result<bool, String> {
    let mut session = state.session.lock().await;
    session
        .add_shopping_item(&name, reason.as_deref(), recipe_name.as_deref())
        .map_err(|e| e.to_string())
}

/// Returns how many of the recipe's missing ingredients were newly added
pub async fn add_missing_to_shopping(state: &AppState, recipe_id: String) -> Result<usize, String> {
    let mut session = state.session.lock().await;
    session
        .add_missing_to_shopping(&recipe_id)
        .map_err(|e| e.to_string())
}

pub async fn add_missing_essentials(state: &AppState) -> Result<usize, String> {
    Ok(state.session.lock().await.add_missing_essentials_to_shopping())
}

pub async fn toggle_shopping_check(state: &AppState, id: String) -> Result<bool, String> {
    let mut session = state.session.lock().await;
    session.toggle_shopping_check(&id).map_err(|e| e.to_string())
}

pub async fn remove_shopping_item(state: &AppState, id: String) -> Result<ShoppingEntry, String> {
    let mut session = state.session.lock().await;
    session.remove_shopping_item(&id).map_err(|e| e.to_string())
}

pub async fn remove_checked_shopping(state: &AppState) -> Result<usize, String> {
    Ok(state.session.lock().await.remove_checked_shopping())
}

pub async fn move_checked_to_inventory(state: &AppState) -> Result<usize, String> {
    Ok(state.session.lock().await.move_checked_to_inventory())
}
