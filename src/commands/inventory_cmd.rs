//! Inventory Commands

use chrono::NaiveDate;

use super::AppState;
use crate::domain::InventoryEntry;
use crate::session::QuickToggle;

/// Add a fridge item (category defaults to "기타")
pub async fn add_inventory_item(
    state: &AppState,
    name: String,
    category: Option<String>,
    date_expires: NaiveDate,
) -> Result<InventoryEntry, String> {
    let mut session = state.session.lock().await;
    session
        .add_inventory_item(&name, category.as_deref().unwrap_or(""), date_expires)
        .map_err(|e| e.to_string())
}

pub async fn add_manual_item(
    state: &AppState,
    name: String,
    date_expires: Option<NaiveDate>,
) -> Result<InventoryEntry, String> {
    let mut session = state.session.lock().await;
    session
        .add_manual_item(&name, date_expires)
        .map_err(|e| e.to_string())
}

/// Add a quick-add catalog item, or remove it if already in the fridge
pub async fn toggle_quick_item(state: &AppState, name: String) -> Result<QuickToggle, String> {
    let mut session = state.session.lock().await;
    session.toggle_quick_item(&name).map_err(|e| e.to_string())
}

pub async fn remove_inventory_item(state: &AppState, id: String) -> Result<InventoryEntry, String> {
    let mut session = state.session.lock().await;
    session.remove_inventory_item(&id).map_err(|e| e.to_string())
}

pub async fn update_expiry(
    state: &AppState,
    id: String,
    date_expires: NaiveDate,
) -> Result<InventoryEntry, String> {
    let mut session = state.session.lock().await;
    session
        .update_expiry(&id, date_expires)
        .map_err(|e| e.to_string())
}
