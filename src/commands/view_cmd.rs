//! View Commands
//!
//! Read-only derived views for the presentation layer.

use serde::Serialize;

use super::AppState;
use crate::domain::PersistedAppState;
use crate::engine::{Notice, RecipeCard, RecipeFilter};
use crate::session::{InventoryFilter, InventoryRow, QuickGroupView, ShoppingView};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDetail {
    pub card: RecipeCard,
    pub checked_steps: usize,
}

pub async fn get_state(state: &AppState) -> Result<PersistedAppState, String> {
    Ok(state.session.lock().await.state().clone())
}

pub async fn get_notices(state: &AppState) -> Result<Vec<Notice>, String> {
    Ok(state.session.lock().await.notices())
}

pub async fn get_missing_essentials(state: &AppState) -> Result<Vec<String>, String> {
    Ok(state.session.lock().await.missing_essentials())
}

pub async fn get_recipes(state: &AppState, filter: RecipeFilter) -> Result<Vec<RecipeCard>, String> {
    Ok(state.session.lock().await.ranked_recipes(&filter))
}

pub async fn get_recipe(state: &AppState, recipe_id: String) -> Result<RecipeDetail, String> {
    let session = state.session.lock().await;
    let card = session
        .recipe_card(&recipe_id)
        .ok_or_else(|| format!("Recipe {} not found", recipe_id))?;
    Ok(RecipeDetail {
        checked_steps: session.checked_step_count(&recipe_id),
        card,
    })
}

pub async fn get_inventory(state: &AppState, filter: InventoryFilter) -> Result<Vec<InventoryRow>, String> {
    Ok(state.session.lock().await.inventory_view(&filter))
}

pub async fn get_inventory_categories(state: &AppState) -> Result<Vec<String>, String> {
    Ok(state.session.lock().await.inventory_categories())
}

pub async fn get_shopping(state: &AppState, search: String) -> Result<ShoppingView, String> {
    Ok(state.session.lock().await.shopping_view(&search))
}

pub async fn get_quick_groups(state: &AppState) -> Result<Vec<QuickGroupView>, String> {
    Ok(state.session.lock().await.quick_groups())
}

pub async fn is_owned(state: &AppState, ingredient: String) -> Result<bool, String> {
    Ok(state.session.lock().await.is_owned(&ingredient))
}
