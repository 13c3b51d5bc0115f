//! Commands Layer
//!
//! The request/response boundary over the session. Every client (the stdio
//! binary, a UI shell, a mobile bridge) speaks these requests instead of
//! reimplementing matching or ranking. Handlers return `Result<T, String>`
//! with a user-presentable error.

mod inventory_cmd;
mod session_cmd;
mod settings_cmd;
mod shopping_cmd;
mod view_cmd;

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::collaborators::{AuthProvider, LocalAuthProvider, NotificationPermission};
use crate::domain::{MeasurementMode, RecipeCategory};
use crate::engine::RecipeFilter;
use crate::session::{FridgeSession, InventoryFilter};

pub use inventory_cmd::*;
pub use session_cmd::*;
pub use settings_cmd::*;
pub use shopping_cmd::*;
pub use view_cmd::*;

/// Application state shared across commands
pub struct AppState {
    pub session: Mutex<FridgeSession>,
    pub auth: Arc<LocalAuthProvider>,
    pub permission: Arc<dyn NotificationPermission>,
}

impl AppState {
    pub fn new(
        session: FridgeSession,
        auth: Arc<LocalAuthProvider>,
        permission: Arc<dyn NotificationPermission>,
    ) -> Self {
        Self {
            session: Mutex::new(session),
            auth,
            permission,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "cmd", content = "args", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum Request {
    // Session
    SignIn {
        user_id: String,
        #[serde(default)]
        access_token: Option<String>,
    },
    SignOut,
    SyncStatus,
    Flush,

    // Inventory
    AddInventoryItem {
        name: String,
        #[serde(default)]
        category: Option<String>,
        date_expires: NaiveDate,
    },
    AddManualItem {
        name: String,
        #[serde(default)]
        date_expires: Option<NaiveDate>,
    },
    ToggleQuickItem { name: String },
    RemoveInventoryItem { id: String },
    UpdateExpiry { id: String, date_expires: NaiveDate },

    // Shopping
    AddShoppingItem {
        name: String,
        #[serde(default)]
        reason: Option<String>,
        #[serde(default)]
        recipe_name: Option<String>,
    },
    AddMissingToShopping { recipe_id: String },
    AddMissingEssentials,
    ToggleShoppingCheck { id: String },
    RemoveShoppingItem { id: String },
    RemoveCheckedShopping,
    MoveCheckedToInventory,

    // Settings
    AddEssential { name: String },
    RemoveEssential { name: String },
    SetMeasurementMode { mode: MeasurementMode },
    ToggleQuickAddOption { name: String },
    ExportState,
    ImportState { payload: String },
    DismissNotice { id: String },
    ToggleRecipeStep { recipe_id: String, step: usize },
    ToggleNotifications,

    // Views
    GetState,
    GetNotices,
    GetMissingEssentials,
    GetRecipes {
        #[serde(default)]
        category: Option<RecipeCategory>,
        #[serde(default)]
        ready_only: bool,
    },
    GetRecipe { recipe_id: String },
    GetInventory {
        #[serde(default)]
        filter: InventoryFilter,
    },
    GetInventoryCategories,
    GetShopping {
        #[serde(default)]
        search: String,
    },
    GetQuickGroups,
    IsOwned { ingredient: String },
}

/// Wire envelope for one reply
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Latest user-facing message from the session, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Response {
    pub fn from_result(result: Result<Value, String>, message: Option<String>) -> Self {
        match result {
            Ok(data) => Self {
                ok: true,
                data: Some(data),
                error: None,
                message,
            },
            Err(error) => Self {
                ok: false,
                data: None,
                error: Some(error),
                message,
            },
        }
    }

    pub fn error(error: impl Into<String>) -> Self {
        Self::from_result(Err(error.into()), None)
    }
}

fn to_value<T: Serialize>(result: Result<T, String>) -> Result<Value, String> {
    result.and_then(|value| serde_json::to_value(value).map_err(|e| e.to_string()))
}

/// Follow the auth provider: every session change (sign-in, sign-out, token
/// refresh) re-syncs the session's identity, whoever triggered it.
pub fn spawn_auth_watcher(state: Arc<AppState>) -> JoinHandle<()> {
    let mut changes = state.auth.subscribe();
    tokio::spawn(async move {
        while changes.changed().await.is_ok() {
            let report = state
                .session
                .lock()
                .await
                .sync_identity(state.auth.as_ref())
                .await;
            if let Some(report) = report {
                log::info!("auth change hydrated namespace {}", report.namespace);
            }
        }
    })
}

/// Route one request to its handler
pub async fn dispatch(state: &AppState, request: Request) -> Result<Value, String> {
    match request {
        Request::SignIn {
            user_id,
            access_token,
        } => to_value(sign_in(state, user_id, access_token).await),
        Request::SignOut => to_value(sign_out(state).await),
        Request::SyncStatus => to_value(get_sync_status(state).await),
        Request::Flush => to_value(flush(state).await),

        Request::AddInventoryItem {
            name,
            category,
            date_expires,
        } => to_value(add_inventory_item(state, name, category, date_expires).await),
        Request::AddManualItem { name, date_expires } => {
            to_value(add_manual_item(state, name, date_expires).await)
        }
        Request::ToggleQuickItem { name } => to_value(toggle_quick_item(state, name).await),
        Request::RemoveInventoryItem { id } => to_value(remove_inventory_item(state, id).await),
        Request::UpdateExpiry { id, date_expires } => {
            to_value(update_expiry(state, id, date_expires).await)
        }

        Request::AddShoppingItem {
            name,
            reason,
            recipe_name,
        } => to_value(add_shopping_item(state, name, reason, recipe_name).await),
        Request::AddMissingToShopping { recipe_id } => {
            to_value(add_missing_to_shopping(state, recipe_id).await)
        }
        Request::AddMissingEssentials => to_value(add_missing_essentials(state).await),
        Request::ToggleShoppingCheck { id } => to_value(toggle_shopping_check(state, id).await),
        Request::RemoveShoppingItem { id } => to_value(remove_shopping_item(state, id).await),
        Request::RemoveCheckedShopping => to_value(remove_checked_shopping(state).await),
        Request::MoveCheckedToInventory => to_value(move_checked_to_inventory(state).await),

        Request::AddEssential { name } => to_value(add_essential(state, name).await),
        Request::RemoveEssential { name } => to_value(remove_essential(state, name).await),
        Request::SetMeasurementMode { mode } => to_value(set_measurement_mode(state, mode).await),
        Request::ToggleQuickAddOption { name } => {
            to_value(toggle_quick_add_option(state, name).await)
        }
        Request::ExportState => to_value(export_state(state).await),
        Request::ImportState { payload } => to_value(import_state(state, payload).await),
        Request::DismissNotice { id } => to_value(dismiss_notice(state, id).await),
        Request::ToggleRecipeStep { recipe_id, step } => {
            to_value(toggle_recipe_step(state, recipe_id, step).await)
        }
        Request::ToggleNotifications => to_value(toggle_notifications(state).await),

        Request::GetState => to_value(get_state(state).await),
        Request::GetNotices => to_value(get_notices(state).await),
        Request::GetMissingEssentials => to_value(get_missing_essentials(state).await),
        Request::GetRecipes {
            category,
            ready_only,
        } => to_value(get_recipes(state, RecipeFilter { category, ready_only }).await),
        Request::GetRecipe { recipe_id } => to_value(get_recipe(state, recipe_id).await),
        Request::GetInventory { filter } => to_value(get_inventory(state, filter).await),
        Request::GetInventoryCategories => to_value(get_inventory_categories(state).await),
        Request::GetShopping { search } => to_value(get_shopping(state, search).await),
        Request::GetQuickGroups => to_value(get_quick_groups(state).await),
        Request::IsOwned { ingredient } => to_value(is_owned(state, ingredient).await),
    }
}

/// Parse one JSON request, run it and wrap the outcome
pub async fn handle_line(state: &AppState, line: &str) -> Response {
    let request: Request = match serde_json::from_str(line) {
        Ok(request) => request,
        Err(e) => return Response::error(format!("Invalid request: {}", e)),
    };

    let result = dispatch(state, request).await;
    let message = state.session.lock().await.last_message().map(str::to_string);
    Response::from_result(result, message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::StaticPermission;
    use crate::config::EngineConfig;
    use crate::domain::{FixedClock, Identity, UserIdentity};
    use crate::repository::{MemoryGateway, MemoryKeyValueStore, RemoteStateGateway};
    use serde_json::json;
    use std::time::Duration;

    async fn app_state() -> AppState {
        app_state_with(None).await
    }

    async fn app_state_with(gateway: Option<Arc<dyn RemoteStateGateway>>) -> AppState {
        let clock = Arc::new(FixedClock(NaiveDate::from_ymd_opt(2026, 5, 10).unwrap()));
        let mut session =
            FridgeSession::new(EngineConfig::default(), MemoryKeyValueStore::new(), gateway, clock);
        session.switch_identity(Identity::Guest).await;
        AppState::new(
            session,
            Arc::new(LocalAuthProvider::new()),
            Arc::new(StaticPermission::granting()),
        )
    }

    #[test]
    fn test_request_wire_format() {
        let request: Request = serde_json::from_value(json!({
            "cmd": "add_shopping_item",
            "args": { "name": "양파", "recipeName": "계란말이" }
        }))
        .unwrap();
        assert_eq!(
            request,
            Request::AddShoppingItem {
                name: "양파".to_string(),
                reason: None,
                recipe_name: Some("계란말이".to_string()),
            }
        );

        let request: Request = serde_json::from_value(json!({ "cmd": "get_notices" })).unwrap();
        assert_eq!(request, Request::GetNotices);
    }

    #[tokio::test]
    async fn test_duplicate_add_reports_false() {
        let state = app_state().await;
        let line = r#"{"cmd":"add_shopping_item","args":{"name":"양파"}}"#;

        let first = handle_line(&state, line).await;
        let second = handle_line(&state, line).await;

        assert_eq!(first.data, Some(json!(true)));
        assert_eq!(second.data, Some(json!(false)));
        let shopping = handle_line(&state, r#"{"cmd":"get_shopping","args":{}}"#).await;
        assert_eq!(shopping.data.unwrap()["unchecked"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_validation_error_is_returned_as_message() {
        let state = app_state().await;
        let response = handle_line(
            &state,
            r#"{"cmd":"add_essential","args":{"name":"<b>"}}"#,
        )
        .await;

        assert!(!response.ok);
        assert!(response.error.unwrap().starts_with("Invalid input"));
    }

    #[tokio::test]
    async fn test_recipes_ranked_through_boundary() {
        let state = app_state().await;
        handle_line(
            &state,
            r#"{"cmd":"add_inventory_item","args":{"name":"계란","dateExpires":"2026-06-01"}}"#,
        )
        .await;

        let response = handle_line(&state, r#"{"cmd":"get_recipe","args":{"recipeId":"gyeran-mari"}}"#).await;
        let data = response.data.unwrap();
        assert_eq!(data["card"]["matchRate"], 50);
        assert_eq!(data["card"]["missingMain"], json!(["대파"]));
    }

    #[tokio::test]
    async fn test_unknown_command_is_rejected() {
        let state = app_state().await;
        let response = handle_line(&state, r#"{"cmd":"launch_rockets"}"#).await;
        assert!(!response.ok);
        assert!(response.error.unwrap().starts_with("Invalid request"));
    }

    #[tokio::test]
    async fn test_sign_in_switches_namespace() {
        let state = app_state().await;
        let response = handle_line(&state, r#"{"cmd":"sign_in","args":{"userId":"u-9"}}"#).await;
        assert_eq!(response.data.unwrap()["namespace"], "u-9");

        let response = handle_line(&state, r#"{"cmd":"sign_out"}"#).await;
        assert_eq!(response.data.unwrap()["namespace"], "guest");
    }

    #[tokio::test(start_paused = true)]
    async fn test_switching_user_mid_debounce_drops_pending_push() {
        let gateway = MemoryGateway::new();
        let state = app_state_with(Some(Arc::new(gateway.clone()))).await;

        handle_line(&state, r#"{"cmd":"sign_in","args":{"userId":"u-1"}}"#).await;
        let added = handle_line(&state, r#"{"cmd":"add_essential","args":{"name":"두부"}}"#).await;
        assert_eq!(added.data, Some(json!(true)));

        tokio::time::sleep(Duration::from_millis(50)).await;
        handle_line(&state, r#"{"cmd":"sign_in","args":{"userId":"u-2"}}"#).await;
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert!(gateway.saves().is_empty(), "unexpected saves: {:?}", gateway.saves());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sign_out_does_not_push_for_previous_user() {
        let gateway = MemoryGateway::new();
        let state = app_state_with(Some(Arc::new(gateway.clone()))).await;

        handle_line(&state, r#"{"cmd":"sign_in","args":{"userId":"u-1"}}"#).await;
        handle_line(&state, r#"{"cmd":"add_shopping_item","args":{"name":"양파"}}"#).await;
        let response = handle_line(&state, r#"{"cmd":"sign_out"}"#).await;
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert_eq!(response.data.unwrap()["namespace"], "guest");
        assert!(gateway.saves().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_auth_change_drives_hydration() {
        let state = Arc::new(app_state().await);
        let watcher = spawn_auth_watcher(state.clone());

        state.auth.sign_in(UserIdentity::new("u-7"));
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(state.session.lock().await.identity().namespace(), "u-7");

        state.auth.sign_out();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(state.session.lock().await.identity().is_guest());

        watcher.abort();
    }
}
