//! Fridge Session
//!
//! The single controller that owns every piece of session-scoped state:
//! the active identity and its keys, the in-memory `PersistedAppState`,
//! dismissed notices, recipe step progress and the last user-facing
//! message. Identity changes reset all of it deterministically.
//!
//! Every mutation validates first, then applies in memory, writes the
//! touched slices through to local storage immediately, and finally asks
//! the sync coordinator for a debounced remote push.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::collaborators::{AuthProvider, NotificationPermission, PermissionState};
use crate::config::EngineConfig;
use crate::domain::{
    builtin_recipes, comparison_key, configured_quick_groups, find_quick_item,
    load_recipe_catalog, new_entry_id, reasons, AppliedFields, Clock, DomainError, DomainResult,
    ExpiryStatus, Identity, InventoryEntry, MeasurementMode, PersistedAppState, QuickItem,
    Recipe, ShoppingEntry, DEFAULT_CATEGORY,
};
use crate::engine::{
    filter_cards, generate_notices, missing_essentials, rank_recipes, IngredientMatcher, Notice,
    NoticeBoard, RecipeCard, RecipeFilter,
};
use crate::repository::{
    IdentityKeyResolver, KeyValueStore, LocalStateStore, MigrationOutcome, RemoteError,
    RemoteStateGateway, Slice, StorageKeys,
};
use crate::sync::{SyncCoordinator, SyncStatus};

/// Category filter value meaning "every category"
pub const ALL_CATEGORIES: &str = "전체";

/// Shelf life given to items moved from the shopping list into the fridge
pub const MOVED_ITEM_EXPIRY_DAYS: i64 = 7;

/// What the remote side contributed to a hydration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RemoteOutcome {
    /// Guest session or no remote configured
    Skipped,
    /// Signed in, but the user has no remote row yet
    Empty,
    Applied { fields: AppliedFields },
    /// Remote table or policy missing; local-only until the next sign-in
    Unavailable,
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HydrationReport {
    pub namespace: String,
    pub migration: MigrationOutcome,
    pub remote: RemoteOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum QuickToggle {
    Added { entry: InventoryEntry },
    Removed { count: usize },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryFilter {
    #[serde(default)]
    pub search: String,
    /// `None` or "전체" for every category
    #[serde(default)]
    pub category: Option<String>,
    /// `None` for every status
    #[serde(default)]
    pub status: Option<ExpiryStatus>,
}

impl InventoryFilter {
    fn accepts(&self, entry: &InventoryEntry, status: ExpiryStatus) -> bool {
        let search = self.search.trim().to_lowercase();
        if !entry.name.to_lowercase().contains(&search) {
            return false;
        }
        if let Some(category) = self.category.as_deref() {
            if category != ALL_CATEGORIES && entry.category != category {
                return false;
            }
        }
        self.status.map_or(true, |wanted| wanted == status)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRow {
    #[serde(flatten)]
    pub entry: InventoryEntry,
    pub days_left: i64,
    pub status: ExpiryStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingView {
    pub unchecked: Vec<ShoppingEntry>,
    pub checked: Vec<ShoppingEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickItemView {
    #[serde(flatten)]
    pub item: QuickItem,
    /// Already in the fridge
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuickGroupView {
    pub title: &'static str,
    pub items: Vec<QuickItemView>,
}

pub struct FridgeSession {
    config: EngineConfig,
    store: LocalStateStore,
    resolver: IdentityKeyResolver,
    sync: SyncCoordinator,
    clock: Arc<dyn Clock>,
    recipes: Vec<Recipe>,
    identity: Identity,
    keys: StorageKeys,
    hydrated: bool,
    state: PersistedAppState,
    notice_board: NoticeBoard,
    recipe_progress: HashMap<String, BTreeSet<usize>>,
    notifications_enabled: bool,
    last_message: Option<String>,
}

impl FridgeSession {
    /// Build a session. Nothing is loaded until the first `switch_identity`.
    pub fn new(
        config: EngineConfig,
        storage: impl KeyValueStore + 'static,
        gateway: Option<Arc<dyn RemoteStateGateway>>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let resolver = IdentityKeyResolver::new(config.key_prefix.clone());
        let recipes = match config.recipe_catalog.as_deref() {
            Some(path) => load_recipe_catalog(path).unwrap_or_else(|e| {
                log::warn!("Failed to load recipes from {}: {}", path.display(), e);
                builtin_recipes()
            }),
            None => builtin_recipes(),
        };

        Self {
            sync: SyncCoordinator::new(gateway, config.debounce()),
            keys: resolver.keys_for(&Identity::Guest),
            resolver,
            store: LocalStateStore::new(storage),
            clock,
            recipes,
            identity: Identity::Guest,
            hydrated: false,
            state: PersistedAppState::default(),
            notice_board: NoticeBoard::default(),
            recipe_progress: HashMap::new(),
            notifications_enabled: false,
            last_message: None,
            config,
        }
    }

    // ========================
    // Identity & hydration
    // ========================

    /// Start a new identity session: resolve keys (migrating if needed),
    /// load local slices, then lay the remote row over them.
    pub async fn switch_identity(&mut self, identity: Identity) -> HydrationReport {
        self.sync.begin_hydration(&identity);

        let migration = match self.resolver.resolve(&identity, self.store.storage()) {
            Ok(resolution) => {
                self.keys = resolution.keys;
                resolution.outcome
            }
            Err(e) => {
                log::error!("Key migration for {} failed: {}", identity.namespace(), e);
                self.keys = self.resolver.keys_for(&identity);
                MigrationOutcome::NothingToMigrate
            }
        };

        self.identity = identity;
        self.state = self.store.load_state(&self.keys);
        self.notice_board.clear();
        self.recipe_progress.clear();
        self.last_message = None;

        let remote = match self.sync.pull().await {
            Ok(Some(payload)) => {
                let fields = self.state.apply_document(&payload);
                self.persist_applied(&fields);
                RemoteOutcome::Applied { fields }
            }
            Ok(None) if !self.sync.has_remote_user() || self.sync.is_remote_disabled() => {
                RemoteOutcome::Skipped
            }
            Ok(None) => RemoteOutcome::Empty,
            Err(RemoteError::SchemaAbsent(_)) => {
                self.last_message = Some(
                    "Remote sync table or access policy is missing; running in local-only mode."
                        .to_string(),
                );
                RemoteOutcome::Unavailable
            }
            Err(RemoteError::Transient(message)) => {
                self.last_message =
                    Some("Remote sync failed; running in local-only mode.".to_string());
                RemoteOutcome::Failed { message }
            }
        };

        self.sync.finish_hydration();
        self.hydrated = true;

        log::info!(
            "hydrated namespace {} ({} inventory, {} shopping)",
            self.identity.namespace(),
            self.state.inventory_entries.len(),
            self.state.shopping_entries.len()
        );

        HydrationReport {
            namespace: self.identity.namespace().to_string(),
            migration,
            remote,
        }
    }

    /// Follow the auth provider. Hydrates when the namespace changed (or on
    /// first use); a token refresh for the same user only updates the token.
    pub async fn sync_identity(&mut self, auth: &dyn AuthProvider) -> Option<HydrationReport> {
        let identity = Identity::from(auth.current_identity());
        if self.hydrated && self.identity.same_namespace(&identity) {
            self.sync.refresh_identity(&identity);
            self.identity = identity;
            return None;
        }
        Some(self.switch_identity(identity).await)
    }

    /// Send any pending push now
    pub async fn flush(&mut self) {
        self.sync.flush().await;
    }

    // ========================
    // Write-through
    // ========================

    fn persist_applied(&mut self, fields: &AppliedFields) {
        let slices: Vec<Slice> = [
            (Slice::Inventory, fields.inventory_entries),
            (Slice::Shopping, fields.shopping_entries),
            (Slice::Essentials, fields.essential_names),
            (Slice::Mode, fields.measurement_mode),
            (Slice::QuickAdd, fields.quick_add_enabled_names),
        ]
        .into_iter()
        .filter_map(|(slice, applied)| applied.then_some(slice))
        .collect();
        self.write_local(&slices);
    }

    /// Write slices locally. A failed write keeps the in-memory change and
    /// is reported through `last_message`.
    fn write_local(&mut self, slices: &[Slice]) {
        for slice in slices {
            if let Err(e) = self.store.write_slice(&self.keys, *slice, &self.state) {
                log::error!("Failed to save {} locally: {}", slice.key_name(), e);
                self.last_message = Some(format!("Could not save locally: {}", e));
            }
        }
    }

    fn commit(&mut self, slices: &[Slice]) {
        self.write_local(slices);
        self.sync.schedule_push(self.state.clone());
    }

    fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    fn inform(&mut self, message: String) {
        self.last_message = Some(message);
    }

    // ========================
    // Inventory
    // ========================

    pub fn add_inventory_item(
        &mut self,
        name: &str,
        category: &str,
        date_expires: NaiveDate,
    ) -> DomainResult<InventoryEntry> {
        let name = crate::domain::validate_ingredient_name(name)?;
        let category = match category.trim() {
            "" => DEFAULT_CATEGORY.to_string(),
            other => other.to_string(),
        };

        let entry = InventoryEntry::new(
            new_entry_id::<InventoryEntry>(),
            name,
            category,
            self.today(),
            date_expires,
        );
        self.state.inventory_entries.push(entry.clone());
        self.commit(&[Slice::Inventory]);
        self.inform(format!("Added \"{}\".", entry.name));
        Ok(entry)
    }

    /// Manual add from the free-form form; the expiry date is required.
    pub fn add_manual_item(
        &mut self,
        name: &str,
        date_expires: Option<NaiveDate>,
    ) -> DomainResult<InventoryEntry> {
        let date_expires = date_expires
            .ok_or_else(|| DomainError::InvalidInput("Please choose an expiry date.".to_string()))?;
        self.add_inventory_item(name, DEFAULT_CATEGORY, date_expires)
    }

    /// Add a catalog item with its default shelf life, or remove every
    /// fridge entry of that name if one is already there.
    pub fn toggle_quick_item(&mut self, name: &str) -> DomainResult<QuickToggle> {
        let item = find_quick_item(name)
            .ok_or_else(|| DomainError::NotFound(format!("Quick item \"{}\"", name)))?;
        let key = comparison_key(item.name);

        let before = self.state.inventory_entries.len();
        self.state
            .inventory_entries
            .retain(|entry| comparison_key(&entry.name) != key);
        let count = before - self.state.inventory_entries.len();

        if count > 0 {
            self.commit(&[Slice::Inventory]);
            self.inform(format!("Deselected \"{}\".", item.name));
            return Ok(QuickToggle::Removed { count });
        }

        let expires = self.clock.days_from_today(item.default_expiry_days);
        let entry = self.add_inventory_item(item.name, item.category, expires)?;
        Ok(QuickToggle::Added { entry })
    }

    pub fn remove_inventory_item(&mut self, id: &str) -> DomainResult<InventoryEntry> {
        let index = self
            .state
            .inventory_entries
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| DomainError::NotFound(format!("Inventory entry {}", id)))?;
        let removed = self.state.inventory_entries.remove(index);

        let mut slices = vec![Slice::Inventory];
        if self.config.restock_on_remove
            && self.insert_shopping(&removed.name, reasons::USED_UP, None)
        {
            slices.push(Slice::Shopping);
        }

        self.commit(&slices);
        self.inform(format!("Removed \"{}\".", removed.name));
        Ok(removed)
    }

    pub fn update_expiry(&mut self, id: &str, date_expires: NaiveDate) -> DomainResult<InventoryEntry> {
        let entry = self
            .state
            .inventory_entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| DomainError::NotFound(format!("Inventory entry {}", id)))?;
        entry.date_expires = date_expires;
        let updated = entry.clone();

        self.commit(&[Slice::Inventory]);
        self.inform(format!(
            "Changed the expiry of \"{}\" to {}.",
            updated.name, updated.date_expires
        ));
        Ok(updated)
    }

    // ========================
    // Shopping
    // ========================

    /// Append unless a same-named entry exists (case-insensitive). Does not commit.
    fn insert_shopping(&mut self, name: &str, reason: &str, recipe_name: Option<&str>) -> bool {
        if self.state.shopping_entries.iter().any(|e| e.same_name(name)) {
            return false;
        }
        self.state.shopping_entries.push(ShoppingEntry::new(
            new_entry_id::<ShoppingEntry>(),
            name.to_string(),
            reason.to_string(),
            recipe_name.map(str::to_string),
        ));
        true
    }

    /// Returns `Ok(false)` when the name is already on the list.
    pub fn add_shopping_item(
        &mut self,
        name: &str,
        reason: Option<&str>,
        recipe_name: Option<&str>,
    ) -> DomainResult<bool> {
        let name = crate::domain::validate_ingredient_name(name)?;
        let added = self.insert_shopping(&name, reason.unwrap_or(reasons::MANUAL), recipe_name);
        if added {
            self.commit(&[Slice::Shopping]);
        }
        Ok(added)
    }

    /// Put the recipe's missing main ingredients on the list; returns how many were new.
    pub fn add_missing_to_shopping(&mut self, recipe_id: &str) -> DomainResult<usize> {
        let card = self
            .recipe_card(recipe_id)
            .ok_or_else(|| DomainError::NotFound(format!("Recipe {}", recipe_id)))?;

        let added = self.add_names_to_shopping(
            &card.missing_main,
            reasons::RECIPE_MISSING,
            Some(&card.recipe.name),
        );
        if added > 0 {
            self.inform(format!(
                "Added {} missing ingredient(s) for \"{}\" to the shopping list.",
                added, card.recipe.name
            ));
        } else {
            self.inform("Those ingredients are already on the shopping list.".to_string());
        }
        Ok(added)
    }

    pub fn add_missing_essentials_to_shopping(&mut self) -> usize {
        let missing = self.missing_essentials();
        let added = self.add_names_to_shopping(&missing, reasons::ESSENTIAL_MISSING, None);
        self.inform(format!(
            "Added {} missing essential(s) to the shopping list.",
            added
        ));
        added
    }

    fn add_names_to_shopping(&mut self, names: &[String], reason: &str, recipe_name: Option<&str>) -> usize {
        let mut added = 0;
        for raw in names {
            match crate::domain::validate_ingredient_name(raw) {
                Ok(name) => {
                    if self.insert_shopping(&name, reason, recipe_name) {
                        added += 1;
                    }
                }
                Err(e) => log::warn!("skipping shopping name {:?}: {}", raw, e),
            }
        }
        if added > 0 {
            self.commit(&[Slice::Shopping]);
        }
        added
    }

    /// Flip the checked flag; returns the new value
    pub fn toggle_shopping_check(&mut self, id: &str) -> DomainResult<bool> {
        let entry = self
            .state
            .shopping_entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| DomainError::NotFound(format!("Shopping entry {}", id)))?;
        entry.checked = !entry.checked;
        let checked = entry.checked;
        self.commit(&[Slice::Shopping]);
        Ok(checked)
    }

    pub fn remove_shopping_item(&mut self, id: &str) -> DomainResult<ShoppingEntry> {
        let index = self
            .state
            .shopping_entries
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| DomainError::NotFound(format!("Shopping entry {}", id)))?;
        let removed = self.state.shopping_entries.remove(index);
        self.commit(&[Slice::Shopping]);
        Ok(removed)
    }

    pub fn remove_checked_shopping(&mut self) -> usize {
        let before = self.state.shopping_entries.len();
        self.state.shopping_entries.retain(|e| !e.checked);
        let removed = before - self.state.shopping_entries.len();
        if removed > 0 {
            self.commit(&[Slice::Shopping]);
        }
        removed
    }

    /// Checked entries become fridge items (category "기타", a week of shelf life).
    pub fn move_checked_to_inventory(&mut self) -> usize {
        let (picked, remaining): (Vec<ShoppingEntry>, Vec<ShoppingEntry>) = self
            .state
            .shopping_entries
            .drain(..)
            .partition(|e| e.checked);
        self.state.shopping_entries = remaining;

        if picked.is_empty() {
            return 0;
        }

        let today = self.today();
        let expires = self.clock.days_from_today(MOVED_ITEM_EXPIRY_DAYS);
        self.state
            .inventory_entries
            .extend(picked.iter().map(|item| {
                InventoryEntry::new(
                    new_entry_id::<InventoryEntry>(),
                    item.name.clone(),
                    DEFAULT_CATEGORY.to_string(),
                    today,
                    expires,
                )
            }));

        self.commit(&[Slice::Inventory, Slice::Shopping]);
        self.inform(format!("Moved {} checked item(s) to the fridge.", picked.len()));
        picked.len()
    }

    // ========================
    // Settings
    // ========================

    /// Returns `Ok(false)` when the exact name is already listed.
    pub fn add_essential(&mut self, name: &str) -> DomainResult<bool> {
        let name = crate::domain::validate_ingredient_name(name)?;
        if self.state.essential_names.contains(&name) {
            return Ok(false);
        }
        self.state.essential_names.push(name);
        self.commit(&[Slice::Essentials]);
        Ok(true)
    }

    pub fn remove_essential(&mut self, name: &str) -> bool {
        let before = self.state.essential_names.len();
        self.state.essential_names.retain(|n| n != name);
        let removed = before != self.state.essential_names.len();
        if removed {
            self.commit(&[Slice::Essentials]);
        }
        removed
    }

    pub fn set_measurement_mode(&mut self, mode: MeasurementMode) {
        if self.state.measurement_mode == mode {
            return;
        }
        self.state.measurement_mode = mode;
        self.commit(&[Slice::Mode]);
    }

    /// Show or hide a catalog item in the quick-add panel; returns whether it is now shown
    pub fn toggle_quick_add_option(&mut self, name: &str) -> DomainResult<bool> {
        if find_quick_item(name).is_none() {
            return Err(DomainError::NotFound(format!("Quick item \"{}\"", name)));
        }

        let enabled = &mut self.state.quick_add_enabled_names;
        let now_enabled = if let Some(index) = enabled.iter().position(|n| n == name) {
            enabled.remove(index);
            false
        } else {
            enabled.push(name.to_string());
            true
        };
        self.commit(&[Slice::QuickAdd]);
        Ok(now_enabled)
    }

    pub fn export_state(&self) -> DomainResult<String> {
        Ok(self.state.to_export_document(chrono::Utc::now())?)
    }

    /// Replace every present, well-typed field of a backup document.
    pub fn import_state(&mut self, text: &str) -> DomainResult<AppliedFields> {
        if text.trim().is_empty() {
            return Err(DomainError::InvalidInput(
                "Paste the JSON to import first.".to_string(),
            ));
        }
        let doc: serde_json::Value = serde_json::from_str(text).map_err(|e| {
            log::warn!("import rejected: {}", e);
            DomainError::Decode("Check the JSON format; nothing was imported.".to_string())
        })?;

        let fields = self.state.apply_document(&doc);
        if fields.any() {
            self.persist_applied(&fields);
            self.sync.schedule_push(self.state.clone());
            self.inform("Data imported.".to_string());
        } else {
            self.inform("The document held no importable fields.".to_string());
        }
        Ok(fields)
    }

    pub fn dismiss_notice(&mut self, id: &str) {
        self.notice_board.dismiss(id);
    }

    /// Tick or untick a step; returns whether it is now checked
    pub fn toggle_recipe_step(&mut self, recipe_id: &str, step: usize) -> DomainResult<bool> {
        let recipe = self
            .recipes
            .iter()
            .find(|r| r.id == recipe_id)
            .ok_or_else(|| DomainError::NotFound(format!("Recipe {}", recipe_id)))?;
        if step >= recipe.steps.len() {
            return Err(DomainError::InvalidInput(format!(
                "Recipe {} has no step {}",
                recipe_id, step
            )));
        }

        let steps = self.recipe_progress.entry(recipe_id.to_string()).or_default();
        if steps.remove(&step) {
            Ok(false)
        } else {
            steps.insert(step);
            Ok(true)
        }
    }

    pub fn checked_step_count(&self, recipe_id: &str) -> usize {
        self.recipe_progress.get(recipe_id).map_or(0, BTreeSet::len)
    }

    /// Turn expiry reminders off, or ask for permission and turn them on.
    pub async fn toggle_notifications(&mut self, permission: &dyn NotificationPermission) -> bool {
        if permission.current() == PermissionState::Unsupported {
            return self.notifications_enabled;
        }
        if self.notifications_enabled {
            self.notifications_enabled = false;
            return false;
        }
        if permission.request().await == PermissionState::Granted {
            self.notifications_enabled = true;
            self.inform("Expiry reminders are on.".to_string());
        }
        self.notifications_enabled
    }

    // ========================
    // Views
    // ========================

    pub fn state(&self) -> &PersistedAppState {
        &self.state
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn keys(&self) -> &StorageKeys {
        &self.keys
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn notifications_enabled(&self) -> bool {
        self.notifications_enabled
    }

    pub fn last_message(&self) -> Option<&str> {
        self.last_message.as_deref()
    }

    pub fn sync_status(&self) -> SyncStatus {
        self.sync.status()
    }

    pub fn subscribe_sync(&self) -> tokio::sync::watch::Receiver<SyncStatus> {
        self.sync.subscribe()
    }

    fn matcher(&self) -> IngredientMatcher {
        IngredientMatcher::from_inventory(&self.state.inventory_entries)
    }

    pub fn is_owned(&self, ingredient: &str) -> bool {
        self.matcher().is_owned(ingredient)
    }

    /// Notices that apply and have not been dismissed this session
    pub fn notices(&self) -> Vec<Notice> {
        let notices = generate_notices(
            &self.state.inventory_entries,
            &self.state.essential_names,
            self.today(),
        );
        self.notice_board.visible(notices)
    }

    pub fn missing_essentials(&self) -> Vec<String> {
        missing_essentials(&self.state.inventory_entries, &self.state.essential_names)
    }

    pub fn ranked_recipes(&self, filter: &RecipeFilter) -> Vec<RecipeCard> {
        filter_cards(rank_recipes(&self.recipes, &self.matcher()), filter)
    }

    pub fn recipe_card(&self, recipe_id: &str) -> Option<RecipeCard> {
        let recipe = self.recipes.iter().find(|r| r.id == recipe_id)?;
        Some(RecipeCard::score(recipe, &self.matcher()))
    }

    /// Inventory soonest-expiring first, filtered
    pub fn inventory_view(&self, filter: &InventoryFilter) -> Vec<InventoryRow> {
        let today = self.today();
        let mut rows: Vec<InventoryRow> = self
            .state
            .inventory_entries
            .iter()
            .map(|entry| {
                let days_left = entry.days_until_expiry(today);
                InventoryRow {
                    entry: entry.clone(),
                    days_left,
                    status: ExpiryStatus::from_days(days_left),
                }
            })
            .filter(|row| filter.accepts(&row.entry, row.status))
            .collect();
        rows.sort_by_key(|row| row.days_left);
        rows
    }

    /// "전체" followed by each category in first-seen order
    pub fn inventory_categories(&self) -> Vec<String> {
        let mut categories = vec![ALL_CATEGORIES.to_string()];
        for entry in &self.state.inventory_entries {
            if !categories.contains(&entry.category) {
                categories.push(entry.category.clone());
            }
        }
        categories
    }

    pub fn shopping_view(&self, search: &str) -> ShoppingView {
        let search = search.trim().to_lowercase();
        let mut view = ShoppingView::default();
        for entry in &self.state.shopping_entries {
            if !entry.name.to_lowercase().contains(&search) {
                continue;
            }
            if entry.checked {
                view.checked.push(entry.clone());
            } else {
                view.unchecked.push(entry.clone());
            }
        }
        view
    }

    /// Enabled quick-add groups with each item's selection state
    pub fn quick_groups(&self) -> Vec<QuickGroupView> {
        let owned: Vec<String> = self
            .state
            .inventory_entries
            .iter()
            .map(|e| comparison_key(&e.name))
            .collect();

        configured_quick_groups(&self.state.quick_add_enabled_names)
            .into_iter()
            .map(|(title, items)| QuickGroupView {
                title,
                items: items
                    .into_iter()
                    .map(|item| QuickItemView {
                        selected: owned.contains(&comparison_key(item.name)),
                        item: item.clone(),
                    })
                    .collect(),
            })
            .collect()
    }
}
