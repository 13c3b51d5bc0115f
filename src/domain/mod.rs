//! Domain Layer
//!
//! Entities, the persisted state shape, static catalogs and name rules.
//! Nothing in here touches storage or the network.

mod catalog;
mod clock;
mod entity;
mod identity;
mod inventory;
mod shopping;
mod state;
mod validation;

pub use catalog::{
    builtin_recipes, configured_quick_groups, find_quick_item, load_recipe_catalog,
    quick_item_names, sanitize_quick_add_names, QuickItem, QuickItemGroup, Recipe,
    RecipeCategory, QUICK_ITEM_GROUPS,
};
pub use clock::{days_until, Clock, FixedClock, SystemClock};
pub use entity::{new_entry_id, DomainError, DomainResult, Entity};
pub use identity::{Identity, UserIdentity, GUEST_NAMESPACE};
pub use inventory::{ExpiryStatus, InventoryEntry, DEFAULT_CATEGORY, EXPIRING_SOON_DAYS};
pub use shopping::{reasons, ShoppingEntry};
pub use state::{
    decode_inventory_entries, decode_measurement_mode, decode_shopping_entries,
    decode_string_list, default_essential_names, ensure_unique_ids, AppliedFields,
    MeasurementMode, PersistedAppState,
};
pub use validation::{
    comparison_key, normalize_ingredient_name, validate_ingredient_name,
    INGREDIENT_NAME_MAX_LENGTH,
};
