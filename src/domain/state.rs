//! Persisted Application State
//!
//! The aggregate that is migrated, stored locally slice by slice, and synced
//! remotely as one JSON document. Incoming documents (local slices, remote
//! payloads, imports) are decoded field by field: a malformed field falls
//! back without discarding the well-formed ones.

use std::collections::HashSet;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::catalog::{quick_item_names, sanitize_quick_add_names};
use super::entity::Entity;
use super::inventory::{InventoryEntry, RawInventoryEntry};
use super::shopping::{RawShoppingEntry, ShoppingEntry};

pub fn default_essential_names() -> Vec<String> {
    vec!["계란".to_string(), "우유".to_string(), "대파".to_string()]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementMode {
    #[default]
    Simple,
    Precise,
}

impl MeasurementMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeasurementMode::Simple => "simple",
            MeasurementMode::Precise => "precise",
        }
    }

    /// Only the two recognized spellings decode; anything else is `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "simple" => Some(MeasurementMode::Simple),
            "precise" => Some(MeasurementMode::Precise),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedAppState {
    pub inventory_entries: Vec<InventoryEntry>,
    pub shopping_entries: Vec<ShoppingEntry>,
    pub essential_names: Vec<String>,
    pub measurement_mode: MeasurementMode,
    pub quick_add_enabled_names: Vec<String>,
}

impl Default for PersistedAppState {
    fn default() -> Self {
        Self {
            inventory_entries: Vec::new(),
            shopping_entries: Vec::new(),
            essential_names: default_essential_names(),
            measurement_mode: MeasurementMode::Simple,
            quick_add_enabled_names: quick_item_names(),
        }
    }
}

/// Which fields of a document were applied by `apply_document`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedFields {
    pub inventory_entries: bool,
    pub shopping_entries: bool,
    pub essential_names: bool,
    pub measurement_mode: bool,
    pub quick_add_enabled_names: bool,
}

impl AppliedFields {
    pub fn any(&self) -> bool {
        self.inventory_entries
            || self.shopping_entries
            || self.essential_names
            || self.measurement_mode
            || self.quick_add_enabled_names
    }
}

/// Field names accepted for each slice. The first is the current spelling,
/// the rest come from older clients.
const INVENTORY_FIELDS: &[&str] = &["inventoryEntries", "fridgeItems"];
const SHOPPING_FIELDS: &[&str] = &["shoppingEntries", "shoppingList"];
const ESSENTIAL_FIELDS: &[&str] = &["essentialNames", "essentialItems"];
const MODE_FIELDS: &[&str] = &["measurementMode", "measureMode"];
const QUICK_ADD_FIELDS: &[&str] = &["quickAddEnabledNames", "quickAddEnabledItems"];

fn field<'a>(doc: &'a Value, names: &[&str]) -> Option<&'a Value> {
    names.iter().find_map(|name| doc.get(*name))
}

/// Decode an array element by element, skipping unusable records. Returns
/// `None` when the value is not an array, or when it held records and none
/// of them decoded, so a corrupted field never replaces good data.
fn decode_records<R, T>(value: &Value, label: &str, convert: fn(R) -> Option<T>) -> Option<Vec<T>>
where
    R: DeserializeOwned,
    T: Entity,
{
    let items = value.as_array()?;
    let entries: Vec<T> = items
        .iter()
        .filter_map(|item| serde_json::from_value::<R>(item.clone()).ok().and_then(convert))
        .collect();

    let dropped = items.len() - entries.len();
    if dropped > 0 {
        log::warn!("dropped {} malformed {} record(s) of {}", dropped, label, items.len());
    }
    if entries.is_empty() && !items.is_empty() {
        return None;
    }
    Some(ensure_unique_ids(entries))
}

pub fn decode_inventory_entries(value: &Value) -> Option<Vec<InventoryEntry>> {
    decode_records(value, "inventory", RawInventoryEntry::into_entry)
}

pub fn decode_shopping_entries(value: &Value) -> Option<Vec<ShoppingEntry>> {
    decode_records(value, "shopping", RawShoppingEntry::into_entry)
}

/// A string array, or `None` if any element is not a string.
pub fn decode_string_list(value: &Value) -> Option<Vec<String>> {
    serde_json::from_value::<Vec<String>>(value.clone()).ok()
}

pub fn decode_measurement_mode(value: &Value) -> Option<MeasurementMode> {
    value.as_str().and_then(MeasurementMode::parse)
}

/// Give every entry a unique identifier. Entries with an empty or already
/// seen identifier are re-keyed from a hash of their position, name and old
/// identifier, so the same input always yields the same output.
pub fn ensure_unique_ids<T: Entity>(entries: Vec<T>) -> Vec<T> {
    let seen: HashSet<String> = entries
        .iter()
        .map(|e| e.id().to_string())
        .filter(|id| !id.is_empty())
        .collect();
    let mut claimed: HashSet<String> = HashSet::with_capacity(entries.len());

    entries
        .into_iter()
        .enumerate()
        .map(|(index, mut entry)| {
            let id = entry.id().to_string();
            if !id.is_empty() && claimed.insert(id.clone()) {
                return entry;
            }

            let mut attempt = 0u32;
            let fresh = loop {
                let seed = format!("{}|{}|{}|{}|{}", T::ID_PREFIX, index, entry.name(), id, attempt);
                let hash = blake3::hash(seed.as_bytes()).to_hex();
                let candidate = format!("{}-{}", T::ID_PREFIX, &hash[..12]);
                if !seen.contains(&candidate) && !claimed.contains(&candidate) {
                    break candidate;
                }
                attempt += 1;
            };
            log::warn!("re-keyed {} entry {:?} -> {}", T::ID_PREFIX, id, fresh);
            claimed.insert(fresh.clone());
            entry.set_id(fresh);
            entry
        })
        .collect()
}

impl PersistedAppState {
    /// Overwrite every present, well-typed field of `doc`; absent or
    /// malformed fields leave the current value untouched.
    pub fn apply_document(&mut self, doc: &Value) -> AppliedFields {
        let mut applied = AppliedFields::default();

        if let Some(entries) = field(doc, INVENTORY_FIELDS).and_then(decode_inventory_entries) {
            self.inventory_entries = entries;
            applied.inventory_entries = true;
        }

        if let Some(entries) = field(doc, SHOPPING_FIELDS).and_then(decode_shopping_entries) {
            self.shopping_entries = entries;
            applied.shopping_entries = true;
        }

        if let Some(names) = field(doc, ESSENTIAL_FIELDS).and_then(decode_string_list) {
            self.essential_names = names;
            applied.essential_names = true;
        }

        if let Some(mode) = field(doc, MODE_FIELDS).and_then(decode_measurement_mode) {
            self.measurement_mode = mode;
            applied.measurement_mode = true;
        }

        if let Some(names) = field(doc, QUICK_ADD_FIELDS).and_then(decode_string_list) {
            self.quick_add_enabled_names = sanitize_quick_add_names(names);
            applied.quick_add_enabled_names = true;
        }

        applied
    }

    /// Serialize with an `exportedAt` stamp, pretty-printed for copying.
    pub fn to_export_document(&self, exported_at: chrono::DateTime<chrono::Utc>) -> serde_json::Result<String> {
        let mut doc = serde_json::to_value(self)?;
        if let Value::Object(map) = &mut doc {
            map.insert(
                "exportedAt".to_string(),
                Value::String(exported_at.to_rfc3339()),
            );
        }
        serde_json::to_string_pretty(&doc)
    }
}
