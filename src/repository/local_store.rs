//! Local State Store
//!
//! Typed read/write of state slices over a `KeyValueStore`. Reads never
//! fail: a missing key, broken JSON or a decode error all yield the fallback.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::keys::{Slice, StorageKeys};
use super::traits::KeyValueStore;
use crate::domain::{
    decode_inventory_entries, decode_measurement_mode, decode_shopping_entries,
    decode_string_list, default_essential_names, quick_item_names, sanitize_quick_add_names,
    DomainResult, PersistedAppState,
};

pub struct LocalStateStore {
    storage: Box<dyn KeyValueStore>,
}

impl LocalStateStore {
    pub fn new(storage: impl KeyValueStore + 'static) -> Self {
        Self {
            storage: Box::new(storage),
        }
    }

    pub fn storage(&self) -> &dyn KeyValueStore {
        self.storage.as_ref()
    }

    /// Parsed JSON under `key`, or `None` if absent or unreadable
    pub fn read_value(&self, key: &str) -> Option<Value> {
        let raw = match self.storage.get(key) {
            Ok(Some(raw)) if !raw.is_empty() => raw,
            Ok(_) => return None,
            Err(e) => {
                log::warn!("read({}) failed: {}", key, e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("read({}) has malformed JSON: {}", key, e);
                None
            }
        }
    }

    /// Decoded value under `key`, or `fallback`
    pub fn read<T: DeserializeOwned>(&self, key: &str, fallback: T) -> T {
        let Some(value) = self.read_value(key) else {
            return fallback;
        };
        match serde_json::from_value(value) {
            Ok(decoded) => decoded,
            Err(e) => {
                log::warn!("read({}) could not be decoded: {}", key, e);
                fallback
            }
        }
    }

    pub fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> DomainResult<()> {
        let raw = serde_json::to_string(value)?;
        self.storage.set(key, &raw)
    }

    /// Hydrate every slice of the state, each with its own fallback
    pub fn load_state(&self, keys: &StorageKeys) -> PersistedAppState {
        let inventory_entries = self
            .read_value(keys.key(Slice::Inventory))
            .and_then(|v| decode_inventory_entries(&v))
            .unwrap_or_default();

        let shopping_entries = self
            .read_value(keys.key(Slice::Shopping))
            .and_then(|v| decode_shopping_entries(&v))
            .unwrap_or_default();

        let essential_names = self
            .read_value(keys.key(Slice::Essentials))
            .and_then(|v| decode_string_list(&v))
            .unwrap_or_else(default_essential_names);

        let measurement_mode = self
            .read_value(keys.key(Slice::Mode))
            .and_then(|v| decode_measurement_mode(&v))
            .unwrap_or_default();

        let quick_add_enabled_names = sanitize_quick_add_names(
            self.read_value(keys.key(Slice::QuickAdd))
                .and_then(|v| decode_string_list(&v))
                .unwrap_or_else(quick_item_names),
        );

        PersistedAppState {
            inventory_entries,
            shopping_entries,
            essential_names,
            measurement_mode,
            quick_add_enabled_names,
        }
    }

    /// Serialize one slice of `state` to its key
    pub fn write_slice(&self, keys: &StorageKeys, slice: Slice, state: &PersistedAppState) -> DomainResult<()> {
        let key = keys.key(slice);
        match slice {
            Slice::Inventory => self.write(key, &state.inventory_entries),
            Slice::Shopping => self.write(key, &state.shopping_entries),
            Slice::Essentials => self.write(key, &state.essential_names),
            Slice::Mode => self.write(key, &state.measurement_mode),
            Slice::QuickAdd => self.write(key, &state.quick_add_enabled_names),
        }
    }
}
