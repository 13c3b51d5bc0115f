//! Identity Key Resolution
//!
//! Maps an identity to its five namespaced slice keys
//! (`{prefix}:v2:{namespace}:{slice}`) and, the first time a signed-in user
//! is seen, claims data from the guest namespace or the old unscoped
//! `{prefix}:v1:{slice}` keys.

use serde::Serialize;

use super::traits::KeyValueStore;
use crate::domain::{DomainResult, Identity, GUEST_NAMESPACE};

pub const DEFAULT_KEY_PREFIX: &str = "our-fridge";
pub const SCHEMA_VERSION: &str = "v2";
pub const LEGACY_SCHEMA_VERSION: &str = "v1";

/// One independently stored fragment of the persisted state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Slice {
    Inventory,
    Shopping,
    Essentials,
    Mode,
    QuickAdd,
}

impl Slice {
    pub const ALL: [Slice; 5] = [
        Slice::Inventory,
        Slice::Shopping,
        Slice::Essentials,
        Slice::Mode,
        Slice::QuickAdd,
    ];

    /// Key suffix for this slice
    pub fn key_name(&self) -> &'static str {
        match self {
            Slice::Inventory => "fridge-items",
            Slice::Shopping => "shopping-list",
            Slice::Essentials => "essential-items",
            Slice::Mode => "measure-mode",
            Slice::QuickAdd => "quick-add-items",
        }
    }
}

/// Fully qualified storage keys for one namespace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    keys: [String; 5],
}

impl StorageKeys {
    fn build(base: &str) -> Self {
        Self {
            keys: Slice::ALL.map(|slice| format!("{}:{}", base, slice.key_name())),
        }
    }

    /// Keys for `namespace` under the current schema
    pub fn scoped(prefix: &str, namespace: &str) -> Self {
        Self::build(&format!("{}:{}:{}", prefix, SCHEMA_VERSION, namespace))
    }

    /// Keys from the first storage generation, which had no identity scoping
    pub fn legacy(prefix: &str) -> Self {
        Self::build(&format!("{}:{}", prefix, LEGACY_SCHEMA_VERSION))
    }

    pub fn key(&self, slice: Slice) -> &str {
        &self.keys[slice as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Slice, &str)> {
        Slice::ALL.into_iter().zip(self.keys.iter().map(String::as_str))
    }
}

/// Where the active namespace's data came from on this resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "slices", rename_all = "camelCase")]
pub enum MigrationOutcome {
    /// Guest sessions never migrate
    NotApplicable,
    /// The namespace already held data; nothing was touched
    AlreadyPresent,
    /// Slices copied from the guest namespace
    FromGuest(Vec<Slice>),
    /// Slices copied from the legacy unscoped keys
    FromLegacy(Vec<Slice>),
    /// No source held data; the namespace starts empty
    NothingToMigrate,
}

#[derive(Debug, Clone)]
pub struct Resolution {
    pub keys: StorageKeys,
    pub outcome: MigrationOutcome,
}

#[derive(Debug, Clone)]
pub struct IdentityKeyResolver {
    prefix: String,
}

impl Default for IdentityKeyResolver {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_PREFIX)
    }
}

impl IdentityKeyResolver {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Keys for an identity without any migration side effects
    pub fn keys_for(&self, identity: &Identity) -> StorageKeys {
        StorageKeys::scoped(&self.prefix, identity.namespace())
    }

    pub fn guest_keys(&self) -> StorageKeys {
        StorageKeys::scoped(&self.prefix, GUEST_NAMESPACE)
    }

    pub fn legacy_keys(&self) -> StorageKeys {
        StorageKeys::legacy(&self.prefix)
    }

    /// Resolve keys for `identity`, migrating older data into a user's empty
    /// namespace. Source keys are never modified.
    pub fn resolve(&self, identity: &Identity, storage: &dyn KeyValueStore) -> DomainResult<Resolution> {
        let keys = self.keys_for(identity);

        if identity.is_guest() {
            return Ok(Resolution {
                keys,
                outcome: MigrationOutcome::NotApplicable,
            });
        }

        let mut present = false;
        for (_, key) in keys.iter() {
            if storage.contains(key)? {
                present = true;
                break;
            }
        }
        if present {
            return Ok(Resolution {
                keys,
                outcome: MigrationOutcome::AlreadyPresent,
            });
        }

        let copied = copy_slices(storage, &self.guest_keys(), &keys)?;
        if !copied.is_empty() {
            log::info!(
                "claimed {} guest slice(s) for user namespace {}",
                copied.len(),
                identity.namespace()
            );
            return Ok(Resolution {
                keys,
                outcome: MigrationOutcome::FromGuest(copied),
            });
        }

        let copied = copy_slices(storage, &self.legacy_keys(), &keys)?;
        let outcome = if copied.is_empty() {
            MigrationOutcome::NothingToMigrate
        } else {
            log::info!(
                "migrated {} legacy slice(s) into user namespace {}",
                copied.len(),
                identity.namespace()
            );
            MigrationOutcome::FromLegacy(copied)
        };

        Ok(Resolution { keys, outcome })
    }
}

/// Copy every non-empty slice verbatim from `source` to `dest`.
fn copy_slices(
    storage: &dyn KeyValueStore,
    source: &StorageKeys,
    dest: &StorageKeys,
) -> DomainResult<Vec<Slice>> {
    let mut copied = Vec::new();
    for (slice, key) in source.iter() {
        match storage.get(key)? {
            Some(value) if !value.is_empty() => {
                storage.set(dest.key(slice), &value)?;
                copied.push(slice);
            }
            _ => {}
        }
    }
    Ok(copied)
}
