//! Repository Layer - Core Traits
//!
//! Local storage is a synchronous string key-value store (the shape of
//! browser/device storage). The remote side is an async row store keyed by
//! user identity.

use async_trait::async_trait;
use serde_json::Value;

use super::remote::RemoteError;
use crate::domain::{DomainResult, PersistedAppState, UserIdentity};

/// On-device key-value storage
///
/// Implementations may fail on write (quota, disabled storage); callers
/// decide how loudly to report it.
pub trait KeyValueStore: Send {
    /// Raw value stored under `key`
    fn get(&self, key: &str) -> DomainResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> DomainResult<()>;

    /// Delete `key` if present
    fn remove(&self, key: &str) -> DomainResult<()>;

    fn contains(&self, key: &str) -> DomainResult<bool> {
        Ok(self.get(key)?.is_some())
    }
}

/// Remote copy of the persisted state, one row per user
#[async_trait]
pub trait RemoteStateGateway: Send + Sync {
    /// Fetch the stored payload. `Ok(None)` when the user has no row yet.
    async fn load(&self, user: &UserIdentity) -> Result<Option<Value>, RemoteError>;

    /// Upsert the full payload, replacing whatever the row held.
    async fn save(&self, user: &UserIdentity, state: &PersistedAppState) -> Result<(), RemoteError>;
}
