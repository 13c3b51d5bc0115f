//! Repository Layer
//!
//! Storage abstractions and implementations: on-device key-value storage,
//! identity-scoped keys with their one-time migrations, typed slice access,
//! and the remote row gateway.

mod traits;
mod db;
mod keys;
mod local_store;
mod remote;

#[cfg(test)]
mod tests;

pub use traits::{KeyValueStore, RemoteStateGateway};
pub use db::{MemoryKeyValueStore, SqliteKeyValueStore};
pub use keys::{
    IdentityKeyResolver, MigrationOutcome, Resolution, Slice, StorageKeys, DEFAULT_KEY_PREFIX,
    LEGACY_SCHEMA_VERSION, SCHEMA_VERSION,
};
pub use local_store::LocalStateStore;
pub use remote::{
    classify_error, is_table_or_policy_error, MemoryGateway, RemoteError, SupabaseGateway,
    NO_ROW_ERROR_CODE,
};
