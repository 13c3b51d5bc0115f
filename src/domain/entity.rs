//! Domain Layer - Core Entity Trait
//!
//! Basic contract for persisted entries plus the shared error type.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Core trait for list entries that carry a stable identifier
pub trait Entity: Sized + Send + Sync + Clone {
    /// Prefix used when minting identifiers (`fridge-…`, `shopping-…`)
    const ID_PREFIX: &'static str;

    /// Returns the entry's identifier
    fn id(&self) -> &str;

    /// Display name of the entry
    fn name(&self) -> &str;

    /// Replace the identifier (used when re-keying on load)
    fn set_id(&mut self, id: String);
}

/// Common result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level errors
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum DomainError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Decode error: {0}")]
    Decode(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<rusqlite::Error> for DomainError {
    fn from(e: rusqlite::Error) -> Self {
        DomainError::Storage(e.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(e: serde_json::Error) -> Self {
        DomainError::Decode(e.to_string())
    }
}

impl From<std::io::Error> for DomainError {
    fn from(e: std::io::Error) -> Self {
        DomainError::Storage(e.to_string())
    }
}

/// Mint a fresh identifier for a newly created entry.
pub fn new_entry_id<T: Entity>() -> String {
    format!("{}-{}", T::ID_PREFIX, uuid::Uuid::new_v4().simple())
}
