//! Our Fridge engine
//!
//! Local-first household fridge state with optional remote backup.
//!
//! Layered architecture:
//! - domain: Core entities, catalogs and validation rules
//! - repository: Key-value storage, identity-scoped keys and the remote gateway
//! - sync: Debounced, single-flight remote pushes
//! - engine: Ingredient matching, recipe ranking and notices
//! - session: The in-memory state every operation goes through
//! - commands: Request handlers for clients

pub mod collaborators;
pub mod commands;
pub mod config;
pub mod domain;
pub mod engine;
pub mod repository;
pub mod session;
pub mod sync;
