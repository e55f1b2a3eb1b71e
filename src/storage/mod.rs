//! Storage Layer - SQLite-backed store handle
//!
//! - `SqliteStore` wraps one connection to the backing file
//! - `Database` owns the process-wide handle and performs the reset lifecycle
//! - `catalog` holds the introspection statements issued against the engine

pub mod catalog;
pub mod lifecycle;
pub mod sqlite;

pub use lifecycle::Database;
pub use sqlite::{SqliteStore, StoreOptions};
