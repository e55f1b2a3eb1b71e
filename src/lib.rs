//! # sqlgate - HTTP gateway to an embedded SQLite store
//!
//! sqlgate provides:
//! - A pass-through SQL gateway: read statements return rows, everything else returns
//!   a mutation summary
//! - A transport-neutral encoding of dynamically typed row values
//! - Schema introspection assembled from the engine's catalog (tables, columns,
//!   primary keys, foreign keys)
//! - A lifecycle manager that can atomically close, discard and reopen the store

pub mod storage;
pub mod query;
pub mod introspect;
pub mod server;
pub mod config;
pub mod ui;

// Re-exports for convenient access
pub use storage::{Database, SqliteStore, StoreOptions};
pub use query::{QueryEngine, QueryResult, Row, RowValue};
pub use introspect::{Column, Schema, SchemaInspector, Table};

use std::path::PathBuf;

/// Result type alias for sqlgate operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for sqlgate operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A row-producing statement failed
    #[error("Query error: {0}")]
    Query(#[source] rusqlite::Error),

    /// A mutation statement failed
    #[error("Exec error: {0}")]
    Exec(#[source] rusqlite::Error),

    /// A catalog, column or foreign-key listing failed
    #[error("Introspection error on '{table}': {source}")]
    Introspection {
        table: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Failed to open database at '{path}': {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Failed to close database: {0}")]
    Close(#[source] rusqlite::Error),

    #[error("Failed to delete database: {0}")]
    Delete(#[source] std::io::Error),

    /// The store handle is not open; the caller may retry
    #[error("Database unavailable: {0}")]
    Unavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether a retry of the same request could succeed without any other change
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Unavailable(_))
    }
}
