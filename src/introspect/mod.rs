//! Schema introspection
//!
//! Rebuilds the store's schema graph from live catalog calls on every request:
//! - `model`: the `Schema` / `Table` / `Column` types handed to callers
//! - `inspector`: the per-table column and foreign-key passes, and the assembly over all tables

pub mod inspector;
pub mod model;

pub use inspector::SchemaInspector;
pub use model::{Column, Schema, Table};
