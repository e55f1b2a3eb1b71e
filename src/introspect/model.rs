//! Schema graph types

use serde::{Deserialize, Serialize};

/// One column of a user table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    /// Declared type as reported by the engine; empty when the column is untyped
    #[serde(rename = "type")]
    pub column_type: String,
    #[serde(rename = "pk")]
    pub primary_key: bool,
    #[serde(rename = "fk")]
    pub foreign_key: bool,
    /// `"table.column"` target; present iff `foreign_key`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references: Option<String>,
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: impl Into<String>, primary_key: bool) -> Self {
        Self {
            name: name.into(),
            column_type: column_type.into(),
            primary_key,
            foreign_key: false,
            references: None,
        }
    }

    /// Annotate as referencing `table.column`
    pub fn mark_foreign_key(&mut self, table: &str, column: &str) {
        self.foreign_key = true;
        self.references = Some(format!("{}.{}", table, column));
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    /// Engine declaration order
    pub columns: Vec<Column>,
}

impl Table {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn primary_key(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.primary_key)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// Catalog enumeration order
    pub tables: Vec<Table>,
}

impl Schema {
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
