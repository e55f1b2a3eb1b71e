//! Catalog introspection statements

/// Enumerate user tables in catalog order, skipping engine-internal ones
pub const LIST_TABLES: &str =
    "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'";

/// Columns of one table in declaration order: cid, name, type, notnull, dflt_value, pk.
///
/// The table name is bound as `?1` rather than spliced into the text.
pub const TABLE_INFO: &str =
    r#"SELECT cid, name, type, "notnull", dflt_value, pk FROM pragma_table_info(?1) ORDER BY cid"#;

/// Declared foreign keys of one table: id, seq, table, from, to.
///
/// `to` is NULL when the key targets the parent's implicit primary key.
pub const FOREIGN_KEY_LIST: &str =
    r#"SELECT id, seq, "table", "from", "to" FROM pragma_foreign_key_list(?1)"#;

/// Primary-key columns of one table, ordered by their position within the key
pub const PRIMARY_KEY_COLUMNS: &str =
    "SELECT name FROM pragma_table_info(?1) WHERE pk > 0 ORDER BY pk";

/// Running count of rows changed since the connection was opened
pub const TOTAL_CHANGES: &str = "SELECT total_changes()";
