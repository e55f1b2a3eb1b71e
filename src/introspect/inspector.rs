//! Catalog-driven schema assembly
//!
//! For each user table two introspection calls are issued against the same handle:
//! the column listing builds the `Column`s, then the foreign-key listing annotates them.
//! Table names come from the catalog enumeration and are bound as parameters.

use rusqlite::Connection;
use tracing::{debug, warn};
use crate::{Result, Error};
use crate::storage::SqliteStore;
use crate::storage::catalog;
use super::model::{Column, Schema, Table};

/// Column a foreign key falls back to when the parent declares no primary key
const IMPLICIT_ROWID: &str = "rowid";

/// One row of the foreign-key listing
#[derive(Debug)]
struct ForeignKeyRef {
    seq: i64,
    target_table: String,
    from: String,
    to: Option<String>,
}

/// Schema introspection over a borrowed store handle
pub struct SchemaInspector<'a> {
    store: &'a SqliteStore,
}

impl<'a> SchemaInspector<'a> {
    pub fn new(store: &'a SqliteStore) -> Self {
        Self { store }
    }

    /// Assemble the full schema, tables in catalog order.
    ///
    /// Any enumeration or column failure aborts the whole call.
    pub fn schema(&self) -> Result<Schema> {
        let tables = self
            .table_names()?
            .into_iter()
            .map(|name| self.table(name))
            .collect::<Result<Vec<_>>>()?;

        Ok(Schema { tables })
    }

    /// User table names, engine-internal tables excluded
    pub fn table_names(&self) -> Result<Vec<String>> {
        let fail = |source| Error::Introspection {
            table: "sqlite_master".to_string(),
            source,
        };

        let mut stmt = self.conn().prepare(catalog::LIST_TABLES).map_err(fail)?;
        let names = stmt
            .query_map([], |row| row.get(0))
            .map_err(fail)?
            .collect::<rusqlite::Result<Vec<String>>>()
            .map_err(fail)?;

        Ok(names)
    }

    /// Build one table. The name must come from [`Self::table_names`].
    pub fn table(&self, name: String) -> Result<Table> {
        let columns = self.columns(&name)?;
        debug!("Introspected table {} ({} columns)", name, columns.len());
        Ok(Table { name, columns })
    }

    /// Columns of `table` in declaration order, annotated with their foreign keys
    pub fn columns(&self, table: &str) -> Result<Vec<Column>> {
        let mut columns = self.column_pass(table)?;
        self.foreign_key_pass(table, &mut columns)?;
        Ok(columns)
    }

    fn column_pass(&self, table: &str) -> Result<Vec<Column>> {
        let fail = |source| Error::Introspection {
            table: table.to_string(),
            source,
        };

        let mut stmt = self.conn().prepare_cached(catalog::TABLE_INFO).map_err(fail)?;
        let columns = stmt
            .query_map([table], |row| {
                let name: String = row.get(1)?;
                let column_type: Option<String> = row.get(2)?;
                let pk: i64 = row.get(5)?;
                Ok(Column::new(name, column_type.unwrap_or_default(), pk > 0))
            })
            .map_err(fail)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(fail)?;

        Ok(columns)
    }

    /// Annotate `columns` from the foreign-key listing.
    ///
    /// If the listing itself cannot run, the columns are left unannotated. A failure
    /// while reading a listed key is fatal. Composite keys annotate each member column
    /// on its own; the first key naming a column wins.
    fn foreign_key_pass(&self, table: &str, columns: &mut [Column]) -> Result<()> {
        self.foreign_key_pass_with(table, columns, catalog::FOREIGN_KEY_LIST)
    }

    /// [`Self::foreign_key_pass`] over a given listing statement, bound to the table name
    pub(crate) fn foreign_key_pass_with(&self, table: &str, columns: &mut [Column], listing: &str) -> Result<()> {
        let Some(keys) = self.foreign_keys(table, listing)? else {
            return Ok(());
        };

        for key in keys {
            let Some(column) = columns.iter_mut().find(|c| c.name == key.from) else {
                continue;
            };
            if column.foreign_key {
                continue;
            }

            let target_column = match key.to {
                Some(to) => to,
                None => self.implicit_target(&key.target_table, key.seq)?,
            };
            column.mark_foreign_key(&key.target_table, &target_column);
        }

        Ok(())
    }

    /// `Ok(None)` when the engine refuses the listing for this table
    fn foreign_keys(&self, table: &str, listing: &str) -> Result<Option<Vec<ForeignKeyRef>>> {
        let conn = self.conn();
        let mut stmt = match conn.prepare_cached(listing) {
            Ok(stmt) => stmt,
            Err(e) => {
                warn!("Error querying foreign keys for {}: {}", table, e);
                return Ok(None);
            }
        };
        let mut rows = match stmt.query([table]) {
            Ok(rows) => rows,
            Err(e) => {
                warn!("Error querying foreign keys for {}: {}", table, e);
                return Ok(None);
            }
        };

        let fail = |source| Error::Introspection {
            table: table.to_string(),
            source,
        };

        let mut keys = Vec::new();
        while let Some(row) = rows.next().map_err(fail)? {
            keys.push(ForeignKeyRef {
                seq: row.get(1).map_err(fail)?,
                target_table: row.get(2).map_err(fail)?,
                from: row.get(3).map_err(fail)?,
                to: row.get(4).map_err(fail)?,
            });
        }

        Ok(Some(keys))
    }

    /// Target column of a key that names only the parent table: the parent's primary-key
    /// column at the same position, or `rowid` when it has none.
    fn implicit_target(&self, parent: &str, seq: i64) -> Result<String> {
        let fail = |source| Error::Introspection {
            table: parent.to_string(),
            source,
        };

        let mut stmt = self.conn().prepare_cached(catalog::PRIMARY_KEY_COLUMNS).map_err(fail)?;
        let pk_columns = stmt
            .query_map([parent], |row| row.get::<_, String>(0))
            .map_err(fail)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(fail)?;

        Ok(usize::try_from(seq)
            .ok()
            .and_then(|idx| pk_columns.into_iter().nth(idx))
            .unwrap_or_else(|| IMPLICIT_ROWID.to_string()))
    }

    fn conn(&self) -> &'a Connection {
        self.store.connection()
    }
}
