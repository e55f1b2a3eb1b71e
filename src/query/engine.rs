//! Query engine implementation
//!
//! Classifies SQL text by its leading keyword and runs every statement in it:
//! - Read (`SELECT ...`): rows of the last statement, each encoded through `encoder`
//! - Write (anything else): each statement stepped to completion, reported as an affected-row count
//!
//! No grammar analysis happens here; the engine reports whatever is wrong with the text.

use rusqlite::{Batch, Connection};
use serde::Serialize;
use tracing::debug;
use crate::{Result, Error};
use crate::storage::SqliteStore;
use crate::storage::catalog;
use super::encoder::{encode_value, Row};

pub const EXEC_SUCCESS_MESSAGE: &str = "Query executed successfully";

/// How a statement is dispatched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Read,
    Write,
}

/// Classify a statement by its leading keyword.
///
/// Only `SELECT` (any case, surrounding whitespace ignored) is a read.
pub fn classify(sql: &str) -> StatementKind {
    let sql = sql.trim();
    let end = sql
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(sql.len());
    if sql[..end].eq_ignore_ascii_case("SELECT") {
        StatementKind::Read
    } else {
        StatementKind::Write
    }
}

/// Outcome of a write statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecSummary {
    pub message: String,
    pub rows_affected: i64,
}

impl ExecSummary {
    pub fn new(rows_affected: i64) -> Self {
        Self {
            message: EXEC_SUCCESS_MESSAGE.to_string(),
            rows_affected,
        }
    }
}

/// Result of one gateway call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QueryResult {
    Rows(Vec<Row>),
    Exec(ExecSummary),
}

/// Gateway over a borrowed store handle
pub struct QueryEngine<'a> {
    store: &'a SqliteStore,
}

impl<'a> QueryEngine<'a> {
    /// Create a new query engine
    pub fn new(store: &'a SqliteStore) -> Self {
        Self { store }
    }

    /// Classify and run one statement or a `;`-separated script
    pub fn execute(&self, sql: &str) -> Result<QueryResult> {
        let sql = sql.trim();
        let kind = classify(sql);
        debug!("Executing {:?} statement", kind);

        match kind {
            StatementKind::Read => self.query_rows(sql).map(QueryResult::Rows),
            StatementKind::Write => self.execute_write(sql).map(QueryResult::Exec),
        }
    }

    /// Read path: every row of the result set, in engine order.
    ///
    /// Leading statements of a script run to completion; the rows come from the last one.
    pub fn query_rows(&self, sql: &str) -> Result<Vec<Row>> {
        let mut batch = Batch::new(self.conn(), sql);
        let mut results = Vec::new();

        while let Some(mut stmt) = batch.next().map_err(Error::Query)? {
            let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

            results.clear();
            let mut rows = stmt.query([]).map_err(Error::Query)?;
            while let Some(row) = rows.next().map_err(Error::Query)? {
                let mut encoded = Row::with_capacity(columns.len());
                for (idx, name) in columns.iter().enumerate() {
                    let value = row.get_ref(idx).map_err(Error::Query)?;
                    encoded.insert(name.as_str(), encode_value(value));
                }
                results.push(encoded);
            }
        }

        Ok(results)
    }

    /// Write path: run every statement to completion and report the affected-row count
    /// of the last one that changed rows.
    ///
    /// Statements that change no rows (DDL, pragmas) leave the count alone rather than
    /// picking up one left over from an earlier call. Text with no statements reports 0.
    pub fn execute_write(&self, sql: &str) -> Result<ExecSummary> {
        let conn = self.conn();
        let mut batch = Batch::new(conn, sql);
        let mut rows_affected = 0;

        while let Some(mut stmt) = batch.next().map_err(Error::Exec)? {
            let before = total_changes(conn).map_err(Error::Exec)?;
            {
                let mut rows = stmt.query([]).map_err(Error::Exec)?;
                while rows.next().map_err(Error::Exec)?.is_some() {}
            }
            let after = total_changes(conn).map_err(Error::Exec)?;

            if after != before {
                rows_affected = conn.changes() as i64;
            }
        }

        Ok(ExecSummary::new(rows_affected))
    }

    fn conn(&self) -> &'a Connection {
        self.store.connection()
    }
}

fn total_changes(conn: &Connection) -> rusqlite::Result<i64> {
    conn.query_row(catalog::TOTAL_CHANGES, [], |row| row.get(0))
}
