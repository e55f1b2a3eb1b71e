//! SQLite storage implementation

use std::path::{Path, PathBuf};
use rusqlite::Connection;
use tracing::debug;
use crate::{Result, Error};

/// Options applied every time a connection is opened
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreOptions {
    /// Turn on `PRAGMA foreign_keys` so the engine enforces declared references
    pub enforce_foreign_keys: bool,
}

/// SQLite-backed store handle
pub struct SqliteStore {
    conn: Connection,
    path: Option<PathBuf>,
}

impl SqliteStore {
    /// Open a database file (creates it, and its directory, if they don't exist)
    pub fn open(path: &Path, options: &StoreOptions) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path).map_err(|source| Error::Open {
            path: path.to_owned(),
            source,
        })?;
        let store = Self { conn, path: Some(path.to_owned()) };
        store.configure(options)?;

        debug!("Opened database at {}", path.display());
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory(options: &StoreOptions) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn, path: None };
        store.configure(options)?;
        Ok(store)
    }

    fn configure(&self, options: &StoreOptions) -> Result<()> {
        if options.enforce_foreign_keys {
            self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        }
        Ok(())
    }

    /// Borrow the raw connection for the duration of one call
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Backing file, `None` for in-memory stores
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Close the connection.
    ///
    /// On failure the store is handed back still open, together with the error.
    pub fn close(self) -> std::result::Result<(), (Self, Error)> {
        let Self { conn, path } = self;
        match conn.close() {
            Ok(()) => {
                debug!("Closed database {:?}", path);
                Ok(())
            }
            Err((conn, e)) => Err((Self { conn, path }, Error::Close(e))),
        }
    }
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore").field("path", &self.path).finish()
    }
}
