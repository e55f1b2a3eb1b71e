//! Process-wide store handle and its reset lifecycle.
//!
//! Every operation, including `reset`, runs while holding the same guard, so no caller can
//! observe a handle that is half closed or half reopened. The guard is taken with
//! `blocking_lock`, so these methods must be called from a blocking context
//! (a plain thread or `tokio::task::spawn_blocking`), never from inside an async task.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{info, warn};
use crate::{Result, Error};
use super::sqlite::{SqliteStore, StoreOptions};

/// Owner of the single store handle
pub struct Database {
    path: PathBuf,
    options: StoreOptions,
    /// `None` only after a reset whose reopen step failed
    handle: Mutex<Option<SqliteStore>>,
}

impl Database {
    /// Open the backing file and take ownership of the handle
    pub fn open(path: impl Into<PathBuf>, options: StoreOptions) -> Result<Self> {
        let path = path.into();
        let store = SqliteStore::open(&path, &options)?;
        Ok(Self {
            path,
            options,
            handle: Mutex::new(Some(store)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn options(&self) -> StoreOptions {
        self.options
    }

    /// Run one operation against the live handle.
    ///
    /// The store is borrowed only for the duration of `f`. Fails with
    /// [`Error::Unavailable`] when there is no open handle.
    pub fn with_store<T>(&self, f: impl FnOnce(&SqliteStore) -> Result<T>) -> Result<T> {
        let guard = self.handle.blocking_lock();
        match guard.as_ref() {
            Some(store) => f(store),
            None => Err(Error::Unavailable(format!(
                "no open handle for {}; reset the database to reopen it",
                self.path.display()
            ))),
        }
    }

    /// Close the handle, delete the backing file and reopen an empty store.
    ///
    /// A close failure leaves the old handle in place. A delete or reopen failure leaves
    /// no handle; later calls fail with [`Error::Unavailable`] until a reset succeeds.
    pub fn reset(&self) -> Result<()> {
        let mut guard = self.handle.blocking_lock();

        if let Some(store) = guard.take() {
            if let Err((store, e)) = store.close() {
                *guard = Some(store);
                return Err(e);
            }
        }

        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("Database file {} already absent during reset", self.path.display());
            }
            Err(e) => return Err(Error::Delete(e)),
        }

        *guard = Some(SqliteStore::open(&self.path, &self.options)?);
        info!("Database {} reset", self.path.display());
        Ok(())
    }
}
