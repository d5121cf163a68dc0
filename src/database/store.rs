//! Shared store handle with in-memory fallback.
//!
//! Engines receive a [`Store`] instead of a `Database`. When the database
//! could not be opened, the handle is *degraded*: writes succeed without
//! being persisted and reads come back empty, so every engine keeps working
//! from its in-memory index for the rest of the session. Callers can check
//! [`Store::is_degraded`] to surface the lost durability.

use std::path::Path;
use std::sync::Arc;

use rusqlite::ToSql;

use super::connection::Database;
use super::record::StoredRecord;
use crate::types::errors::StoreError;

#[derive(Clone)]
pub struct Store {
    db: Option<Arc<Database>>,
    degraded_reason: Option<String>,
}

impl Store {
    /// Opens the database at `path`, degrading to memory-only on failure.
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        match Database::open(path.as_ref()) {
            Ok(db) => Self::from_database(Arc::new(db)),
            Err(e) => {
                tracing::warn!(path = %path.as_ref().display(), error = %e, "store unavailable, running in memory only");
                Self::memory_only(e.to_string())
            }
        }
    }

    /// Opens a named database in the platform data directory, degrading on failure.
    pub fn open_named(name: &str) -> Self {
        match Database::named_path(name) {
            Ok(path) => Self::open(path),
            Err(e) => {
                tracing::warn!(db_name = name, error = %e, "store unavailable, running in memory only");
                Self::memory_only(e.to_string())
            }
        }
    }

    /// Durable store over a fresh in-memory SQLite database.
    pub fn open_in_memory() -> Self {
        match Database::open_in_memory() {
            Ok(db) => Self::from_database(Arc::new(db)),
            Err(e) => Self::memory_only(e.to_string()),
        }
    }

    pub fn from_database(db: Arc<Database>) -> Self {
        Self {
            db: Some(db),
            degraded_reason: None,
        }
    }

    /// A handle with no backing database.
    pub fn memory_only(reason: impl Into<String>) -> Self {
        Self {
            db: None,
            degraded_reason: Some(reason.into()),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.db.is_none()
    }

    pub fn degraded_reason(&self) -> Option<&str> {
        self.degraded_reason.as_deref()
    }

    pub fn database(&self) -> Option<&Arc<Database>> {
        self.db.as_ref()
    }

    pub fn put<T: StoredRecord>(&self, record: &T) -> Result<(), StoreError> {
        match &self.db {
            Some(db) => db.put(record),
            None => Ok(()),
        }
    }

    pub fn put_all<T: StoredRecord>(&self, records: &[T]) -> Result<(), StoreError> {
        match &self.db {
            Some(db) => db.put_all(records),
            None => Ok(()),
        }
    }

    pub fn get_all<T: StoredRecord>(&self) -> Result<Vec<T>, StoreError> {
        match &self.db {
            Some(db) => db.get_all(),
            None => Ok(Vec::new()),
        }
    }

    pub fn delete<T: StoredRecord>(&self, id: &str) -> Result<bool, StoreError> {
        match &self.db {
            Some(db) => db.delete::<T>(id),
            None => Ok(false),
        }
    }

    pub fn find_by_index<T: StoredRecord>(
        &self,
        column: &str,
        value: &dyn ToSql,
    ) -> Result<Vec<T>, StoreError> {
        match &self.db {
            Some(db) => db.find_by_index(column, value),
            None => Ok(Vec::new()),
        }
    }

    /// Loads a whole family, logging and returning nothing on failure.
    ///
    /// Engines call this once at construction; a corrupt table must not
    /// prevent the engine from starting.
    pub fn load_or_empty<T: StoredRecord>(&self) -> Vec<T> {
        self.get_all().unwrap_or_else(|e| {
            tracing::warn!(table = T::FAMILY.table(), error = %e, "failed to load records");
            Vec::new()
        })
    }
}
