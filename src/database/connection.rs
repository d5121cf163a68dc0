//! SQLite database connection management for pagekeep.
//!
//! Provides the [`Database`] struct that wraps a `rusqlite::Connection`,
//! runs schema migrations on open, and reads/writes records of every
//! [`RecordFamily`] as JSON documents.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension, ToSql};

use super::codec;
use super::migrations;
use super::record::StoredRecord;
use crate::types::errors::StoreError;

/// Core database wrapper providing SQLite connection management.
///
/// The connection sits behind a `Mutex` so one `Arc<Database>` can be shared
/// by every engine.
pub struct Database {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl Database {
    /// Opens (or creates) a SQLite database at the given file path and runs migrations.
    ///
    /// # Errors
    /// Returns `StoreError::OpenFailed` if the file cannot be opened, or the
    /// migration error if the schema cannot be brought up to date.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| StoreError::OpenFailed(format!("{}: {}", parent.display(), e)))?;
            }
        }
        let conn = Connection::open(path)
            .map_err(|e| StoreError::OpenFailed(format!("{}: {}", path.display(), e)))?;
        migrations::run_all(&conn)?;
        tracing::info!(path = %path.display(), "store opened");
        Ok(Self {
            conn: Mutex::new(conn),
            path: Some(path.to_path_buf()),
        })
    }

    /// Opens a database by name in the platform data directory,
    /// `<data dir>/pagekeep/<name>.db`.
    pub fn open_named(name: &str) -> Result<Self, StoreError> {
        Self::open(Self::named_path(name)?)
    }

    /// Resolves the on-disk location used by [`Database::open_named`].
    pub fn named_path(name: &str) -> Result<PathBuf, StoreError> {
        if name.is_empty() || name.contains(['/', '\\']) {
            return Err(StoreError::OpenFailed(format!("invalid database name '{}'", name)));
        }
        let data_dir = dirs::data_dir()
            .ok_or_else(|| StoreError::OpenFailed("could not find data directory".to_string()))?;
        Ok(data_dir.join("pagekeep").join(format!("{}.db", name)))
    }

    /// Opens an in-memory SQLite database and runs migrations.
    ///
    /// Useful for testing: the database is discarded when the `Database` is dropped.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(|e| StoreError::OpenFailed(e.to_string()))?;
        migrations::run_all(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path: None,
        })
    }

    /// Locks and returns the underlying `rusqlite::Connection`.
    pub fn connection(&self) -> MutexGuard<'_, Connection> {
        // A panic while holding the lock leaves SQLite itself consistent.
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// File backing this database, `None` for in-memory databases.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn schema_version(&self) -> i32 {
        migrations::get_schema_version(&self.connection())
    }

    /// Inserts or replaces a record by id. Existing rows keep their rowid,
    /// so [`Database::get_all`] keeps returning records in insertion order.
    pub fn put<T: StoredRecord>(&self, record: &T) -> Result<(), StoreError> {
        let data = codec::encode(record)?;
        let now = codec::now().timestamp_millis();
        let sql = format!(
            "INSERT INTO {} (id, data, stored_at) VALUES (?1, ?2, ?3) \
             ON CONFLICT(id) DO UPDATE SET data = excluded.data, stored_at = excluded.stored_at",
            T::FAMILY.table()
        );
        self.connection()
            .execute(&sql, params![record.record_id(), data, now])?;
        Ok(())
    }

    /// Writes several records in one transaction.
    pub fn put_all<T: StoredRecord>(&self, records: &[T]) -> Result<(), StoreError> {
        let mut conn = self.connection();
        let tx = conn.transaction()?;
        {
            let sql = format!(
                "INSERT INTO {} (id, data, stored_at) VALUES (?1, ?2, ?3) \
                 ON CONFLICT(id) DO UPDATE SET data = excluded.data, stored_at = excluded.stored_at",
                T::FAMILY.table()
            );
            let mut stmt = tx.prepare(&sql)?;
            let now = codec::now().timestamp_millis();
            for record in records {
                stmt.execute(params![record.record_id(), codec::encode(record)?, now])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    pub fn get<T: StoredRecord>(&self, id: &str) -> Result<Option<T>, StoreError> {
        let sql = format!("SELECT data FROM {} WHERE id = ?1", T::FAMILY.table());
        let data: Option<String> = self
            .connection()
            .query_row(&sql, params![id], |row| row.get(0))
            .optional()?;
        data.map(|d| codec::decode(&d)).transpose()
    }

    /// Returns every record of the family in insertion order.
    pub fn get_all<T: StoredRecord>(&self) -> Result<Vec<T>, StoreError> {
        let sql = format!("SELECT data FROM {} ORDER BY rowid", T::FAMILY.table());
        self.query_documents(&sql, &[])
    }

    /// Removes a record. Returns `false` if nothing was stored under `id`.
    pub fn delete<T: StoredRecord>(&self, id: &str) -> Result<bool, StoreError> {
        let sql = format!("DELETE FROM {} WHERE id = ?1", T::FAMILY.table());
        let affected = self.connection().execute(&sql, params![id])?;
        Ok(affected > 0)
    }

    /// Looks records up through one of the family's secondary indexes.
    pub fn find_by_index<T: StoredRecord>(
        &self,
        column: &str,
        value: &dyn ToSql,
    ) -> Result<Vec<T>, StoreError> {
        if !T::FAMILY.has_index(column) {
            return Err(StoreError::Query(format!(
                "no index '{}' on {}",
                column,
                T::FAMILY.table()
            )));
        }
        let sql = format!(
            "SELECT data FROM {} WHERE {} = ?1 ORDER BY rowid",
            T::FAMILY.table(),
            column
        );
        self.query_documents(&sql, &[value])
    }

    pub fn count<T: StoredRecord>(&self) -> Result<usize, StoreError> {
        let sql = format!("SELECT COUNT(*) FROM {}", T::FAMILY.table());
        let count: i64 = self.connection().query_row(&sql, [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn query_documents<T: StoredRecord>(
        &self,
        sql: &str,
        values: &[&dyn ToSql],
    ) -> Result<Vec<T>, StoreError> {
        let conn = self.connection();
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(values, |row| row.get::<_, String>(0))?;

        let mut results = Vec::new();
        for row in rows {
            results.push(codec::decode(&row?)?);
        }
        Ok(results)
    }
}
