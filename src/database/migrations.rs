//! Schema migrations for the pagekeep SQLite database.
//!
//! Uses a `schema_version` table to track which migrations have been applied.
//! Each migration runs exactly once and is recorded with a timestamp.

use rusqlite::Connection;

use crate::database::record::RecordFamily;
use crate::types::errors::StoreError;

/// Current schema version. Bump this when adding a new migration.
pub const CURRENT_SCHEMA_VERSION: i32 = 2;

/// Returns the current schema version from the database (0 if table doesn't exist).
pub fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .unwrap_or(0)
}

/// Runs all pending schema migrations against the provided connection.
///
/// Safe to call on every startup. A database already at a newer version than
/// [`CURRENT_SCHEMA_VERSION`] is refused rather than silently downgraded.
pub fn run_all(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         CREATE TABLE IF NOT EXISTS schema_version (
             version INTEGER PRIMARY KEY,
             applied_at INTEGER NOT NULL,
             description TEXT NOT NULL
         );",
    )
    .map_err(|e| StoreError::MigrationFailed(e.to_string()))?;

    let current = get_schema_version(conn);
    if current > CURRENT_SCHEMA_VERSION {
        return Err(StoreError::VersionMismatch {
            found: current,
            supported: CURRENT_SCHEMA_VERSION,
        });
    }

    if current < 1 {
        migration_v1(conn).map_err(|e| StoreError::MigrationFailed(format!("v1: {}", e)))?;
        record_version(conn, 1, "Document tables for boosts, collections, notes, reading list")?;
        tracing::info!("store schema migrated to v1");
    }

    if current < 2 {
        migration_v2(conn).map_err(|e| StoreError::MigrationFailed(format!("v2: {}", e)))?;
        record_version(conn, 2, "Secondary indexes on notes, reading list, boosts")?;
        tracing::info!("store schema migrated to v2");
    }

    Ok(())
}

fn record_version(conn: &Connection, version: i32, description: &str) -> Result<(), StoreError> {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version, applied_at, description) VALUES (?1, ?2, ?3)",
        rusqlite::params![version, now, description],
    )
    .map_err(|e| StoreError::MigrationFailed(e.to_string()))?;
    Ok(())
}

/// V1: one document table per entity family, keyed by the record id.
fn migration_v1(conn: &Connection) -> Result<(), rusqlite::Error> {
    for family in RecordFamily::ALL {
        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                 id TEXT PRIMARY KEY,
                 data TEXT NOT NULL,
                 stored_at INTEGER NOT NULL
             );",
            table = family.table()
        ))?;
    }
    Ok(())
}

/// V2: generated columns over the JSON documents, indexed for lookups.
fn migration_v2(conn: &Connection) -> Result<(), rusqlite::Error> {
    const COLUMNS: [(RecordFamily, &str, &str); 5] = [
        (RecordFamily::Notes, "url", "json_extract(data, '$.url')"),
        (RecordFamily::Notes, "collection_id", "json_extract(data, '$.collectionId')"),
        (RecordFamily::ReadingList, "url", "json_extract(data, '$.url')"),
        (RecordFamily::ReadingList, "is_read", "json_extract(data, '$.isRead')"),
        (RecordFamily::Boosts, "enabled", "json_extract(data, '$.enabled')"),
    ];

    for (family, column, expr) in COLUMNS {
        let table = family.table();
        // Older files may already carry the column.
        if conn
            .prepare(&format!("SELECT {column} FROM {table} LIMIT 0"))
            .is_err()
        {
            conn.execute_batch(&format!(
                "ALTER TABLE {table} ADD COLUMN {column} GENERATED ALWAYS AS ({expr}) VIRTUAL;"
            ))?;
        }
        conn.execute_batch(&format!(
            "CREATE INDEX IF NOT EXISTS idx_{table}_{column} ON {table}({column});"
        ))?;
    }
    Ok(())
}
