//! Unit tests for the pagekeep database layer (connection, migrations, store handle).

use pagekeep::database::migrations::CURRENT_SCHEMA_VERSION;
use pagekeep::database::{codec, Database, RecordFamily, Store};
use pagekeep::types::boost::Boost;
use pagekeep::types::errors::StoreError;
use pagekeep::types::note::BrowserNote;
use tempfile::TempDir;

fn boost(id: &str, name: &str) -> Boost {
    let now = codec::now();
    Boost {
        id: id.to_string(),
        name: name.to_string(),
        pattern: "example.com".to_string(),
        css: Some("body{}".to_string()),
        js: None,
        enabled: true,
        include_subdomains: true,
        created_at: now,
        updated_at: now,
        description: None,
        tags: vec![],
        use_count: 0,
    }
}

fn note(id: &str, url: Option<&str>) -> BrowserNote {
    let now = codec::now();
    BrowserNote {
        id: id.to_string(),
        title: format!("note {}", id),
        content: String::new(),
        url: url.map(str::to_string),
        screenshot: None,
        tags: vec![],
        pinned: false,
        created_at: now,
        updated_at: now,
        collection_id: None,
    }
}

#[test]
fn test_open_in_memory_succeeds() {
    assert!(Database::open_in_memory().is_ok());
}

#[test]
fn test_migrations_create_all_tables_and_indexes() {
    let db = Database::open_in_memory().expect("open_in_memory failed");
    let conn = db.connection();

    for family in RecordFamily::ALL {
        let exists: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name=?1",
                [family.table()],
                |row| row.get(0),
            )
            .unwrap_or(false);
        assert!(exists, "Table '{}' should exist after migrations", family.table());

        for column in family.indexed_columns() {
            let index = format!("idx_{}_{}", family.table(), column);
            let exists: bool = conn
                .query_row(
                    "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='index' AND name=?1",
                    [&index],
                    |row| row.get(0),
                )
                .unwrap_or(false);
            assert!(exists, "Index '{}' should exist after migrations", index);
        }
    }
}

#[test]
fn test_schema_version_is_current() {
    let db = Database::open_in_memory().unwrap();
    assert_eq!(db.schema_version(), CURRENT_SCHEMA_VERSION);
}

#[test]
fn test_reopen_is_idempotent() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("pagekeep.db");
    {
        let db = Database::open(&path).unwrap();
        db.put(&boost("b1", "first")).unwrap();
    }
    let db = Database::open(&path).unwrap();
    assert_eq!(db.schema_version(), CURRENT_SCHEMA_VERSION);
    assert_eq!(db.count::<Boost>().unwrap(), 1);
    assert_eq!(db.path(), Some(path.as_path()));
}

#[test]
fn test_newer_schema_version_is_refused() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("future.db");
    {
        let db = Database::open(&path).unwrap();
        db.connection()
            .execute(
                "INSERT INTO schema_version (version, applied_at, description) VALUES (99, 0, 'future')",
                [],
            )
            .unwrap();
    }
    match Database::open(&path) {
        Err(StoreError::VersionMismatch { found, supported }) => {
            assert_eq!(found, 99);
            assert_eq!(supported, CURRENT_SCHEMA_VERSION);
        }
        other => panic!("expected VersionMismatch, got {:?}", other.err()),
    }
}

#[test]
fn test_put_get_delete() {
    let db = Database::open_in_memory().unwrap();
    let b = boost("b1", "first");
    db.put(&b).unwrap();

    assert_eq!(db.get::<Boost>("b1").unwrap(), Some(b));
    assert!(db.delete::<Boost>("b1").unwrap());
    assert!(!db.delete::<Boost>("b1").unwrap());
    assert_eq!(db.get::<Boost>("b1").unwrap(), None);
}

#[test]
fn test_upsert_keeps_insertion_order() {
    let db = Database::open_in_memory().unwrap();
    db.put(&boost("a", "one")).unwrap();
    db.put(&boost("b", "two")).unwrap();
    db.put(&boost("a", "one, renamed")).unwrap();

    let all: Vec<Boost> = db.get_all().unwrap();
    let names: Vec<&str> = all.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, vec!["one, renamed", "two"]);
}

#[test]
fn test_put_all_writes_every_record() {
    let db = Database::open_in_memory().unwrap();
    db.put_all(&[boost("a", "one"), boost("b", "two"), boost("c", "three")]).unwrap();
    assert_eq!(db.count::<Boost>().unwrap(), 3);
}

#[test]
fn test_find_by_index() {
    let db = Database::open_in_memory().unwrap();
    db.put(&note("n1", Some("https://a.example/"))).unwrap();
    db.put(&note("n2", Some("https://b.example/"))).unwrap();
    db.put(&note("n3", Some("https://a.example/"))).unwrap();
    db.put(&note("n4", None)).unwrap();

    let found: Vec<BrowserNote> = db.find_by_index("url", &"https://a.example/").unwrap();
    let ids: Vec<&str> = found.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["n1", "n3"]);
}

#[test]
fn test_find_by_unknown_index_is_rejected() {
    let db = Database::open_in_memory().unwrap();
    let result = db.find_by_index::<BrowserNote>("title; DROP TABLE notes", &"x");
    assert!(matches!(result, Err(StoreError::Query(_))));
}

#[test]
fn test_named_path_rejects_bad_names() {
    assert!(Database::named_path("").is_err());
    assert!(Database::named_path("../escape").is_err());
}

// === Store handle ===

#[test]
fn test_store_degrades_when_database_cannot_open() {
    let tmp = TempDir::new().unwrap();
    let blocker = tmp.path().join("not-a-dir");
    std::fs::write(&blocker, b"file").unwrap();

    let store = Store::open(blocker.join("nested").join("pagekeep.db"));
    assert!(store.is_degraded());
    assert!(store.degraded_reason().is_some());

    store.put(&boost("b1", "kept in memory")).unwrap();
    assert!(store.get_all::<Boost>().unwrap().is_empty());
    assert!(!store.delete::<Boost>("b1").unwrap());
}

#[test]
fn test_store_memory_only_reports_reason() {
    let store = Store::memory_only("configured");
    assert!(store.is_degraded());
    assert_eq!(store.degraded_reason(), Some("configured"));
    assert!(store.database().is_none());
}

#[test]
fn test_store_in_memory_is_durable_for_session() {
    let store = Store::open_in_memory();
    assert!(!store.is_degraded());
    store.put(&boost("b1", "first")).unwrap();
    let clone = store.clone();
    assert_eq!(clone.load_or_empty::<Boost>().len(), 1);
}
