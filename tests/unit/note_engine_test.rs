//! Unit tests for the Notes Engine.

use std::thread::sleep;
use std::time::Duration;

use pagekeep::database::Store;
use pagekeep::services::note_engine::{NoteEngine, NoteEngineTrait};
use pagekeep::types::errors::NoteError;
use pagekeep::types::note::{NewNote, NoteUpdate};

fn note(title: &str, url: Option<&str>) -> NewNote {
    NewNote {
        title: title.to_string(),
        content: format!("content of {}", title),
        url: url.map(str::to_string),
        ..NewNote::default()
    }
}

#[test]
fn test_create_and_get() {
    let mut engine = NoteEngine::new(Store::open_in_memory());
    let created = engine.create(note("First", None)).unwrap();
    assert_eq!(engine.get(&created.id), Some(&created));
    assert!(!created.pinned);
    assert_eq!(created.created_at, created.updated_at);
}

#[test]
fn test_list_orders_pinned_then_recent() {
    let mut engine = NoteEngine::new(Store::open_in_memory());
    let old = engine.create(note("old", None)).unwrap();
    sleep(Duration::from_millis(5));
    let pinned = engine
        .create(NewNote {
            pinned: true,
            ..note("pinned", None)
        })
        .unwrap();
    sleep(Duration::from_millis(5));
    let recent = engine.create(note("recent", None)).unwrap();

    let ids: Vec<&str> = engine.list().iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec![pinned.id.as_str(), recent.id.as_str(), old.id.as_str()]);
}

#[test]
fn test_update_and_unknown_id() {
    let mut engine = NoteEngine::new(Store::open_in_memory());
    let created = engine.create(note("Draft", None)).unwrap();
    let updated = engine
        .update(
            &created.id,
            NoteUpdate {
                content: Some("final".to_string()),
                tags: Some(vec!["done".to_string()]),
                ..NoteUpdate::default()
            },
        )
        .unwrap();
    assert_eq!(updated.title, "Draft");
    assert_eq!(updated.content, "final");
    assert_eq!(updated.tags, vec!["done".to_string()]);
    assert!(updated.updated_at >= created.updated_at);

    assert!(matches!(
        engine.update("missing", NoteUpdate::default()),
        Err(NoteError::NotFound(_))
    ));
}

#[test]
fn test_toggle_pinned() {
    let mut engine = NoteEngine::new(Store::open_in_memory());
    let created = engine.create(note("Pin me", None)).unwrap();
    assert!(engine.toggle_pinned(&created.id).unwrap());
    assert!(engine.get(&created.id).unwrap().pinned);
    assert!(!engine.toggle_pinned(&created.id).unwrap());
    assert!(matches!(engine.toggle_pinned("missing"), Err(NoteError::NotFound(_))));
}

#[test]
fn test_delete_is_idempotent_and_persistent() {
    let store = Store::open_in_memory();
    let mut engine = NoteEngine::new(store.clone());
    let created = engine.create(note("Gone", None)).unwrap();
    let kept = engine.create(note("Kept", None)).unwrap();

    assert!(engine.delete(&created.id).unwrap());
    assert!(!engine.delete(&created.id).unwrap());

    let reloaded = NoteEngine::new(store);
    assert_eq!(reloaded.list().len(), 1);
    assert_eq!(reloaded.get(&kept.id), Some(&kept));
}

#[test]
fn test_search() {
    let mut engine = NoteEngine::new(Store::open_in_memory());
    engine.create(note("Rust ownership", None)).unwrap();
    engine
        .create(NewNote {
            tags: vec!["recipes".to_string()],
            ..note("Dinner", None)
        })
        .unwrap();

    assert_eq!(engine.search("OWNERSHIP").len(), 1);
    assert_eq!(engine.search("recipe").len(), 1);
    assert_eq!(engine.search("content of").len(), 2);
    assert_eq!(engine.search("").len(), 2);
    assert!(engine.search("nothing matches").is_empty());
}

#[test]
fn test_for_url_uses_index() {
    let mut engine = NoteEngine::new(Store::open_in_memory());
    let a = engine.create(note("a", Some("https://a.example/"))).unwrap();
    engine.create(note("b", Some("https://b.example/"))).unwrap();
    engine.create(note("c", None)).unwrap();

    let found = engine.for_url("https://a.example/").unwrap();
    assert_eq!(found, vec![a]);
    assert!(engine.for_url("https://none.example/").unwrap().is_empty());
}

#[test]
fn test_for_url_when_degraded() {
    let mut engine = NoteEngine::new(Store::memory_only("test"));
    assert!(engine.is_degraded());
    let a = engine.create(note("a", Some("https://a.example/"))).unwrap();
    engine.create(note("b", Some("https://b.example/"))).unwrap();
    assert_eq!(engine.for_url("https://a.example/").unwrap(), vec![a]);
}

#[test]
fn test_for_collection_tags_and_stats() {
    let mut engine = NoteEngine::new(Store::open_in_memory());
    engine
        .create(NewNote {
            collection_id: Some("c1".to_string()),
            tags: vec!["b".to_string(), "a".to_string()],
            pinned: true,
            ..note("one", Some("https://a.example/"))
        })
        .unwrap();
    engine
        .create(NewNote {
            tags: vec!["a".to_string()],
            ..note("two", None)
        })
        .unwrap();

    assert_eq!(engine.for_collection("c1").len(), 1);
    assert!(engine.for_collection("c2").is_empty());
    assert_eq!(engine.all_tags(), vec!["a".to_string(), "b".to_string()]);

    let stats = engine.stats();
    assert_eq!(stats.total_notes, 2);
    assert_eq!(stats.pinned_notes, 1);
    assert_eq!(stats.notes_with_url, 1);
    assert_eq!(stats.distinct_tags, 2);
}
