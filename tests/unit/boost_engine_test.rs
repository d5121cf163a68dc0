//! Unit tests for the Boosts Engine.

use pagekeep::database::Store;
use pagekeep::services::boost_engine::{BoostEngine, BoostEngineTrait, APPLIED_CAPACITY};
use pagekeep::types::boost::{BoostUpdate, NewBoost};
use pagekeep::types::errors::BoostError;

fn engine() -> BoostEngine {
    BoostEngine::new(Store::open_in_memory())
}

fn new_boost(name: &str, pattern: &str, css: &str) -> NewBoost {
    NewBoost {
        name: name.to_string(),
        pattern: pattern.to_string(),
        css: Some(css.to_string()),
        ..NewBoost::default()
    }
}

#[test]
fn test_create_sets_defaults() {
    let mut engine = engine();
    let boost = engine.create(new_boost("Red", "example.com", "body{color:red}")).unwrap();
    assert!(boost.enabled);
    assert!(boost.include_subdomains);
    assert_eq!(boost.use_count, 0);
    assert_eq!(boost.created_at, boost.updated_at);
    assert_eq!(engine.list().len(), 1);
}

#[test]
fn test_create_rejects_empty_pattern() {
    let mut engine = engine();
    let result = engine.create(new_boost("Empty", "   ", ""));
    assert!(matches!(result, Err(BoostError::InvalidPattern(_))));
    assert!(engine.list().is_empty());
}

#[test]
fn test_apply_scenario_counts_use() {
    let mut engine = engine();
    let boost = engine.create(new_boost("Red", "example.com", "body{color:red}")).unwrap();

    let applied = engine.apply("https://www.example.com/page").unwrap();
    assert!(applied.css.contains("body{color:red}"));
    assert!(applied.css.contains("/* Boost: Red */"));
    assert!(applied.js.is_empty());
    assert_eq!(applied.boost_ids, vec![boost.id.clone()]);
    assert_eq!(engine.get(&boost.id).unwrap().use_count, 1);
    assert_eq!(
        engine.applied_for("https://www.example.com/page"),
        Some(&[boost.id.clone()][..])
    );
}

#[test]
fn test_non_matching_apply_is_not_remembered() {
    let mut engine = engine();
    engine.create(new_boost("Red", "example.com", "body{}")).unwrap();

    for n in 0..1000 {
        let applied = engine.apply(&format!("https://site{}.org/", n)).unwrap();
        assert!(applied.boost_ids.is_empty());
    }
    assert_eq!(engine.applied_count(), 0);
    assert_eq!(engine.applied_for("https://site1.org/"), None);
}

#[test]
fn test_applied_addresses_are_bounded() {
    let mut engine = engine();
    let boost = engine.create(new_boost("All", "*", "body{}")).unwrap();

    for n in 0..APPLIED_CAPACITY + 10 {
        engine.apply(&format!("https://site{}.org/", n)).unwrap();
    }
    assert_eq!(engine.applied_count(), APPLIED_CAPACITY);
    assert_eq!(engine.applied_for("https://site0.org/"), None);
    let newest = format!("https://site{}.org/", APPLIED_CAPACITY + 9);
    assert_eq!(engine.applied_for(&newest), Some(&[boost.id.clone()][..]));
}

#[test]
fn test_delete_forgets_applied_addresses() {
    let mut engine = engine();
    let boost = engine.create(new_boost("Red", "example.com", "body{}")).unwrap();
    engine.apply("https://example.com/").unwrap();
    assert_eq!(engine.applied_count(), 1);

    engine.delete(&boost.id).unwrap();
    assert_eq!(engine.applied_count(), 0);
    assert_eq!(engine.applied_for("https://example.com/"), None);
}

#[test]
fn test_apply_persists_use_count() {
    let store = Store::open_in_memory();
    let mut engine = BoostEngine::new(store.clone());
    let boost = engine.create(new_boost("Red", "example.com", "body{}")).unwrap();
    engine.apply("https://example.com/").unwrap();
    engine.apply("https://example.com/").unwrap();

    let reloaded = BoostEngine::new(store);
    assert_eq!(reloaded.get(&boost.id).unwrap().use_count, 2);
}

#[test]
fn test_apply_concatenates_in_insertion_order() {
    let mut engine = engine();
    engine.create(new_boost("First", "*", "a{}")).unwrap();
    let mut js_boost = new_boost("Second", "example.com", "b{}");
    js_boost.js = Some("console.log(1);".to_string());
    engine.create(js_boost).unwrap();
    engine.create(new_boost("Elsewhere", "other.org", "c{}")).unwrap();

    let applied = engine.apply("https://example.com/").unwrap();
    let first = applied.css.find("a{}").unwrap();
    let second = applied.css.find("b{}").unwrap();
    assert!(first < second);
    assert!(!applied.css.contains("c{}"));
    assert_eq!(applied.js, "// Boost: Second\nconsole.log(1);");
    assert_eq!(applied.boost_ids.len(), 2);
}

#[test]
fn test_disabled_boosts_are_not_applied() {
    let mut engine = engine();
    let boost = engine.create(new_boost("Red", "example.com", "body{}")).unwrap();
    assert!(!engine.toggle(&boost.id).unwrap());

    assert!(engine.get_for_address("https://example.com/").is_empty());
    let applied = engine.apply("https://example.com/").unwrap();
    assert!(applied.css.is_empty());
    assert_eq!(engine.get(&boost.id).unwrap().use_count, 0);

    assert!(engine.toggle(&boost.id).unwrap());
    assert_eq!(engine.get_for_address("https://example.com/").len(), 1);
}

#[test]
fn test_include_subdomains_false_limits_matches() {
    let mut engine = engine();
    let mut boost = new_boost("Exact", "example.com", "x{}");
    boost.include_subdomains = Some(false);
    engine.create(boost).unwrap();

    assert_eq!(engine.get_for_address("https://www.example.com/").len(), 1);
    assert!(engine.get_for_address("https://blog.example.com/").is_empty());
}

#[test]
fn test_unknown_ids_are_reported() {
    let mut engine = engine();
    assert!(matches!(engine.toggle("missing"), Err(BoostError::NotFound(_))));
    assert!(matches!(
        engine.update("missing", BoostUpdate::default()),
        Err(BoostError::NotFound(_))
    ));
    assert!(!engine.delete("missing").unwrap());
}

#[test]
fn test_update_merges_fields() {
    let mut engine = engine();
    let boost = engine.create(new_boost("Red", "example.com", "body{}")).unwrap();
    let updated = engine
        .update(
            &boost.id,
            BoostUpdate {
                name: Some("Blue".to_string()),
                css: Some("body{color:blue}".to_string()),
                ..BoostUpdate::default()
            },
        )
        .unwrap();
    assert_eq!(updated.name, "Blue");
    assert_eq!(updated.pattern, "example.com");
    assert_eq!(updated.css.as_deref(), Some("body{color:blue}"));
    assert!(updated.updated_at >= updated.created_at);

    let bad = engine.update(
        &boost.id,
        BoostUpdate {
            pattern: Some(" ".to_string()),
            ..BoostUpdate::default()
        },
    );
    assert!(matches!(bad, Err(BoostError::InvalidPattern(_))));
    assert_eq!(engine.get(&boost.id).unwrap().pattern, "example.com");
}

#[test]
fn test_delete_is_idempotent() {
    let store = Store::open_in_memory();
    let mut engine = BoostEngine::new(store.clone());
    let boost = engine.create(new_boost("Red", "example.com", "body{}")).unwrap();
    assert!(engine.delete(&boost.id).unwrap());
    assert!(!engine.delete(&boost.id).unwrap());
    assert!(BoostEngine::new(store).list().is_empty());
}

#[test]
fn test_create_from_template() {
    let mut engine = engine();
    let downloads = engine
        .templates()
        .iter()
        .find(|t| t.id == "dark-mode")
        .unwrap()
        .downloads;

    let boost = engine
        .create_from_template("dark-mode", Some("example.com"))
        .unwrap()
        .expect("template exists");
    assert_eq!(boost.pattern, "example.com");
    assert_eq!(boost.name, "Dark Mode");
    assert!(boost.css.as_deref().unwrap().contains("invert"));

    let after = engine.templates().iter().find(|t| t.id == "dark-mode").unwrap().downloads;
    assert_eq!(after, downloads + 1);
}

#[test]
fn test_create_from_unknown_template_returns_none() {
    let mut engine = engine();
    assert!(engine.create_from_template("no-such-template", None).unwrap().is_none());
    assert!(engine.list().is_empty());
}

#[test]
fn test_templates_by_category() {
    let engine = engine();
    let focus = engine.templates_by_category("FOCUS");
    assert!(!focus.is_empty());
    assert!(focus.iter().all(|t| t.category == "focus"));
}

#[test]
fn test_search_and_export_import() {
    let mut engine = engine();
    let mut tagged = new_boost("Reader", "news.example.com", "p{}");
    tagged.tags = vec!["reading".to_string()];
    engine.create(tagged).unwrap();
    engine.create(new_boost("Other", "other.org", "q{}")).unwrap();

    assert_eq!(engine.search("READ").len(), 1);
    assert_eq!(engine.search("other.org").len(), 1);

    let exported = engine.export_json().unwrap();
    let mut target = BoostEngine::new(Store::open_in_memory());
    let imported = target.import_json(&exported).unwrap();
    assert_eq!(imported.len(), 2);
    assert!(imported.iter().all(|b| engine.get(&b.id).is_none()));
    assert_eq!(target.list().len(), 2);
}

#[test]
fn test_degraded_store_keeps_engine_working() {
    let mut engine = BoostEngine::new(Store::memory_only("test"));
    assert!(engine.is_degraded());
    let boost = engine.create(new_boost("Red", "example.com", "body{}")).unwrap();
    assert_eq!(engine.apply("https://example.com/").unwrap().boost_ids, vec![boost.id]);
}
