//! Property-based tests for the record codec and store reload.
//!
//! Saving a record and reloading it from the store must reproduce an equal
//! record, including every timestamp.

use pagekeep::database::{codec, Store};
use pagekeep::services::boost_engine::{BoostEngine, BoostEngineTrait};
use pagekeep::services::reading_list::{ReadingList, ReadingListTrait};
use pagekeep::types::boost::{Boost, NewBoost};
use pagekeep::types::reading_list::NewReadingItem;
use pagekeep::types::settings::ReadingSettings;
use proptest::prelude::*;

fn arb_pattern() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("*".to_string()),
        "[a-z]{3,10}\\.(com|org|io)",
        "\\*\\.[a-z]{3,10}\\.com",
        "[a-z]{3,10}\\.com/[a-z]{1,8}",
    ]
}

fn arb_new_boost() -> impl Strategy<Value = NewBoost> {
    (
        "[A-Za-z][A-Za-z0-9 ]{0,20}",
        arb_pattern(),
        proptest::option::of("[a-z{}:; ]{0,40}"),
        proptest::option::of("[a-z(); ]{0,40}"),
        proptest::collection::vec("[a-z]{1,8}", 0..4),
    )
        .prop_map(|(name, pattern, css, js, tags)| NewBoost {
            name,
            pattern,
            css,
            js,
            tags,
            ..NewBoost::default()
        })
}

// *For any* boost, creating it and reloading the engine from the same store
// SHALL reproduce an equal record with equal timestamps.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(30))]

    #[test]
    fn boost_survives_store_reload(new_boost in arb_new_boost()) {
        let store = Store::open_in_memory();
        let mut engine = BoostEngine::new(store.clone());
        let created = engine.create(new_boost).expect("create should succeed");

        let reloaded = BoostEngine::new(store);
        let found = reloaded.get(&created.id).expect("boost should be reloaded");
        prop_assert_eq!(found, &created);
        prop_assert_eq!(found.created_at, created.created_at);
        prop_assert_eq!(found.updated_at, created.updated_at);
    }

    #[test]
    fn encoded_boost_decodes_to_equal_value(new_boost in arb_new_boost()) {
        let now = codec::now();
        let boost = Boost {
            id: "fixed".to_string(),
            name: new_boost.name,
            pattern: new_boost.pattern,
            css: new_boost.css,
            js: new_boost.js,
            enabled: true,
            include_subdomains: false,
            created_at: now,
            updated_at: now,
            description: None,
            tags: new_boost.tags,
            use_count: 7,
        };
        let encoded = codec::encode(&boost).unwrap();
        let decoded: Boost = codec::decode(&encoded).unwrap();
        prop_assert_eq!(decoded, boost);
    }

    #[test]
    fn reading_item_progress_survives_reload(
        host in "[a-z]{3,12}",
        percent in 0u32..=100,
    ) {
        let store = Store::open_in_memory();
        let mut list = ReadingList::new(store.clone(), ReadingSettings::default());
        let item = list
            .add_to_list(NewReadingItem {
                url: format!("https://{}.example/article", host),
                title: host.clone(),
                ..NewReadingItem::default()
            })
            .unwrap();
        let updated = list.update_progress(&item.id, percent as f64 / 100.0).unwrap();

        let reloaded = ReadingList::new(store, ReadingSettings::default());
        prop_assert_eq!(reloaded.get_item(&item.id), Some(&updated));
    }
}
