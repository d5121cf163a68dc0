//! Unit tests for the Reading List.

use pagekeep::database::Store;
use pagekeep::services::reading_list::{ReadingList, ReadingListTrait};
use pagekeep::types::errors::ReadingListError;
use pagekeep::types::reading_list::{NewReadingItem, ReadingFilter, ReadingSearch};
use pagekeep::types::settings::ReadingSettings;

fn list() -> ReadingList {
    ReadingList::new(Store::open_in_memory(), ReadingSettings::default())
}

fn article(url: &str, title: &str) -> NewReadingItem {
    NewReadingItem {
        url: url.to_string(),
        title: title.to_string(),
        ..NewReadingItem::default()
    }
}

#[test]
fn test_add_to_list_sets_defaults() {
    let mut list = list();
    let item = list.add_to_list(article("https://a.example/post", "Post")).unwrap();
    assert!(!item.is_read);
    assert_eq!(item.progress, 0.0);
    assert!(!item.is_offline);
    assert!(item.offline_content.is_none());
    assert!(item.read_time.is_none());
    assert!(!item.is_favorite);
    assert!(item.read_at.is_none());
}

#[test]
fn test_add_to_list_is_idempotent_by_url() {
    let mut list = list();
    let first = list.add_to_list(article("https://a.example/post", "Post")).unwrap();
    let second = list
        .add_to_list(article("  https://a.example/post  ", "Another title"))
        .unwrap();
    assert_eq!(first, second);
    assert_eq!(list.list(ReadingFilter::All).len(), 1);
}

#[test]
fn test_add_to_list_rejects_non_web_urls() {
    let mut list = list();
    for url in ["", "not a url", "ftp://a.example/file", "javascript:alert(1)"] {
        let result = list.add_to_list(article(url, "x"));
        assert!(matches!(result, Err(ReadingListError::InvalidUrl(_))), "{}", url);
    }
    assert!(list.list(ReadingFilter::All).is_empty());
}

#[test]
fn test_empty_title_defaults_to_url() {
    let mut list = list();
    let item = list.add_to_list(article("https://a.example/post", "  ")).unwrap();
    assert_eq!(item.title, "https://a.example/post");
}

#[test]
fn test_progress_past_threshold_marks_read() {
    let mut list = list();
    let item = list.add_to_list(article("https://a.example/post", "Post")).unwrap();

    let halfway = list.update_progress(&item.id, 0.5).unwrap();
    assert!(!halfway.is_read);

    let nearly = list.update_progress(&item.id, 0.95).unwrap();
    assert!(nearly.is_read);
    assert_eq!(nearly.progress, 0.95);

    // Scrolling back up does not un-read the item.
    let back = list.update_progress(&item.id, 0.2).unwrap();
    assert!(back.is_read);
}

#[test]
fn test_progress_is_clamped() {
    let mut list = list();
    let item = list.add_to_list(article("https://a.example/post", "Post")).unwrap();
    assert_eq!(list.update_progress(&item.id, 7.0).unwrap().progress, 1.0);
    assert_eq!(list.update_progress(&item.id, -3.0).unwrap().progress, 0.0);
    assert_eq!(list.update_progress(&item.id, f64::NAN).unwrap().progress, 0.0);
}

#[test]
fn test_mark_read_and_unread() {
    let mut list = list();
    let item = list.add_to_list(article("https://a.example/post", "Post")).unwrap();

    let read = list.mark_read(&item.id).unwrap();
    assert!(read.is_read);
    assert_eq!(read.progress, 1.0);

    let unread = list.mark_unread(&item.id).unwrap();
    assert!(!unread.is_read);
    assert_eq!(unread.progress, 0.0);

    assert!(matches!(list.mark_read("missing"), Err(ReadingListError::NotFound(_))));
}

#[test]
fn test_save_offline_derives_read_time_and_excerpt() {
    let mut list = list();
    let item = list.add_to_list(article("https://a.example/post", "Post")).unwrap();
    let words = vec!["word"; 450].join(" ");
    let html = format!("<html><body><p>{}</p></body></html>", words);

    let saved = list.save_offline(&item.id, &html).unwrap();
    assert!(saved.is_offline);
    assert_eq!(saved.offline_content.as_deref(), Some(html.as_str()));
    assert_eq!(saved.read_time, Some(3));
    let excerpt = saved.excerpt.unwrap();
    assert!(excerpt.starts_with("word word"));
    assert!(excerpt.ends_with("..."));
    assert!(!excerpt.contains('<'));
}

#[test]
fn test_save_offline_keeps_supplied_excerpt() {
    let mut list = list();
    let item = list
        .add_to_list(NewReadingItem {
            excerpt: Some("My summary".to_string()),
            ..article("https://a.example/post", "Post")
        })
        .unwrap();
    let saved = list.save_offline(&item.id, "<p>short</p>").unwrap();
    assert_eq!(saved.excerpt.as_deref(), Some("My summary"));
    assert_eq!(saved.read_time, Some(1));
}

#[test]
fn test_remove_offline() {
    let mut list = list();
    let item = list.add_to_list(article("https://a.example/post", "Post")).unwrap();
    list.save_offline(&item.id, "<p>body</p>").unwrap();

    let removed = list.remove_offline(&item.id).unwrap();
    assert!(!removed.is_offline);
    assert!(removed.offline_content.is_none());
    assert_eq!(removed.read_time, Some(1));
}

#[test]
fn test_filters() {
    let mut list = list();
    let a = list.add_to_list(article("https://a.example/", "A")).unwrap();
    let b = list.add_to_list(article("https://b.example/", "B")).unwrap();
    list.add_to_list(article("https://c.example/", "C")).unwrap();
    list.mark_read(&a.id).unwrap();
    list.save_offline(&b.id, "<p>x</p>").unwrap();

    assert_eq!(list.list(ReadingFilter::All).len(), 3);
    assert_eq!(list.list(ReadingFilter::Read).len(), 1);
    assert_eq!(list.list(ReadingFilter::Unread).len(), 2);
    let offline = list.list(ReadingFilter::Offline);
    assert_eq!(offline.len(), 1);
    assert_eq!(offline[0].id, b.id);
}

#[test]
fn test_delete_is_idempotent_and_persistent() {
    let store = Store::open_in_memory();
    let mut list = ReadingList::new(store.clone(), ReadingSettings::default());
    let item = list.add_to_list(article("https://a.example/", "A")).unwrap();
    assert!(list.delete(&item.id).unwrap());
    assert!(!list.delete(&item.id).unwrap());
    assert!(list.find_by_url("https://a.example/").is_none());
    assert!(ReadingList::new(store, ReadingSettings::default())
        .list(ReadingFilter::All)
        .is_empty());
}

#[test]
fn test_stats_and_tags() {
    let mut list = list();
    let a = list
        .add_to_list(NewReadingItem {
            tags: vec!["rust".to_string(), "async".to_string()],
            ..article("https://a.example/", "A")
        })
        .unwrap();
    list.add_to_list(article("https://b.example/", "B")).unwrap();
    list.mark_read(&a.id).unwrap();
    list.save_offline(&a.id, "<p>body</p>").unwrap();

    let stats = list.stats();
    assert_eq!(stats.total_items, 2);
    assert_eq!(stats.read_items, 1);
    assert_eq!(stats.unread_items, 1);
    assert_eq!(stats.offline_items, 1);
    assert_eq!(stats.favorite_items, 0);
    assert_eq!(stats.total_read_time_minutes, 1);
    assert_eq!(list.all_tags(), vec!["async".to_string(), "rust".to_string()]);
}

#[test]
fn test_custom_threshold() {
    let settings = ReadingSettings {
        read_threshold: 0.5,
        ..ReadingSettings::default()
    };
    let mut list = ReadingList::new(Store::open_in_memory(), settings);
    let item = list.add_to_list(article("https://a.example/", "A")).unwrap();
    assert!(list.update_progress(&item.id, 0.6).unwrap().is_read);
}

#[test]
fn test_degraded_store_keeps_list_working() {
    let mut list = ReadingList::new(Store::memory_only("test"), ReadingSettings::default());
    assert!(list.is_degraded());
    let item = list.add_to_list(article("https://a.example/", "A")).unwrap();
    assert!(list.update_progress(&item.id, 0.95).unwrap().is_read);
}

#[test]
fn test_out_of_range_threshold_is_clamped() {
    for read_threshold in [1.5, 0.0, -1.0, f64::NAN] {
        let settings = ReadingSettings {
            read_threshold,
            ..ReadingSettings::default()
        };
        let mut list = ReadingList::new(Store::open_in_memory(), settings);
        let item = list.add_to_list(article("https://a.example/", "A")).unwrap();
        assert!(!list.update_progress(&item.id, 0.5).unwrap().is_read, "{}", read_threshold);
        assert!(list.update_progress(&item.id, 0.95).unwrap().is_read, "{}", read_threshold);
    }
}

#[test]
fn test_update_settings_changes_read_time() {
    let mut list = list();
    let item = list.add_to_list(article("https://a.example/", "A")).unwrap();
    list.update_settings(ReadingSettings {
        words_per_minute: 100,
        ..ReadingSettings::default()
    });
    let html = format!("<p>{}</p>", "word ".repeat(250));
    assert_eq!(list.save_offline(&item.id, &html).unwrap().read_time, Some(3));
}

#[test]
fn test_read_at_follows_read_state() {
    let mut list = list();
    let item = list.add_to_list(article("https://a.example/", "A")).unwrap();

    let read = list.mark_read(&item.id).unwrap();
    assert!(read.read_at.is_some());

    let unread = list.mark_unread(&item.id).unwrap();
    assert!(unread.read_at.is_none());

    let crossed = list.update_progress(&item.id, 0.95).unwrap();
    let read_at = crossed.read_at.unwrap();
    let again = list.update_progress(&item.id, 0.99).unwrap();
    assert_eq!(again.read_at, Some(read_at));
}

#[test]
fn test_toggle_favorite_and_filter() {
    let store = Store::open_in_memory();
    let mut list = ReadingList::new(store.clone(), ReadingSettings::default());
    let a = list.add_to_list(article("https://a.example/", "A")).unwrap();
    list.add_to_list(article("https://b.example/", "B")).unwrap();

    assert!(list.toggle_favorite(&a.id).unwrap());
    let favorites = list.list(ReadingFilter::Favorites);
    assert_eq!(favorites.len(), 1);
    assert_eq!(favorites[0].id, a.id);
    assert_eq!(list.stats().favorite_items, 1);

    let reloaded = ReadingList::new(store, ReadingSettings::default());
    assert!(reloaded.get_item(&a.id).unwrap().is_favorite);

    assert!(!list.toggle_favorite(&a.id).unwrap());
    assert!(list.list(ReadingFilter::Favorites).is_empty());
    assert!(matches!(
        list.toggle_favorite("missing"),
        Err(ReadingListError::NotFound(_))
    ));
}

#[test]
fn test_search_by_text_tag_and_filter() {
    let mut list = list();
    let rust = list
        .add_to_list(NewReadingItem {
            tags: vec!["rust".to_string()],
            excerpt: Some("Ownership explained".to_string()),
            ..article("https://a.example/rust", "Rust notes")
        })
        .unwrap();
    let tokio = list
        .add_to_list(NewReadingItem {
            tags: vec!["rust".to_string(), "async".to_string()],
            ..article("https://b.example/tokio", "Runtime tour")
        })
        .unwrap();
    list.save_offline(&tokio.id, "<p>Work stealing scheduler</p>").unwrap();
    list.add_to_list(article("https://c.example/go", "Go notes")).unwrap();

    let by_title = list.search(&ReadingSearch {
        query: Some("NOTES".to_string()),
        ..ReadingSearch::default()
    });
    assert_eq!(by_title.len(), 2);

    let by_excerpt = list.search(&ReadingSearch {
        query: Some("ownership".to_string()),
        ..ReadingSearch::default()
    });
    assert_eq!(by_excerpt[0].id, rust.id);

    let by_content = list.search(&ReadingSearch {
        query: Some("stealing".to_string()),
        ..ReadingSearch::default()
    });
    assert_eq!(by_content.len(), 1);
    assert_eq!(by_content[0].id, tokio.id);

    let tagged = list.search(&ReadingSearch {
        tag: Some("rust".to_string()),
        query: Some("notes".to_string()),
        ..ReadingSearch::default()
    });
    assert_eq!(tagged.len(), 1);
    assert_eq!(tagged[0].id, rust.id);

    list.toggle_favorite(&tokio.id).unwrap();
    let favorites = list.search(&ReadingSearch {
        tag: Some("rust".to_string()),
        filter: ReadingFilter::Favorites,
        ..ReadingSearch::default()
    });
    assert_eq!(favorites.len(), 1);
    assert_eq!(favorites[0].id, tokio.id);

    assert_eq!(list.search(&ReadingSearch::default()).len(), 3);
}
