// pagekeep services
// Engines over the shared store, page text and metadata helpers, link previews and settings.

pub mod boost_engine;
pub mod collection_engine;
pub mod html_meta;
pub mod link_preview;
pub mod note_engine;
pub mod page_text;
pub mod pattern_matcher;
pub mod reading_list;
pub mod settings_engine;
