//! Reading List for pagekeep.
//!
//! Articles saved for later, unique by address, with reading progress and
//! optional offline copies. Read time and excerpt are derived from the
//! offline copy when the caller did not supply them.

use std::collections::BTreeSet;

use url::Url;
use uuid::Uuid;

use crate::database::{codec, Store};
use crate::services::page_text;
use crate::types::errors::ReadingListError;
use crate::types::reading_list::{
    NewReadingItem, ReadingFilter, ReadingListItem, ReadingListStats, ReadingSearch,
};
use crate::types::settings::ReadingSettings;

/// Trait defining reading list operations.
pub trait ReadingListTrait {
    /// Adds an article. Adding an address already on the list returns the
    /// existing item unchanged.
    fn add_to_list(&mut self, item: NewReadingItem) -> Result<ReadingListItem, ReadingListError>;
    fn get_item(&self, id: &str) -> Option<&ReadingListItem>;
    fn list(&self, filter: ReadingFilter) -> Vec<&ReadingListItem>;
    fn update_progress(&mut self, id: &str, progress: f64) -> Result<ReadingListItem, ReadingListError>;
    fn mark_read(&mut self, id: &str) -> Result<ReadingListItem, ReadingListError>;
    fn mark_unread(&mut self, id: &str) -> Result<ReadingListItem, ReadingListError>;
    fn save_offline(&mut self, id: &str, html: &str) -> Result<ReadingListItem, ReadingListError>;
    /// Flips the favorite flag and returns the new value.
    fn toggle_favorite(&mut self, id: &str) -> Result<bool, ReadingListError>;
    fn search(&self, search: &ReadingSearch) -> Vec<&ReadingListItem>;
    fn delete(&mut self, id: &str) -> Result<bool, ReadingListError>;
}

pub struct ReadingList {
    store: Store,
    settings: ReadingSettings,
    items: Vec<ReadingListItem>,
}

impl ReadingList {
    pub fn new(store: Store, settings: ReadingSettings) -> Self {
        let items: Vec<ReadingListItem> = store.load_or_empty();
        tracing::debug!(count = items.len(), "reading list loaded");
        Self {
            store,
            settings,
            items,
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.store.is_degraded()
    }

    /// Applies new derivation rules to subsequent operations.
    pub fn update_settings(&mut self, settings: ReadingSettings) {
        self.settings = settings;
    }

    pub fn find_by_url(&self, url: &str) -> Option<&ReadingListItem> {
        let url = url.trim();
        self.items.iter().find(|i| i.url == url)
    }

    /// Drops the offline copy, keeping derived read time and excerpt.
    pub fn remove_offline(&mut self, id: &str) -> Result<ReadingListItem, ReadingListError> {
        self.modify(id, |item| {
            item.offline_content = None;
            item.is_offline = false;
        })
    }

    pub fn stats(&self) -> ReadingListStats {
        let read_items = self.items.iter().filter(|i| i.is_read).count();
        ReadingListStats {
            total_items: self.items.len(),
            unread_items: self.items.len() - read_items,
            read_items,
            offline_items: self.items.iter().filter(|i| i.is_offline).count(),
            favorite_items: self.items.iter().filter(|i| i.is_favorite).count(),
            total_read_time_minutes: self.items.iter().filter_map(|i| i.read_time).sum(),
        }
    }

    pub fn all_tags(&self) -> Vec<String> {
        self.items
            .iter()
            .flat_map(|i| i.tags.iter().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    fn modify(
        &mut self,
        id: &str,
        change: impl FnOnce(&mut ReadingListItem),
    ) -> Result<ReadingListItem, ReadingListError> {
        let index = self
            .items
            .iter()
            .position(|i| i.id == id)
            .ok_or_else(|| ReadingListError::NotFound(id.to_string()))?;
        let mut item = self.items[index].clone();
        change(&mut item);

        self.store.put(&item)?;
        self.items[index] = item.clone();
        Ok(item)
    }
}

fn filter_accepts(filter: ReadingFilter, item: &ReadingListItem) -> bool {
    match filter {
        ReadingFilter::All => true,
        ReadingFilter::Unread => !item.is_read,
        ReadingFilter::Read => item.is_read,
        ReadingFilter::Offline => item.is_offline,
        ReadingFilter::Favorites => item.is_favorite,
    }
}

fn validate_url(url: &str) -> Result<String, ReadingListError> {
    let trimmed = url.trim();
    let parsed = Url::parse(trimmed).map_err(|_| ReadingListError::InvalidUrl(url.to_string()))?;
    match parsed.scheme() {
        "http" | "https" if parsed.host_str().is_some() => Ok(trimmed.to_string()),
        _ => Err(ReadingListError::InvalidUrl(url.to_string())),
    }
}

impl ReadingListTrait for ReadingList {
    fn add_to_list(&mut self, new_item: NewReadingItem) -> Result<ReadingListItem, ReadingListError> {
        let url = validate_url(&new_item.url)?;
        if let Some(existing) = self.find_by_url(&url) {
            tracing::debug!(id = %existing.id, "reading list already contains url");
            return Ok(existing.clone());
        }

        let title = match new_item.title.trim() {
            "" => url.clone(),
            title => title.to_string(),
        };
        let item = ReadingListItem {
            id: Uuid::new_v4().to_string(),
            title,
            url,
            excerpt: new_item.excerpt,
            thumbnail: new_item.thumbnail,
            favicon: new_item.favicon,
            read_time: None,
            is_read: false,
            read_at: None,
            is_favorite: false,
            progress: 0.0,
            offline_content: None,
            is_offline: false,
            added_at: codec::now(),
            tags: new_item.tags,
        };

        self.store.put(&item)?;
        self.items.push(item.clone());
        tracing::info!(id = %item.id, "reading list item added");
        Ok(item)
    }

    fn get_item(&self, id: &str) -> Option<&ReadingListItem> {
        self.items.iter().find(|i| i.id == id)
    }

    fn list(&self, filter: ReadingFilter) -> Vec<&ReadingListItem> {
        self.items
            .iter()
            .filter(|i| filter_accepts(filter, i))
            .collect()
    }

    /// Clamps `progress` to `[0, 1]`; passing the read threshold marks the
    /// item read.
    fn update_progress(&mut self, id: &str, progress: f64) -> Result<ReadingListItem, ReadingListError> {
        let progress = if progress.is_nan() { 0.0 } else { progress.clamp(0.0, 1.0) };
        let threshold = self.settings.effective_read_threshold();
        self.modify(id, |item| {
            item.progress = progress;
            if progress > threshold && !item.is_read {
                item.is_read = true;
                item.read_at = Some(codec::now());
            }
        })
    }

    fn mark_read(&mut self, id: &str) -> Result<ReadingListItem, ReadingListError> {
        self.modify(id, |item| {
            item.is_read = true;
            item.read_at = Some(codec::now());
            item.progress = 1.0;
        })
    }

    fn mark_unread(&mut self, id: &str) -> Result<ReadingListItem, ReadingListError> {
        self.modify(id, |item| {
            item.is_read = false;
            item.read_at = None;
            item.progress = 0.0;
        })
    }

    fn save_offline(&mut self, id: &str, html: &str) -> Result<ReadingListItem, ReadingListError> {
        let text = page_text::strip_tags(html);
        let words_per_minute = self.settings.words_per_minute;
        let excerpt_chars = self.settings.excerpt_chars;
        let item = self.modify(id, |item| {
            if item.read_time.is_none() {
                item.read_time = Some(page_text::estimate_read_time(&text, words_per_minute));
            }
            if item.excerpt.as_deref().map_or(true, |e| e.trim().is_empty()) {
                item.excerpt = Some(page_text::truncate_with_ellipsis(&text, excerpt_chars));
            }
            item.offline_content = Some(html.to_string());
            item.is_offline = true;
        })?;
        tracing::debug!(id, bytes = html.len(), "reading list item saved offline");
        Ok(item)
    }

    fn toggle_favorite(&mut self, id: &str) -> Result<bool, ReadingListError> {
        let item = self.modify(id, |item| item.is_favorite = !item.is_favorite)?;
        tracing::debug!(id, favorite = item.is_favorite, "reading list favorite toggled");
        Ok(item.is_favorite)
    }

    /// Items passing `search.filter` that carry `search.tag` and contain
    /// `search.query`, in insertion order. Blank query and tag match everything.
    fn search(&self, search: &ReadingSearch) -> Vec<&ReadingListItem> {
        let query = search
            .query
            .as_deref()
            .map(|q| q.trim().to_lowercase())
            .filter(|q| !q.is_empty());
        let tag = search.tag.as_deref().map(str::trim).filter(|t| !t.is_empty());

        self.items
            .iter()
            .filter(|i| filter_accepts(search.filter, i))
            .filter(|i| tag.map_or(true, |tag| i.tags.iter().any(|t| t == tag)))
            .filter(|i| {
                query.as_deref().map_or(true, |q| {
                    i.title.to_lowercase().contains(q)
                        || i.excerpt.as_deref().is_some_and(|e| e.to_lowercase().contains(q))
                        || i.offline_content
                            .as_deref()
                            .is_some_and(|c| c.to_lowercase().contains(q))
                })
            })
            .collect()
    }

    fn delete(&mut self, id: &str) -> Result<bool, ReadingListError> {
        let stored = self.store.delete::<ReadingListItem>(id)?;
        let before = self.items.len();
        self.items.retain(|i| i.id != id);
        let removed = stored || self.items.len() != before;
        if removed {
            tracing::info!(id, "reading list item deleted");
        }
        Ok(removed)
    }
}
