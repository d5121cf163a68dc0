//! Notes Engine for pagekeep.
//!
//! Free-form notes, optionally tied to a page address or a collection.

use std::cmp::Reverse;
use std::collections::BTreeSet;

use uuid::Uuid;

use crate::database::{codec, Store};
use crate::types::errors::NoteError;
use crate::types::note::{BrowserNote, NewNote, NoteStats, NoteUpdate};

/// Trait defining note operations.
pub trait NoteEngineTrait {
    fn create(&mut self, new_note: NewNote) -> Result<BrowserNote, NoteError>;
    fn get(&self, id: &str) -> Option<&BrowserNote>;
    /// Pinned notes first, each group most recently updated first.
    fn list(&self) -> Vec<&BrowserNote>;
    fn update(&mut self, id: &str, update: NoteUpdate) -> Result<BrowserNote, NoteError>;
    fn delete(&mut self, id: &str) -> Result<bool, NoteError>;
    fn toggle_pinned(&mut self, id: &str) -> Result<bool, NoteError>;
    fn search(&self, query: &str) -> Vec<&BrowserNote>;
}

pub struct NoteEngine {
    store: Store,
    notes: Vec<BrowserNote>,
}

impl NoteEngine {
    pub fn new(store: Store) -> Self {
        let notes: Vec<BrowserNote> = store.load_or_empty();
        tracing::debug!(count = notes.len(), "notes loaded");
        Self { store, notes }
    }

    pub fn is_degraded(&self) -> bool {
        self.store.is_degraded()
    }

    /// Notes attached to `url`.
    ///
    /// Served from the store's url index; a degraded store falls back to
    /// scanning memory.
    pub fn for_url(&self, url: &str) -> Result<Vec<BrowserNote>, NoteError> {
        if self.store.is_degraded() {
            return Ok(sorted(self.notes.iter().filter(|n| n.url.as_deref() == Some(url)))
                .into_iter()
                .cloned()
                .collect());
        }
        let found: Vec<BrowserNote> = self.store.find_by_index("url", &url)?;
        let ids: Vec<&str> = found.iter().map(|n| n.id.as_str()).collect();
        Ok(sorted(self.notes.iter().filter(|n| ids.contains(&n.id.as_str())))
            .into_iter()
            .cloned()
            .collect())
    }

    pub fn for_collection(&self, collection_id: &str) -> Vec<&BrowserNote> {
        sorted(
            self.notes
                .iter()
                .filter(|n| n.collection_id.as_deref() == Some(collection_id)),
        )
    }

    /// Every tag in use, sorted and de-duplicated.
    pub fn all_tags(&self) -> Vec<String> {
        self.notes
            .iter()
            .flat_map(|n| n.tags.iter().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn stats(&self) -> NoteStats {
        NoteStats {
            total_notes: self.notes.len(),
            pinned_notes: self.notes.iter().filter(|n| n.pinned).count(),
            notes_with_url: self.notes.iter().filter(|n| n.url.is_some()).count(),
            distinct_tags: self.all_tags().len(),
        }
    }

    fn position(&self, id: &str) -> Result<usize, NoteError> {
        self.notes
            .iter()
            .position(|n| n.id == id)
            .ok_or_else(|| NoteError::NotFound(id.to_string()))
    }

    fn commit(&mut self, index: usize, note: BrowserNote) -> Result<BrowserNote, NoteError> {
        self.store.put(&note)?;
        self.notes[index] = note.clone();
        Ok(note)
    }
}

fn sorted<'a>(notes: impl Iterator<Item = &'a BrowserNote>) -> Vec<&'a BrowserNote> {
    let mut notes: Vec<&BrowserNote> = notes.collect();
    notes.sort_by_key(|n| (Reverse(n.pinned), Reverse(n.updated_at)));
    notes
}

impl NoteEngineTrait for NoteEngine {
    fn create(&mut self, new_note: NewNote) -> Result<BrowserNote, NoteError> {
        let now = codec::now();
        let note = BrowserNote {
            id: Uuid::new_v4().to_string(),
            title: new_note.title,
            content: new_note.content,
            url: new_note.url,
            screenshot: new_note.screenshot,
            tags: new_note.tags,
            pinned: new_note.pinned,
            created_at: now,
            updated_at: now,
            collection_id: new_note.collection_id,
        };

        self.store.put(&note)?;
        self.notes.push(note.clone());
        tracing::info!(id = %note.id, "note created");
        Ok(note)
    }

    fn get(&self, id: &str) -> Option<&BrowserNote> {
        self.notes.iter().find(|n| n.id == id)
    }

    fn list(&self) -> Vec<&BrowserNote> {
        sorted(self.notes.iter())
    }

    fn update(&mut self, id: &str, update: NoteUpdate) -> Result<BrowserNote, NoteError> {
        let index = self.position(id)?;
        let mut note = self.notes[index].clone();
        if let Some(title) = update.title {
            note.title = title;
        }
        if let Some(content) = update.content {
            note.content = content;
        }
        if let Some(url) = update.url {
            note.url = Some(url);
        }
        if let Some(screenshot) = update.screenshot {
            note.screenshot = Some(screenshot);
        }
        if let Some(tags) = update.tags {
            note.tags = tags;
        }
        if let Some(collection_id) = update.collection_id {
            note.collection_id = Some(collection_id);
        }
        note.updated_at = codec::now().max(note.created_at);
        self.commit(index, note)
    }

    fn delete(&mut self, id: &str) -> Result<bool, NoteError> {
        let stored = self.store.delete::<BrowserNote>(id)?;
        let before = self.notes.len();
        self.notes.retain(|n| n.id != id);
        let removed = stored || self.notes.len() != before;
        if removed {
            tracing::info!(id, "note deleted");
        }
        Ok(removed)
    }

    fn toggle_pinned(&mut self, id: &str) -> Result<bool, NoteError> {
        let index = self.position(id)?;
        let mut note = self.notes[index].clone();
        note.pinned = !note.pinned;
        note.updated_at = codec::now().max(note.created_at);
        Ok(self.commit(index, note)?.pinned)
    }

    /// Case-insensitive substring match on title, content or any tag.
    fn search(&self, query: &str) -> Vec<&BrowserNote> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return self.list();
        }
        sorted(self.notes.iter().filter(|n| {
            n.title.to_lowercase().contains(&query)
                || n.content.to_lowercase().contains(&query)
                || n.tags.iter().any(|t| t.to_lowercase().contains(&query))
        }))
    }
}
