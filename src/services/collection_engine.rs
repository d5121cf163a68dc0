//! Collections Engine for pagekeep.
//!
//! Implements `CollectionEngineTrait`: ordered groups of saved links, notes,
//! screenshots and text clippings with annotations, plus export in several
//! formats, JSON import, sharing, search and statistics.
//!
//! Item positions are always dense: after every operation the items of a
//! collection are numbered `0..n` in stored order.

use std::collections::HashMap;
use std::fmt::Write as _;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use ring::rand::{SecureRandom, SystemRandom};
use url::Url;
use uuid::Uuid;

use crate::database::{codec, Store};
use crate::services::page_text::truncate_with_ellipsis;
use crate::types::collection::{
    Annotation, Collection, CollectionItem, CollectionItemType, CollectionItemUpdate,
    CollectionSearchHit, CollectionStats, CollectionUpdate, ExportFormat, NewAnnotation,
    NewCollectionItem,
};
use crate::types::errors::CollectionError;
use crate::types::settings::CollectionSettings;

/// Colors handed out to new collections in rotation.
pub const COLLECTION_PALETTE: [&str; 8] = [
    "#3B82F6", "#10B981", "#F59E0B", "#EF4444", "#8B5CF6", "#EC4899", "#14B8A6", "#6366F1",
];

pub const DEFAULT_ANNOTATION_COLOR: &str = "#FDE047";

const SHARE_TOKEN_BYTES: usize = 16;

/// Trait defining collection management operations.
pub trait CollectionEngineTrait {
    fn create(&mut self, name: &str, description: Option<&str>) -> Result<Collection, CollectionError>;
    fn get(&self, id: &str) -> Option<&Collection>;
    /// All collections, most recently updated first.
    fn list(&self) -> Vec<&Collection>;
    fn update(&mut self, id: &str, update: CollectionUpdate) -> Result<Collection, CollectionError>;
    fn delete(&mut self, id: &str) -> Result<bool, CollectionError>;
    fn add_item(
        &mut self,
        collection_id: &str,
        item: NewCollectionItem,
    ) -> Result<CollectionItem, CollectionError>;
    fn update_item(
        &mut self,
        collection_id: &str,
        item_id: &str,
        update: CollectionItemUpdate,
    ) -> Result<CollectionItem, CollectionError>;
    fn remove_item(&mut self, collection_id: &str, item_id: &str) -> Result<bool, CollectionError>;
    fn reorder_items(
        &mut self,
        collection_id: &str,
        ordered_ids: &[String],
    ) -> Result<Collection, CollectionError>;
    fn add_annotation(
        &mut self,
        collection_id: &str,
        item_id: &str,
        annotation: NewAnnotation,
    ) -> Result<Annotation, CollectionError>;
    fn export(&self, id: &str, format: ExportFormat) -> Result<String, CollectionError>;
}

pub struct CollectionEngine {
    store: Store,
    settings: CollectionSettings,
    collections: Vec<Collection>,
    rng: SystemRandom,
}

impl CollectionEngine {
    /// Creates the engine, loading every stored collection.
    pub fn new(store: Store, settings: CollectionSettings) -> Self {
        let mut collections: Vec<Collection> = store.load_or_empty();
        for collection in &mut collections {
            repack(&mut collection.items);
        }
        tracing::debug!(count = collections.len(), "collections loaded");
        Self {
            store,
            settings,
            collections,
            rng: SystemRandom::new(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.store.is_degraded()
    }

    /// Applies new sharing and titling rules to subsequent operations.
    pub fn update_settings(&mut self, settings: CollectionSettings) {
        self.settings = settings;
    }

    pub fn add_link(
        &mut self,
        collection_id: &str,
        url: &str,
        title: Option<&str>,
        favicon: Option<&str>,
    ) -> Result<CollectionItem, CollectionError> {
        let title = title.map(str::trim).filter(|t| !t.is_empty()).unwrap_or(url);
        let mut item = NewCollectionItem::new(CollectionItemType::Link, title);
        item.url = Some(url.to_string());
        item.favicon = favicon.map(str::to_string);
        self.add_item(collection_id, item)
    }

    pub fn add_note(
        &mut self,
        collection_id: &str,
        title: &str,
        content: &str,
    ) -> Result<CollectionItem, CollectionError> {
        let mut item = NewCollectionItem::new(CollectionItemType::Note, title);
        item.content = Some(content.to_string());
        self.add_item(collection_id, item)
    }

    /// Adds a screenshot; `image` is a data URL or an image address.
    pub fn add_screenshot(
        &mut self,
        collection_id: &str,
        image: &str,
        source_url: Option<&str>,
        title: Option<&str>,
    ) -> Result<CollectionItem, CollectionError> {
        let title = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .or(source_url)
            .unwrap_or("Screenshot");
        let mut item = NewCollectionItem::new(CollectionItemType::Screenshot, title);
        item.image = Some(image.to_string());
        item.thumbnail = Some(image.to_string());
        item.source_url = source_url.map(str::to_string);
        self.add_item(collection_id, item)
    }

    /// Adds a text clipping titled with its first characters.
    pub fn add_selected_text(
        &mut self,
        collection_id: &str,
        text: &str,
        source_url: Option<&str>,
    ) -> Result<CollectionItem, CollectionError> {
        let title = truncate_with_ellipsis(text.trim(), self.settings.selected_text_title_chars);
        let mut item = NewCollectionItem::new(CollectionItemType::Text, title);
        item.content = Some(text.to_string());
        item.url = source_url.map(str::to_string);
        item.source_url = source_url.map(str::to_string);
        self.add_item(collection_id, item)
    }

    /// Moves an item to the end of another collection.
    pub fn move_item(
        &mut self,
        source_id: &str,
        item_id: &str,
        target_id: &str,
    ) -> Result<CollectionItem, CollectionError> {
        let source_index = self.index_of(source_id)?;
        let target_index = self.index_of(target_id)?;

        let mut source = self.collections[source_index].clone();
        let item_pos = source
            .items
            .iter()
            .position(|i| i.id == item_id)
            .ok_or_else(|| CollectionError::ItemNotFound(item_id.to_string()))?;
        if source_index == target_index {
            return Ok(source.items[item_pos].clone());
        }

        let now = codec::now();
        let mut item = source.items.remove(item_pos);
        repack(&mut source.items);
        source.updated_at = now;

        let mut target = self.collections[target_index].clone();
        item.position = target.items.len() as u32;
        target.items.push(item.clone());
        target.updated_at = now;

        self.store.put_all(&[source.clone(), target.clone()])?;
        self.collections[source_index] = source;
        self.collections[target_index] = target;
        tracing::debug!(item_id, source_id, target_id, "collection item moved");
        Ok(item)
    }

    pub fn remove_annotation(
        &mut self,
        collection_id: &str,
        item_id: &str,
        annotation_id: &str,
    ) -> Result<bool, CollectionError> {
        let index = self.index_of(collection_id)?;
        let item = self.collections[index]
            .items
            .iter()
            .find(|i| i.id == item_id)
            .ok_or_else(|| CollectionError::ItemNotFound(item_id.to_string()))?;
        if !item.annotations.iter().any(|a| a.id == annotation_id) {
            return Ok(false);
        }

        self.modify(collection_id, |collection| {
            let item = find_item_mut(collection, item_id)?;
            item.annotations.retain(|a| a.id != annotation_id);
            Ok(true)
        })
    }

    /// Copies a collection and its items under fresh ids.
    pub fn duplicate(&mut self, id: &str) -> Result<Collection, CollectionError> {
        let original = self
            .get(id)
            .ok_or_else(|| CollectionError::NotFound(id.to_string()))?
            .clone();
        let mut copy = with_fresh_ids(original);
        copy.name = format!("{} (copy)", copy.name);

        self.store.put(&copy)?;
        self.collections.push(copy.clone());
        tracing::info!(id = %copy.id, source = id, "collection duplicated");
        Ok(copy)
    }

    /// Imports a collection previously exported as JSON, under fresh ids.
    pub fn import_json(&mut self, data: &str) -> Result<Collection, CollectionError> {
        let incoming: Collection = serde_json::from_str(data)
            .map_err(|e| CollectionError::SerializationError(e.to_string()))?;
        if incoming.name.trim().is_empty() {
            return Err(CollectionError::InvalidName);
        }
        let collection = with_fresh_ids(incoming);

        self.store.put(&collection)?;
        self.collections.push(collection.clone());
        tracing::info!(id = %collection.id, items = collection.items.len(), "collection imported");
        Ok(collection)
    }

    /// Marks a collection shared and returns its share URL. Sharing an
    /// already shared collection returns the existing URL.
    pub fn share(&mut self, id: &str) -> Result<String, CollectionError> {
        if let Some(url) = self.get(id).and_then(|c| c.share_url.clone()) {
            return Ok(url);
        }

        let mut token = [0u8; SHARE_TOKEN_BYTES];
        self.rng
            .fill(&mut token)
            .map_err(|_| CollectionError::ShareFailed("failed to generate share token".to_string()))?;
        let share_url = format!(
            "{}/{}",
            self.settings.share_base_url.trim_end_matches('/'),
            URL_SAFE_NO_PAD.encode(token)
        );

        self.modify(id, |collection| {
            collection.is_shared = true;
            collection.share_url = Some(share_url.clone());
            Ok(())
        })?;
        tracing::info!(id, "collection shared");
        Ok(share_url)
    }

    pub fn unshare(&mut self, id: &str) -> Result<(), CollectionError> {
        self.modify(id, |collection| {
            collection.is_shared = false;
            collection.share_url = None;
            Ok(())
        })
    }

    /// Case-insensitive search over collection names and item title, url
    /// and content.
    pub fn search(&self, query: &str) -> Vec<CollectionSearchHit> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Vec::new();
        }
        let contains = |value: Option<&str>| value.is_some_and(|v| v.to_lowercase().contains(&query));

        let mut hits = Vec::new();
        for collection in &self.collections {
            if contains(Some(collection.name.as_str())) || contains(collection.description.as_deref()) {
                hits.push(CollectionSearchHit {
                    collection_id: collection.id.clone(),
                    collection_name: collection.name.clone(),
                    item_id: None,
                    title: collection.name.clone(),
                    url: None,
                });
            }
            for item in &collection.items {
                if contains(Some(item.title.as_str())) || contains(item.url.as_deref()) || contains(item.content.as_deref()) {
                    hits.push(CollectionSearchHit {
                        collection_id: collection.id.clone(),
                        collection_name: collection.name.clone(),
                        item_id: Some(item.id.clone()),
                        title: item.title.clone(),
                        url: item.url.clone(),
                    });
                }
            }
        }
        hits
    }

    pub fn stats(&self) -> CollectionStats {
        let mut stats = CollectionStats {
            total_collections: self.collections.len(),
            ..CollectionStats::default()
        };
        for collection in &self.collections {
            if collection.is_shared {
                stats.shared_collections += 1;
            }
            stats.total_items += collection.items.len();
            for item in &collection.items {
                stats.total_annotations += item.annotations.len();
                *stats.items_by_type.entry(item.item_type.to_string()).or_insert(0) += 1;
            }
        }
        stats
    }

    fn index_of(&self, id: &str) -> Result<usize, CollectionError> {
        self.collections
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| CollectionError::NotFound(id.to_string()))
    }

    /// Applies `change` to a copy of the collection, bumps `updated_at`,
    /// persists it, then commits it in memory.
    fn modify<R>(
        &mut self,
        id: &str,
        change: impl FnOnce(&mut Collection) -> Result<R, CollectionError>,
    ) -> Result<R, CollectionError> {
        let index = self.index_of(id)?;
        let mut collection = self.collections[index].clone();
        let result = change(&mut collection)?;
        repack(&mut collection.items);
        collection.updated_at = codec::now().max(collection.created_at);

        self.store.put(&collection)?;
        self.collections[index] = collection;
        Ok(result)
    }
}

impl CollectionEngineTrait for CollectionEngine {
    fn create(&mut self, name: &str, description: Option<&str>) -> Result<Collection, CollectionError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CollectionError::InvalidName);
        }
        let now = codec::now();
        let color = COLLECTION_PALETTE[self.collections.len() % COLLECTION_PALETTE.len()];

        let collection = Collection {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            description: description.map(str::to_string),
            color: color.to_string(),
            items: Vec::new(),
            is_shared: false,
            share_url: None,
            created_at: now,
            updated_at: now,
            tags: Vec::new(),
        };

        self.store.put(&collection)?;
        self.collections.push(collection.clone());
        tracing::info!(id = %collection.id, "collection created");
        Ok(collection)
    }

    fn get(&self, id: &str) -> Option<&Collection> {
        self.collections.iter().find(|c| c.id == id)
    }

    fn list(&self) -> Vec<&Collection> {
        let mut collections: Vec<&Collection> = self.collections.iter().collect();
        collections.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        collections
    }

    fn update(&mut self, id: &str, update: CollectionUpdate) -> Result<Collection, CollectionError> {
        if update.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(CollectionError::InvalidName);
        }
        self.modify(id, |collection| {
            if let Some(name) = update.name {
                collection.name = name.trim().to_string();
            }
            if let Some(description) = update.description {
                collection.description = Some(description);
            }
            if let Some(color) = update.color {
                collection.color = color;
            }
            if let Some(tags) = update.tags {
                collection.tags = tags;
            }
            Ok(())
        })?;

        self.get(id)
            .cloned()
            .ok_or_else(|| CollectionError::NotFound(id.to_string()))
    }

    fn delete(&mut self, id: &str) -> Result<bool, CollectionError> {
        let stored = self.store.delete::<Collection>(id)?;
        let before = self.collections.len();
        self.collections.retain(|c| c.id != id);
        let removed = stored || self.collections.len() != before;
        if removed {
            tracing::info!(id, "collection deleted");
        }
        Ok(removed)
    }

    /// Appends an item at `position = items.len()`.
    fn add_item(
        &mut self,
        collection_id: &str,
        item: NewCollectionItem,
    ) -> Result<CollectionItem, CollectionError> {
        self.modify(collection_id, |collection| {
            let item = CollectionItem {
                id: Uuid::new_v4().to_string(),
                item_type: item.item_type,
                title: item.title,
                url: item.url,
                content: item.content,
                image: item.image,
                thumbnail: item.thumbnail,
                favicon: item.favicon,
                source_url: item.source_url,
                position: collection.items.len() as u32,
                created_at: codec::now(),
                annotations: Vec::new(),
            };
            collection.items.push(item.clone());
            Ok(item)
        })
    }

    fn update_item(
        &mut self,
        collection_id: &str,
        item_id: &str,
        update: CollectionItemUpdate,
    ) -> Result<CollectionItem, CollectionError> {
        self.modify(collection_id, |collection| {
            let item = find_item_mut(collection, item_id)?;
            if let Some(title) = update.title {
                item.title = title;
            }
            if let Some(url) = update.url {
                item.url = Some(url);
            }
            if let Some(content) = update.content {
                item.content = Some(content);
            }
            if let Some(thumbnail) = update.thumbnail {
                item.thumbnail = Some(thumbnail);
            }
            Ok(item.clone())
        })
    }

    /// Removes an item and re-packs the remaining positions.
    /// Returns `Ok(false)` without touching the collection when `item_id` is unknown.
    fn remove_item(&mut self, collection_id: &str, item_id: &str) -> Result<bool, CollectionError> {
        let index = self.index_of(collection_id)?;
        if !self.collections[index].items.iter().any(|i| i.id == item_id) {
            return Ok(false);
        }

        self.modify(collection_id, |collection| {
            collection.items.retain(|i| i.id != item_id);
            Ok(true)
        })
    }

    /// Rebuilds the item list in `ordered_ids` order. Items whose ids are not
    /// listed are dropped; unknown and repeated ids are ignored.
    fn reorder_items(
        &mut self,
        collection_id: &str,
        ordered_ids: &[String],
    ) -> Result<Collection, CollectionError> {
        self.modify(collection_id, |collection| {
            let mut by_id: HashMap<String, CollectionItem> = collection
                .items
                .drain(..)
                .map(|item| (item.id.clone(), item))
                .collect();
            for id in ordered_ids {
                if let Some(item) = by_id.remove(id) {
                    collection.items.push(item);
                }
            }
            if !by_id.is_empty() {
                tracing::warn!(
                    collection_id = %collection.id,
                    dropped = by_id.len(),
                    "reorder dropped items missing from the new order"
                );
            }
            Ok(())
        })?;

        self.get(collection_id)
            .cloned()
            .ok_or_else(|| CollectionError::NotFound(collection_id.to_string()))
    }

    fn add_annotation(
        &mut self,
        collection_id: &str,
        item_id: &str,
        annotation: NewAnnotation,
    ) -> Result<Annotation, CollectionError> {
        self.modify(collection_id, |collection| {
            let item = find_item_mut(collection, item_id)?;
            let annotation = Annotation {
                id: Uuid::new_v4().to_string(),
                annotation_type: annotation.annotation_type,
                selected_text: annotation.selected_text,
                note: annotation.note,
                color: annotation
                    .color
                    .unwrap_or_else(|| DEFAULT_ANNOTATION_COLOR.to_string()),
                position: annotation.position,
                selector: annotation.selector,
                created_at: codec::now(),
            };
            item.annotations.push(annotation.clone());
            Ok(annotation)
        })
    }

    fn export(&self, id: &str, format: ExportFormat) -> Result<String, CollectionError> {
        let collection = self
            .get(id)
            .ok_or_else(|| CollectionError::NotFound(id.to_string()))?;
        let mut items: Vec<&CollectionItem> = collection.items.iter().collect();
        items.sort_by_key(|i| i.position);

        match format {
            ExportFormat::Json => serde_json::to_string_pretty(collection)
                .map_err(|e| CollectionError::SerializationError(e.to_string())),
            ExportFormat::Html => Ok(export_html(collection, &items)),
            ExportFormat::Markdown => Ok(export_markdown(collection, &items)),
            ExportFormat::Csv => Ok(export_csv(&items)),
            ExportFormat::Bookmarks => Ok(export_bookmarks(collection, &items)),
        }
    }
}

fn find_item_mut<'a>(
    collection: &'a mut Collection,
    item_id: &str,
) -> Result<&'a mut CollectionItem, CollectionError> {
    collection
        .items
        .iter_mut()
        .find(|i| i.id == item_id)
        .ok_or_else(|| CollectionError::ItemNotFound(item_id.to_string()))
}

fn repack(items: &mut [CollectionItem]) {
    for (position, item) in items.iter_mut().enumerate() {
        item.position = position as u32;
    }
}

fn with_fresh_ids(mut collection: Collection) -> Collection {
    let now = codec::now();
    collection.id = Uuid::new_v4().to_string();
    collection.is_shared = false;
    collection.share_url = None;
    collection.created_at = now;
    collection.updated_at = now;

    collection.items.sort_by_key(|i| i.position);
    for item in &mut collection.items {
        item.id = Uuid::new_v4().to_string();
        for annotation in &mut item.annotations {
            annotation.id = Uuid::new_v4().to_string();
        }
    }
    repack(&mut collection.items);
    collection
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Only web and mail links become `href`s.
fn safe_href(url: &str) -> Option<String> {
    let parsed = Url::parse(url.trim()).ok()?;
    match parsed.scheme() {
        "http" | "https" | "mailto" | "ftp" => Some(escape_html(parsed.as_str())),
        _ => None,
    }
}

/// Image sources may also be inline `data:image/` URLs (screenshots).
fn safe_img_src(src: &str) -> Option<String> {
    let trimmed = src.trim();
    if trimmed.starts_with("data:image/") {
        return Some(escape_html(trimmed));
    }
    safe_href(trimmed)
}

fn item_link(item: &CollectionItem) -> Option<&str> {
    item.url.as_deref().or(item.source_url.as_deref())
}

fn export_html(collection: &Collection, items: &[&CollectionItem]) -> String {
    let name = escape_html(&collection.name);
    let mut out = String::new();
    let _ = writeln!(out, "<!DOCTYPE html>");
    let _ = writeln!(out, "<html lang=\"en\">");
    let _ = writeln!(out, "<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>", name);
    let _ = writeln!(out, "<body>");
    let _ = writeln!(out, "<h1>{}</h1>", name);
    if let Some(description) = &collection.description {
        let _ = writeln!(out, "<p class=\"description\">{}</p>", escape_html(description));
    }
    let _ = writeln!(out, "<ol class=\"items\">");
    for item in items {
        let title = escape_html(&item.title);
        let _ = writeln!(out, "<li class=\"item item-{}\">", item.item_type);
        match item_link(item).and_then(safe_href) {
            Some(href) => {
                let _ = writeln!(out, "<h2><a href=\"{}\">{}</a></h2>", href, title);
            }
            None => {
                let _ = writeln!(out, "<h2>{}</h2>", title);
            }
        }
        if let Some(content) = &item.content {
            let _ = writeln!(out, "<p>{}</p>", escape_html(content));
        }
        if let Some(src) = item.image.as_deref().and_then(safe_img_src) {
            let _ = writeln!(out, "<img src=\"{}\" alt=\"{}\">", src, title);
        }
        if !item.annotations.is_empty() {
            let _ = writeln!(out, "<ul class=\"annotations\">");
            for annotation in &item.annotations {
                let _ = write!(out, "<li>");
                if let Some(text) = &annotation.selected_text {
                    let _ = write!(out, "<mark>{}</mark>", escape_html(text));
                }
                if let Some(note) = &annotation.note {
                    let _ = write!(out, " {}", escape_html(note));
                }
                let _ = writeln!(out, "</li>");
            }
            let _ = writeln!(out, "</ul>");
        }
        let _ = writeln!(out, "</li>");
    }
    let _ = writeln!(out, "</ol>");
    let _ = writeln!(out, "</body>\n</html>");
    out
}

fn export_markdown(collection: &Collection, items: &[&CollectionItem]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {}\n", collection.name);
    if let Some(description) = &collection.description {
        let _ = writeln!(out, "{}\n", description);
    }
    for item in items {
        match item_link(item) {
            Some(url) => {
                let _ = writeln!(out, "## [{}]({})\n", item.title, url);
            }
            None => {
                let _ = writeln!(out, "## {}\n", item.title);
            }
        }
        if let Some(content) = &item.content {
            let _ = writeln!(out, "{}\n", content);
        }
        if let Some(image) = &item.image {
            let _ = writeln!(out, "![{}]({})\n", item.title, image);
        }
        for annotation in &item.annotations {
            if let Some(text) = &annotation.selected_text {
                let _ = writeln!(out, "> {}", text);
            }
            if let Some(note) = &annotation.note {
                let _ = writeln!(out, "- {}", note);
            }
        }
        if !item.annotations.is_empty() {
            out.push('\n');
        }
    }
    out
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn export_csv(items: &[&CollectionItem]) -> String {
    let mut out = String::from("position,type,title,url,content,created_at\n");
    for item in items {
        let row = [
            item.position.to_string(),
            item.item_type.to_string(),
            item.title.clone(),
            item_link(item).unwrap_or_default().to_string(),
            item.content.clone().unwrap_or_default(),
            codec::format_timestamp(&item.created_at),
        ];
        let line: Vec<String> = row.iter().map(|v| csv_field(v)).collect();
        out.push_str(&line.join(","));
        out.push('\n');
    }
    out
}

/// Netscape bookmark file. Items without an address have nothing to link
/// to and are left out.
fn export_bookmarks(collection: &Collection, items: &[&CollectionItem]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "<!DOCTYPE NETSCAPE-Bookmark-file-1>");
    let _ = writeln!(out, "<META HTTP-EQUIV=\"Content-Type\" CONTENT=\"text/html; charset=UTF-8\">");
    let _ = writeln!(out, "<TITLE>Bookmarks</TITLE>");
    let _ = writeln!(out, "<H1>Bookmarks</H1>");
    let _ = writeln!(out, "<DL><p>");
    let _ = writeln!(
        out,
        "    <DT><H3 ADD_DATE=\"{}\" LAST_MODIFIED=\"{}\">{}</H3>",
        collection.created_at.timestamp(),
        collection.updated_at.timestamp(),
        escape_html(&collection.name)
    );
    let _ = writeln!(out, "    <DL><p>");
    for item in items {
        if let Some(href) = item_link(item).and_then(safe_href) {
            let _ = writeln!(
                out,
                "        <DT><A HREF=\"{}\" ADD_DATE=\"{}\">{}</A>",
                href,
                item.created_at.timestamp(),
                escape_html(&item.title)
            );
        }
    }
    let _ = writeln!(out, "    </DL><p>");
    let _ = writeln!(out, "</DL><p>");
    out
}
