use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::database::codec::iso8601;

/// An ordered group of saved items.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub color: String,
    #[serde(default)]
    pub items: Vec<CollectionItem>,
    #[serde(default)]
    pub is_shared: bool,
    pub share_url: Option<String>,
    #[serde(with = "iso8601")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "iso8601")]
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Kind of content held by a collection item.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CollectionItemType {
    Link,
    Note,
    Image,
    Text,
    Screenshot,
}

impl fmt::Display for CollectionItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CollectionItemType::Link => "link",
            CollectionItemType::Note => "note",
            CollectionItemType::Image => "image",
            CollectionItemType::Text => "text",
            CollectionItemType::Screenshot => "screenshot",
        };
        f.write_str(name)
    }
}

/// A single entry of a collection. `position` is its 0-based index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CollectionItem {
    pub id: String,
    #[serde(rename = "type")]
    pub item_type: CollectionItemType,
    pub title: String,
    pub url: Option<String>,
    pub content: Option<String>,
    pub image: Option<String>,
    pub thumbnail: Option<String>,
    pub favicon: Option<String>,
    pub source_url: Option<String>,
    pub position: u32,
    #[serde(with = "iso8601")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

/// Fields accepted by `add_item`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCollectionItem {
    #[serde(rename = "type")]
    pub item_type: CollectionItemType,
    pub title: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub favicon: Option<String>,
    #[serde(default)]
    pub source_url: Option<String>,
}

impl NewCollectionItem {
    /// Bare item of the given type; optional fields can be set afterwards.
    pub fn new(item_type: CollectionItemType, title: impl Into<String>) -> Self {
        Self {
            item_type,
            title: title.into(),
            url: None,
            content: None,
            image: None,
            thumbnail: None,
            favicon: None,
            source_url: None,
        }
    }
}

/// Partial update for a collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CollectionUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Partial update for a collection item.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CollectionItemUpdate {
    pub title: Option<String>,
    pub url: Option<String>,
    pub content: Option<String>,
    pub thumbnail: Option<String>,
}

/// Kind of annotation attached to an item.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationType {
    Highlight,
    Note,
    Drawing,
}

/// A highlight, note or drawing owned by one collection item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub id: String,
    #[serde(rename = "type")]
    pub annotation_type: AnnotationType,
    pub selected_text: Option<String>,
    pub note: Option<String>,
    pub color: String,
    pub position: u32,
    pub selector: Option<String>,
    #[serde(with = "iso8601")]
    pub created_at: DateTime<Utc>,
}

/// Fields accepted by `add_annotation`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAnnotation {
    #[serde(rename = "type")]
    pub annotation_type: AnnotationType,
    #[serde(default)]
    pub selected_text: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub position: u32,
    #[serde(default)]
    pub selector: Option<String>,
}

/// Output formats supported by collection export.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Html,
    Markdown,
    Csv,
    Bookmarks,
}

impl ExportFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "json" => Some(ExportFormat::Json),
            "html" => Some(ExportFormat::Html),
            "markdown" | "md" => Some(ExportFormat::Markdown),
            "csv" => Some(ExportFormat::Csv),
            "bookmarks" | "netscape" => Some(ExportFormat::Bookmarks),
            _ => None,
        }
    }
}

/// One hit returned by collection search.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSearchHit {
    pub collection_id: String,
    pub collection_name: String,
    /// `None` when the collection itself matched.
    pub item_id: Option<String>,
    pub title: String,
    pub url: Option<String>,
}

/// Aggregate numbers across all collections.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CollectionStats {
    pub total_collections: usize,
    pub total_items: usize,
    pub shared_collections: usize,
    pub total_annotations: usize,
    pub items_by_type: HashMap<String, usize>,
}
