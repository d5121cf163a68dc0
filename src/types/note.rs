use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::database::codec::iso8601;

/// A free-form note, optionally tied to a page or a collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BrowserNote {
    pub id: String,
    pub title: String,
    pub content: String,
    pub url: Option<String>,
    pub screenshot: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub pinned: bool,
    #[serde(with = "iso8601")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "iso8601")]
    pub updated_at: DateTime<Utc>,
    pub collection_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewNote {
    pub title: String,
    pub content: String,
    pub url: Option<String>,
    pub screenshot: Option<String>,
    pub tags: Vec<String>,
    pub pinned: bool,
    pub collection_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NoteUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub url: Option<String>,
    pub screenshot: Option<String>,
    pub tags: Option<Vec<String>>,
    pub collection_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NoteStats {
    pub total_notes: usize,
    pub pinned_notes: usize,
    pub notes_with_url: usize,
    pub distinct_tags: usize,
}
