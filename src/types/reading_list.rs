use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::database::codec::{iso8601, iso8601_opt};

/// An article saved for later reading.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReadingListItem {
    pub id: String,
    pub title: String,
    pub url: String,
    pub excerpt: Option<String>,
    pub thumbnail: Option<String>,
    pub favicon: Option<String>,
    /// Estimated reading time in minutes.
    pub read_time: Option<u32>,
    pub is_read: bool,
    /// When the item was last marked read.
    #[serde(with = "iso8601_opt", default)]
    pub read_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_favorite: bool,
    /// Reading progress in `[0, 1]`.
    pub progress: f64,
    pub offline_content: Option<String>,
    pub is_offline: bool,
    #[serde(with = "iso8601")]
    pub added_at: DateTime<Utc>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewReadingItem {
    pub url: String,
    pub title: String,
    pub excerpt: Option<String>,
    pub thumbnail: Option<String>,
    pub favicon: Option<String>,
    pub tags: Vec<String>,
}

/// Which items `ReadingList::list` returns.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReadingFilter {
    #[default]
    All,
    Unread,
    Read,
    Offline,
    Favorites,
}

/// Text and tag search over the reading list, on top of a [`ReadingFilter`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ReadingSearch {
    /// Case-insensitive substring of title, excerpt or offline content.
    pub query: Option<String>,
    /// Exact tag the item must carry.
    pub tag: Option<String>,
    pub filter: ReadingFilter,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReadingListStats {
    pub total_items: usize,
    pub unread_items: usize,
    pub read_items: usize,
    pub offline_items: usize,
    pub favorite_items: usize,
    pub total_read_time_minutes: u32,
}
