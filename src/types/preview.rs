use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::database::codec::iso8601;

/// Metadata describing a linked page. Lives only in the preview cache.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LinkPreview {
    pub url: String,
    pub title: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub favicon: Option<String>,
    pub site_name: Option<String>,
    #[serde(rename = "type")]
    pub page_type: Option<String>,
    pub author: Option<String>,
    pub published_date: Option<String>,
    #[serde(with = "iso8601")]
    pub fetched_at: DateTime<Utc>,
}

/// Metadata pulled out of an HTML document before it becomes a preview.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub favicon: Option<String>,
    pub site_name: Option<String>,
    pub page_type: Option<String>,
    pub author: Option<String>,
    pub published_date: Option<String>,
}
