use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::database::codec::iso8601;

/// A user-defined CSS/JS customization applied to pages matching `pattern`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Boost {
    pub id: String,
    pub name: String,
    /// Address pattern, see `services::pattern_matcher`.
    pub pattern: String,
    pub css: Option<String>,
    pub js: Option<String>,
    pub enabled: bool,
    pub include_subdomains: bool,
    #[serde(with = "iso8601")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "iso8601")]
    pub updated_at: DateTime<Utc>,
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub use_count: u64,
}

/// Fields accepted when creating a boost.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewBoost {
    pub name: String,
    pub pattern: String,
    pub css: Option<String>,
    pub js: Option<String>,
    pub include_subdomains: Option<bool>,
    pub description: Option<String>,
    pub tags: Vec<String>,
}

/// Partial update for an existing boost. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BoostUpdate {
    pub name: Option<String>,
    pub pattern: Option<String>,
    pub css: Option<String>,
    pub js: Option<String>,
    pub enabled: Option<bool>,
    pub include_subdomains: Option<bool>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Read-only catalog entry used to instantiate boosts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BoostTemplate {
    pub id: String,
    pub name: String,
    pub category: String,
    pub pattern: String,
    pub css: String,
    pub js: Option<String>,
    pub downloads: u64,
    pub rating: f32,
}

/// Combined code of every boost applied to one address.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppliedBoosts {
    pub css: String,
    pub js: String,
    pub boost_ids: Vec<String>,
}
