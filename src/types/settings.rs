use serde::{Deserialize, Serialize};

/// Largest accepted `reading.read_threshold`.
pub const MAX_READ_THRESHOLD: f64 = 0.9;

/// Top-level configuration container.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct PagekeepSettings {
    pub storage: StorageSettings,
    pub preview: PreviewSettings,
    pub collections: CollectionSettings,
    pub reading: ReadingSettings,
}

impl PagekeepSettings {
    /// Checks cross-field limits that serde cannot express.
    pub fn validate(&self) -> Result<(), String> {
        if !self.reading.has_valid_read_threshold() {
            return Err(format!(
                "reading.read_threshold must be in (0, {}], got {}",
                MAX_READ_THRESHOLD, self.reading.read_threshold
            ));
        }
        Ok(())
    }
}

/// Where and how records are persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageSettings {
    /// Database name; resolved to `<data dir>/pagekeep/<name>.db`.
    pub database_name: String,
    /// Explicit database path, overrides `database_name` when set.
    pub database_path: Option<String>,
    /// Skip the database entirely and keep everything in memory.
    pub memory_only: bool,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            database_name: "pagekeep".to_string(),
            database_path: None,
            memory_only: false,
        }
    }
}

/// Link preview fetching and caching.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PreviewSettings {
    pub cache_ttl_secs: u64,
    pub cache_capacity: u64,
    pub fetch_timeout_secs: u64,
    pub max_body_bytes: usize,
    pub max_redirects: usize,
    pub user_agent: String,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            cache_ttl_secs: 24 * 60 * 60,
            cache_capacity: 500,
            fetch_timeout_secs: 10,
            max_body_bytes: 2 * 1024 * 1024,
            max_redirects: 5,
            user_agent: format!("pagekeep/{} (link preview)", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Collection sharing and presentation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CollectionSettings {
    pub share_base_url: String,
    pub selected_text_title_chars: usize,
}

impl Default for CollectionSettings {
    fn default() -> Self {
        Self {
            share_base_url: "https://pagekeep.app/c".to_string(),
            selected_text_title_chars: 50,
        }
    }
}

/// Reading list derivation rules.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReadingSettings {
    pub words_per_minute: u32,
    pub excerpt_chars: usize,
    /// Progress above which an item is marked read.
    pub read_threshold: f64,
}

impl Default for ReadingSettings {
    fn default() -> Self {
        Self {
            words_per_minute: 200,
            excerpt_chars: 200,
            read_threshold: 0.9,
        }
    }
}

impl ReadingSettings {
    pub fn has_valid_read_threshold(&self) -> bool {
        self.read_threshold > 0.0 && self.read_threshold <= MAX_READ_THRESHOLD
    }

    /// `read_threshold` when it is in `(0, 0.9]`, otherwise 0.9.
    pub fn effective_read_threshold(&self) -> f64 {
        if self.has_valid_read_threshold() {
            self.read_threshold
        } else {
            MAX_READ_THRESHOLD
        }
    }
}
