//! App context for pagekeep.
//!
//! Owns the settings, the shared store handle and every engine. One `App`
//! is built per session and handed to whatever drives it (the RPC binary,
//! tests, an embedding host).

use std::path::PathBuf;
use std::sync::Arc;

use crate::database::Store;
use crate::services::boost_engine::BoostEngine;
use crate::services::collection_engine::CollectionEngine;
use crate::services::link_preview::LinkPreviewFetcher;
use crate::services::note_engine::NoteEngine;
use crate::services::reading_list::ReadingList;
use crate::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use crate::types::settings::{PagekeepSettings, StorageSettings};

pub struct App {
    pub store: Store,
    pub settings_engine: SettingsEngine,
    pub boosts: BoostEngine,
    pub collections: CollectionEngine,
    pub notes: NoteEngine,
    pub reading_list: ReadingList,
    pub previews: Arc<LinkPreviewFetcher>,
    /// Settings the running engines use. `storage` stays as opened.
    applied: PagekeepSettings,
    /// Previews were supplied through [`App::with_previews`].
    custom_previews: bool,
}

impl App {
    /// Loads settings (defaults on failure), opens the configured store and
    /// builds every engine. Never fails: an unusable database leaves the app
    /// running in memory-only mode.
    pub fn new(settings_path: Option<PathBuf>) -> Self {
        let mut settings_engine = SettingsEngine::new(settings_path);
        if let Err(e) = settings_engine.load() {
            tracing::warn!(error = %e, "failed to load settings, using defaults");
        }
        let store = open_store(&settings_engine.get_settings().storage);
        Self::from_parts(settings_engine, store)
    }

    /// Builds the engines over an already opened store.
    pub fn from_parts(settings_engine: SettingsEngine, store: Store) -> Self {
        let settings = settings_engine.get_settings().clone();
        let previews = Arc::new(LinkPreviewFetcher::new(&settings.preview));
        Self {
            boosts: BoostEngine::new(store.clone()),
            collections: CollectionEngine::new(store.clone(), settings.collections.clone()),
            notes: NoteEngine::new(store.clone()),
            reading_list: ReadingList::new(store.clone(), settings.reading.clone()),
            previews,
            store,
            settings_engine,
            applied: settings,
            custom_previews: false,
        }
    }

    /// Replaces the link preview fetcher, e.g. with one over a fake fetcher.
    pub fn with_previews(mut self, previews: Arc<LinkPreviewFetcher>) -> Self {
        self.previews = previews;
        self.custom_previews = true;
        self
    }

    /// Pushes the current settings into the running engines. Returns `true`
    /// while the saved storage settings differ from the ones the store was
    /// opened with; those only take effect on restart.
    pub fn apply_settings(&mut self) -> bool {
        let settings = self.settings_engine.get_settings().clone();
        if settings == self.applied {
            return false;
        }

        self.collections.update_settings(settings.collections.clone());
        self.reading_list.update_settings(settings.reading.clone());
        if settings.preview != self.applied.preview {
            self.previews = Arc::new(if self.custom_previews {
                self.previews.reconfigured(&settings.preview)
            } else {
                LinkPreviewFetcher::new(&settings.preview)
            });
            tracing::debug!("link preview cache rebuilt");
        }

        let restart_required = settings.storage != self.applied.storage;
        if restart_required {
            tracing::info!("storage settings change takes effect on restart");
        }
        self.applied = PagekeepSettings {
            storage: self.applied.storage.clone(),
            ..settings
        };
        restart_required
    }

    /// `true` when nothing is being persisted this session.
    pub fn is_degraded(&self) -> bool {
        self.store.is_degraded()
    }
}

/// Opens the store described by `storage`.
///
/// An explicit `database_path` wins over `database_name`.
pub fn open_store(storage: &StorageSettings) -> Store {
    if storage.memory_only {
        return Store::memory_only("memory-only mode configured");
    }
    match &storage.database_path {
        Some(path) => Store::open(path),
        None => Store::open_named(&storage.database_name),
    }
}
