//! Boosts Engine for pagekeep.
//!
//! Implements `BoostEngineTrait`: CRUD over per-site CSS/JS customizations,
//! the built-in template catalog, and per-address application with usage
//! counting. Boosts are kept in memory in insertion order and written
//! through to the [`Store`].

use std::collections::{HashMap, VecDeque};

use uuid::Uuid;

use crate::database::{codec, Store};
use crate::services::pattern_matcher::{self, MatchOptions};
use crate::types::boost::{AppliedBoosts, Boost, BoostTemplate, BoostUpdate, NewBoost};
use crate::types::errors::BoostError;

/// Trait defining boost management operations.
pub trait BoostEngineTrait {
    fn create(&mut self, new_boost: NewBoost) -> Result<Boost, BoostError>;
    /// Instantiates a template. Returns `Ok(None)` for unknown template ids.
    fn create_from_template(
        &mut self,
        template_id: &str,
        pattern: Option<&str>,
    ) -> Result<Option<Boost>, BoostError>;
    fn update(&mut self, id: &str, update: BoostUpdate) -> Result<Boost, BoostError>;
    fn toggle(&mut self, id: &str) -> Result<bool, BoostError>;
    fn delete(&mut self, id: &str) -> Result<bool, BoostError>;
    fn get(&self, id: &str) -> Option<&Boost>;
    fn list(&self) -> &[Boost];
    fn get_for_address(&self, address: &str) -> Vec<&Boost>;
    fn apply(&mut self, address: &str) -> Result<AppliedBoosts, BoostError>;
    fn applied_for(&self, address: &str) -> Option<&[String]>;
}

/// Most addresses whose applied boost ids are remembered.
pub const APPLIED_CAPACITY: usize = 256;

pub struct BoostEngine {
    store: Store,
    boosts: Vec<Boost>,
    templates: Vec<BoostTemplate>,
    applied: HashMap<String, Vec<String>>,
    /// Addresses in `applied`, oldest first.
    applied_order: VecDeque<String>,
}

impl BoostEngine {
    /// Creates the engine, loading every stored boost.
    pub fn new(store: Store) -> Self {
        let boosts: Vec<Boost> = store.load_or_empty();
        tracing::debug!(count = boosts.len(), "boosts loaded");
        Self {
            store,
            boosts,
            templates: builtin_templates(),
            applied: HashMap::new(),
            applied_order: VecDeque::new(),
        }
    }

    /// Number of addresses with remembered applied boosts.
    pub fn applied_count(&self) -> usize {
        self.applied.len()
    }

    fn remember_applied(&mut self, address: &str, boost_ids: Vec<String>) {
        if boost_ids.is_empty() {
            self.forget_applied(address);
            return;
        }
        if self.applied.insert(address.to_string(), boost_ids).is_none() {
            self.applied_order.push_back(address.to_string());
        }
        while self.applied_order.len() > APPLIED_CAPACITY {
            if let Some(oldest) = self.applied_order.pop_front() {
                self.applied.remove(&oldest);
            }
        }
    }

    fn forget_applied(&mut self, address: &str) {
        if self.applied.remove(address).is_some() {
            self.applied_order.retain(|a| a != address);
        }
    }

    /// `true` when changes are not being persisted.
    pub fn is_degraded(&self) -> bool {
        self.store.is_degraded()
    }

    pub fn templates(&self) -> &[BoostTemplate] {
        &self.templates
    }

    pub fn templates_by_category(&self, category: &str) -> Vec<&BoostTemplate> {
        self.templates
            .iter()
            .filter(|t| t.category.eq_ignore_ascii_case(category))
            .collect()
    }

    /// Case-insensitive search over name, description, tags and pattern.
    pub fn search(&self, query: &str) -> Vec<&Boost> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return self.boosts.iter().collect();
        }
        self.boosts
            .iter()
            .filter(|b| {
                b.name.to_lowercase().contains(&query)
                    || b.pattern.to_lowercase().contains(&query)
                    || b.description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&query))
                    || b.tags.iter().any(|t| t.to_lowercase().contains(&query))
            })
            .collect()
    }

    pub fn export_json(&self) -> Result<String, BoostError> {
        serde_json::to_string_pretty(&self.boosts)
            .map_err(|e| BoostError::SerializationError(e.to_string()))
    }

    /// Imports boosts exported by [`BoostEngine::export_json`] under fresh ids.
    pub fn import_json(&mut self, data: &str) -> Result<Vec<Boost>, BoostError> {
        let incoming: Vec<Boost> =
            serde_json::from_str(data).map_err(|e| BoostError::SerializationError(e.to_string()))?;

        let now = codec::now();
        let mut imported = Vec::with_capacity(incoming.len());
        for boost in incoming {
            let pattern = validate_pattern(&boost.pattern)?;
            imported.push(Boost {
                id: Uuid::new_v4().to_string(),
                pattern,
                created_at: now,
                updated_at: now,
                use_count: 0,
                ..boost
            });
        }

        self.store.put_all(&imported)?;
        self.boosts.extend(imported.iter().cloned());
        tracing::info!(count = imported.len(), "boosts imported");
        Ok(imported)
    }

    fn position(&self, id: &str) -> Result<usize, BoostError> {
        self.boosts
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| BoostError::NotFound(id.to_string()))
    }

    fn matching_indices(&self, address: &str) -> Vec<usize> {
        self.boosts
            .iter()
            .enumerate()
            .filter(|(_, b)| b.enabled && boost_matches(b, address))
            .map(|(i, _)| i)
            .collect()
    }
}

impl BoostEngineTrait for BoostEngine {
    fn create(&mut self, new_boost: NewBoost) -> Result<Boost, BoostError> {
        let pattern = validate_pattern(&new_boost.pattern)?;
        let name = match new_boost.name.trim() {
            "" => pattern.clone(),
            name => name.to_string(),
        };
        let now = codec::now();

        let boost = Boost {
            id: Uuid::new_v4().to_string(),
            name,
            pattern,
            css: new_boost.css,
            js: new_boost.js,
            enabled: true,
            include_subdomains: new_boost.include_subdomains.unwrap_or(true),
            created_at: now,
            updated_at: now,
            description: new_boost.description,
            tags: new_boost.tags,
            use_count: 0,
        };

        self.store.put(&boost)?;
        self.boosts.push(boost.clone());
        tracing::info!(id = %boost.id, pattern = %boost.pattern, "boost created");
        Ok(boost)
    }

    fn create_from_template(
        &mut self,
        template_id: &str,
        pattern: Option<&str>,
    ) -> Result<Option<Boost>, BoostError> {
        let Some(index) = self.templates.iter().position(|t| t.id == template_id) else {
            tracing::debug!(template_id, "unknown boost template");
            return Ok(None);
        };

        let template = self.templates[index].clone();
        let pattern = pattern
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .unwrap_or(&template.pattern)
            .to_string();

        let boost = self.create(NewBoost {
            name: template.name.clone(),
            pattern,
            css: Some(template.css.clone()),
            js: template.js.clone(),
            include_subdomains: Some(true),
            description: Some(format!("Created from the \"{}\" template", template.name)),
            tags: vec![template.category.clone()],
        })?;

        self.templates[index].downloads += 1;
        Ok(Some(boost))
    }

    fn update(&mut self, id: &str, update: BoostUpdate) -> Result<Boost, BoostError> {
        let index = self.position(id)?;
        let pattern = update.pattern.as_deref().map(validate_pattern).transpose()?;

        let mut boost = self.boosts[index].clone();
        if let Some(name) = update.name {
            boost.name = name;
        }
        if let Some(pattern) = pattern {
            boost.pattern = pattern;
        }
        if let Some(css) = update.css {
            boost.css = Some(css);
        }
        if let Some(js) = update.js {
            boost.js = Some(js);
        }
        if let Some(enabled) = update.enabled {
            boost.enabled = enabled;
        }
        if let Some(include_subdomains) = update.include_subdomains {
            boost.include_subdomains = include_subdomains;
        }
        if let Some(description) = update.description {
            boost.description = Some(description);
        }
        if let Some(tags) = update.tags {
            boost.tags = tags;
        }
        boost.updated_at = codec::now().max(boost.created_at);

        self.store.put(&boost)?;
        self.boosts[index] = boost.clone();
        Ok(boost)
    }

    fn toggle(&mut self, id: &str) -> Result<bool, BoostError> {
        let index = self.position(id)?;
        let mut boost = self.boosts[index].clone();
        boost.enabled = !boost.enabled;
        boost.updated_at = codec::now().max(boost.created_at);

        self.store.put(&boost)?;
        let enabled = boost.enabled;
        self.boosts[index] = boost;
        tracing::debug!(id, enabled, "boost toggled");
        Ok(enabled)
    }

    fn delete(&mut self, id: &str) -> Result<bool, BoostError> {
        let stored = self.store.delete::<Boost>(id)?;
        let before = self.boosts.len();
        self.boosts.retain(|b| b.id != id);
        for ids in self.applied.values_mut() {
            ids.retain(|applied_id| applied_id != id);
        }
        self.applied.retain(|_, ids| !ids.is_empty());
        let applied = &self.applied;
        self.applied_order.retain(|address| applied.contains_key(address));

        let removed = stored || self.boosts.len() != before;
        if removed {
            tracing::info!(id, "boost deleted");
        }
        Ok(removed)
    }

    fn get(&self, id: &str) -> Option<&Boost> {
        self.boosts.iter().find(|b| b.id == id)
    }

    fn list(&self) -> &[Boost] {
        &self.boosts
    }

    /// Enabled boosts matching `address`, in insertion order.
    fn get_for_address(&self, address: &str) -> Vec<&Boost> {
        self.matching_indices(address)
            .into_iter()
            .map(|i| &self.boosts[i])
            .collect()
    }

    /// Concatenates the code of every matching boost in insertion order, so
    /// later boosts win CSS conflicts. Each match counts as one use.
    fn apply(&mut self, address: &str) -> Result<AppliedBoosts, BoostError> {
        let indices = self.matching_indices(address);

        let mut css_chunks = Vec::new();
        let mut js_chunks = Vec::new();
        let mut used = Vec::with_capacity(indices.len());
        for &i in &indices {
            let mut boost = self.boosts[i].clone();
            let label = comment_safe(&boost.name);
            if let Some(css) = boost.css.as_deref().filter(|c| !c.trim().is_empty()) {
                css_chunks.push(format!("/* Boost: {} */\n{}", label, css));
            }
            if let Some(js) = boost.js.as_deref().filter(|j| !j.trim().is_empty()) {
                js_chunks.push(format!("// Boost: {}\n{}", label, js));
            }
            boost.use_count += 1;
            used.push(boost);
        }

        self.store.put_all(&used)?;

        let boost_ids: Vec<String> = used.iter().map(|b| b.id.clone()).collect();
        for (&i, boost) in indices.iter().zip(used) {
            self.boosts[i] = boost;
        }
        self.remember_applied(address, boost_ids.clone());
        tracing::debug!(address, applied = boost_ids.len(), "boosts applied");

        Ok(AppliedBoosts {
            css: css_chunks.join("\n"),
            js: js_chunks.join("\n"),
            boost_ids,
        })
    }

    /// Ids applied by the last [`BoostEngineTrait::apply`] call for `address`,
    /// `None` when nothing matched or the address has been evicted.
    fn applied_for(&self, address: &str) -> Option<&[String]> {
        self.applied.get(address).map(Vec::as_slice)
    }
}

fn validate_pattern(pattern: &str) -> Result<String, BoostError> {
    let trimmed = pattern.trim();
    if trimmed.is_empty() {
        return Err(BoostError::InvalidPattern(pattern.to_string()));
    }
    Ok(trimmed.to_string())
}

fn boost_matches(boost: &Boost, address: &str) -> bool {
    pattern_matcher::matches_with(
        address,
        &boost.pattern,
        MatchOptions {
            include_subdomains: boost.include_subdomains,
        },
    )
}

/// Boost names go into code comments; keep them from closing the comment.
fn comment_safe(name: &str) -> String {
    name.replace("*/", "* /").replace(['\n', '\r'], " ")
}

fn builtin_templates() -> Vec<BoostTemplate> {
    let template = |id: &str, name: &str, category: &str, pattern: &str, css: &str, js: Option<&str>, downloads: u64, rating: f32| {
        BoostTemplate {
            id: id.to_string(),
            name: name.to_string(),
            category: category.to_string(),
            pattern: pattern.to_string(),
            css: css.to_string(),
            js: js.map(str::to_string),
            downloads,
            rating,
        }
    };

    vec![
        template(
            "dark-mode",
            "Dark Mode",
            "appearance",
            "*",
            "html { filter: invert(1) hue-rotate(180deg); background: #111; }\nimg, video, picture, svg { filter: invert(1) hue-rotate(180deg); }",
            None,
            12840,
            4.6,
        ),
        template(
            "readable-width",
            "Readable Width",
            "reading",
            "*",
            "body { max-width: 72ch; margin: 0 auto !important; line-height: 1.6; }",
            None,
            5310,
            4.3,
        ),
        template(
            "larger-text",
            "Larger Text",
            "accessibility",
            "*",
            "html { font-size: 118% !important; }",
            None,
            4120,
            4.4,
        ),
        template(
            "hide-youtube-comments",
            "Hide YouTube Comments",
            "focus",
            "youtube.com",
            "#comments, ytd-comments { display: none !important; }",
            None,
            8702,
            4.5,
        ),
        template(
            "hide-youtube-shorts",
            "Hide YouTube Shorts",
            "focus",
            "youtube.com",
            "ytd-reel-shelf-renderer, ytd-rich-shelf-renderer[is-shorts] { display: none !important; }",
            None,
            7391,
            4.7,
        ),
        template(
            "wide-github",
            "Wide GitHub",
            "productivity",
            "github.com",
            ".container-xl, .container-lg { max-width: 100% !important; }",
            None,
            2954,
            4.2,
        ),
        template(
            "dismiss-cookie-banners",
            "Dismiss Cookie Banners",
            "privacy",
            "*",
            "#onetrust-banner-sdk, .cc-window, #CybotCookiebotDialog { display: none !important; }",
            Some("document.querySelectorAll('[aria-label*=\"cookie\" i] button').forEach(function (b) { if (/reject|decline/i.test(b.textContent)) b.click(); });"),
            6188,
            4.1,
        ),
    ]
}
