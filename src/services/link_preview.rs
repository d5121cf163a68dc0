//! Link preview fetching with a TTL cache and in-flight de-duplication.
//!
//! [`LinkPreviewFetcher::get_preview`] is the only entry point. Concurrent
//! callers asking for the same address share one fetch; results are kept in
//! a `mini_moka` cache for the configured TTL. A failed fetch still yields a
//! minimal preview built from the host name, which is not cached so the next
//! call tries again.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use mini_moka::sync::{Cache, ConcurrentCacheExt};
use tokio::sync::OnceCell;
use url::Url;

use crate::database::codec;
use crate::services::html_meta;
use crate::types::errors::PreviewError;
use crate::types::preview::LinkPreview;
use crate::types::settings::PreviewSettings;

/// A fetched HTML document.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Address after redirects; relative links resolve against it.
    pub final_url: Url,
    pub body: String,
}

/// Source of page bodies. Implemented over HTTP in production and by
/// in-memory fakes in tests.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, PreviewError>;
}

/// `reqwest`-backed fetcher with a timeout, redirect limit and body cap.
pub struct HttpPageFetcher {
    client: reqwest::Client,
    timeout: Duration,
    max_body_bytes: usize,
}

impl HttpPageFetcher {
    pub fn new(settings: &PreviewSettings) -> Self {
        let timeout = Duration::from_secs(settings.fetch_timeout_secs.max(1));
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(settings.user_agent.clone())
            .redirect(reqwest::redirect::Policy::limited(settings.max_redirects))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "failed to build preview http client, using defaults");
                reqwest::Client::new()
            });

        Self {
            client,
            timeout,
            max_body_bytes: settings.max_body_bytes,
        }
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, PreviewError> {
        // Per-request timeout as well, in case the client fell back to defaults.
        let mut response = self
            .client
            .get(url.as_str())
            .header(reqwest::header::ACCEPT, "text/html,application/xhtml+xml")
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| PreviewError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PreviewError::HttpStatus(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_ascii_lowercase();
        if !content_type.is_empty()
            && !content_type.contains("text/html")
            && !content_type.contains("application/xhtml")
        {
            return Err(PreviewError::NotHtml(content_type));
        }

        if let Some(length) = response.content_length() {
            if length > self.max_body_bytes as u64 {
                return Err(PreviewError::TooLarge(length as usize));
            }
        }

        let final_url = response.url().clone();
        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| PreviewError::NetworkError(e.to_string()))?
        {
            body.extend_from_slice(&chunk);
            if body.len() > self.max_body_bytes {
                return Err(PreviewError::TooLarge(body.len()));
            }
        }

        Ok(FetchedPage {
            final_url,
            body: String::from_utf8_lossy(&body).into_owned(),
        })
    }
}

type PendingMap = Mutex<HashMap<String, Arc<OnceCell<LinkPreview>>>>;

/// Removes a pending entry when the fetch that owns it finishes, fails or is
/// cancelled.
struct PendingGuard<'a> {
    pending: &'a PendingMap,
    key: &'a str,
    cell: &'a Arc<OnceCell<LinkPreview>>,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        let mut pending = self.pending.lock().unwrap_or_else(|p| p.into_inner());
        if pending
            .get(self.key)
            .is_some_and(|current| Arc::ptr_eq(current, self.cell))
        {
            pending.remove(self.key);
        }
    }
}

pub struct LinkPreviewFetcher {
    fetcher: Arc<dyn PageFetcher>,
    cache: Cache<String, LinkPreview>,
    pending: PendingMap,
}

impl LinkPreviewFetcher {
    /// Fetcher over HTTP configured from `settings`.
    pub fn new(settings: &PreviewSettings) -> Self {
        Self::with_fetcher(Arc::new(HttpPageFetcher::new(settings)), settings)
    }

    pub fn with_fetcher(fetcher: Arc<dyn PageFetcher>, settings: &PreviewSettings) -> Self {
        let cache = Cache::builder()
            .max_capacity(settings.cache_capacity)
            .time_to_live(Duration::from_secs(settings.cache_ttl_secs))
            .build();

        Self {
            fetcher,
            cache,
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Same page source with a fresh cache sized and aged by `settings`.
    pub fn reconfigured(&self, settings: &PreviewSettings) -> Self {
        Self::with_fetcher(self.fetcher.clone(), settings)
    }

    /// Returns a preview for `url`, or `None` if it is not an http(s) address.
    pub async fn get_preview(&self, url: &str) -> Option<LinkPreview> {
        let parsed = match parse_web_url(url) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::debug!(error = %e, "preview skipped");
                return None;
            }
        };
        let key = parsed.to_string();

        if let Some(hit) = self.cache.get(&key) {
            return Some(hit);
        }

        let cell = {
            let mut pending = self.pending.lock().unwrap_or_else(|p| p.into_inner());
            pending
                .entry(key.clone())
                .or_insert_with(|| Arc::new(OnceCell::new()))
                .clone()
        };

        let preview = cell
            .get_or_init(|| async {
                let _guard = PendingGuard {
                    pending: &self.pending,
                    key: &key,
                    cell: &cell,
                };
                if let Some(hit) = self.cache.get(&key) {
                    return hit;
                }
                match self.fetcher.fetch(&parsed).await {
                    Ok(page) => {
                        let preview = build_preview(&key, &page);
                        self.cache.insert(key.clone(), preview.clone());
                        tracing::debug!(url = %key, "preview fetched");
                        preview
                    }
                    Err(e) => {
                        tracing::warn!(url = %key, error = %e, "preview fetch failed, using fallback");
                        fallback_preview(&key, &parsed)
                    }
                }
            })
            .await;

        Some(preview.clone())
    }

    /// Drops the cached preview for `url`, if any.
    pub fn invalidate(&self, url: &str) {
        if let Ok(parsed) = parse_web_url(url) {
            self.cache.invalidate(&parsed.to_string());
        }
    }

    pub fn clear_cache(&self) {
        self.cache.invalidate_all();
        self.cache.sync();
    }

    pub fn cached_count(&self) -> u64 {
        self.cache.sync();
        self.cache.entry_count()
    }
}

fn parse_web_url(url: &str) -> Result<Url, PreviewError> {
    let parsed = Url::parse(url.trim()).map_err(|e| PreviewError::InvalidUrl(format!("{}: {}", url, e)))?;
    match parsed.scheme() {
        "http" | "https" if parsed.host_str().is_some() => Ok(parsed),
        _ => Err(PreviewError::InvalidUrl(url.to_string())),
    }
}

fn display_host(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    host.strip_prefix("www.").unwrap_or(host).to_string()
}

fn build_preview(key: &str, page: &FetchedPage) -> LinkPreview {
    let meta = html_meta::extract(&page.body, &page.final_url);
    LinkPreview {
        url: key.to_string(),
        title: meta.title.unwrap_or_else(|| display_host(&page.final_url)),
        description: meta.description,
        image: meta.image,
        favicon: meta.favicon,
        site_name: meta.site_name,
        page_type: meta.page_type,
        author: meta.author,
        published_date: meta.published_date,
        fetched_at: codec::now(),
    }
}

fn fallback_preview(key: &str, url: &Url) -> LinkPreview {
    let host = display_host(url);
    LinkPreview {
        url: key.to_string(),
        title: host.clone(),
        description: None,
        image: None,
        favicon: html_meta::default_favicon(url),
        site_name: Some(host),
        page_type: None,
        author: None,
        published_date: None,
        fetched_at: codec::now(),
    }
}
