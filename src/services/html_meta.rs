//! Metadata extraction for link previews.
//!
//! Reads Open Graph, Twitter Card and standard meta tags from untrusted HTML.
//! The document is scanned with regular expressions only; no DOM is built and
//! nothing embedded in the page is evaluated.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::services::page_text::{collapse_whitespace, decode_entities};
use crate::types::preview::PageMetadata;

// Quoted attribute values may contain `>`.
static META_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<meta\b(?:[^>"']|"[^"]*"|'[^']*')*>"#).expect("static regex")
});
static LINK_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<link\b(?:[^>"']|"[^"]*"|'[^']*')*>"#).expect("static regex")
});
static TITLE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title\b[^>]*>(.*?)</title\s*>").expect("static regex"));
static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)([a-zA-Z_:.-]+)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#).expect("static regex")
});

/// Extracts preview metadata from `html`, resolving relative links against `page_url`.
///
/// Fallback order for every field is Open Graph, then Twitter Card, then
/// standard tags.
pub fn extract(html: &str, page_url: &Url) -> PageMetadata {
    let meta = collect_meta(html);
    let pick = |keys: &[&str]| keys.iter().find_map(|k| meta.get(*k).cloned());

    let title = pick(&["og:title", "twitter:title"]).or_else(|| title_tag(html)).or_else(|| pick(&["title"]));
    let description = pick(&["og:description", "twitter:description", "description"]);
    let image = pick(&[
        "og:image",
        "og:image:url",
        "og:image:secure_url",
        "twitter:image",
        "twitter:image:src",
        "image",
    ])
    .or_else(|| link_href(html, |rel| rel == "image_src"))
    .and_then(|src| resolve(page_url, &src));
    let site_name = pick(&["og:site_name", "application-name"]);
    let page_type = pick(&["og:type"]);
    let author = pick(&["article:author", "author", "twitter:creator"]);
    let published_date = pick(&["article:published_time", "og:published_time", "datepublished", "date"]);

    let favicon = link_href(html, |rel| rel.split_whitespace().any(|r| r == "icon"))
        .or_else(|| link_href(html, |rel| rel.contains("apple-touch-icon")))
        .and_then(|href| resolve(page_url, &href))
        .or_else(|| default_favicon(page_url));

    PageMetadata {
        title,
        description,
        image,
        favicon,
        site_name,
        page_type,
        author,
        published_date,
    }
}

/// `<origin>/favicon.ico`, the conventional fallback location.
pub fn default_favicon(page_url: &Url) -> Option<String> {
    page_url.join("/favicon.ico").ok().map(|u| u.to_string())
}

/// Maps `property`/`name`/`itemprop` keys (lowercased) to their `content`.
/// The first occurrence of a key wins.
fn collect_meta(html: &str) -> HashMap<String, String> {
    let mut meta = HashMap::new();
    for tag in META_TAG.find_iter(html) {
        let attrs = attributes(tag.as_str());
        let Some(content) = attrs.get("content").and_then(|c| clean(c)) else {
            continue;
        };
        for key_attr in ["property", "name", "itemprop"] {
            if let Some(key) = attrs.get(key_attr) {
                meta.entry(key.trim().to_ascii_lowercase())
                    .or_insert_with(|| content.clone());
            }
        }
    }
    meta
}

fn title_tag(html: &str) -> Option<String> {
    TITLE_TAG.captures(html).and_then(|caps| clean(&caps[1]))
}

/// First `<link>` whose `rel` satisfies `rel_matches`.
fn link_href(html: &str, rel_matches: impl Fn(&str) -> bool) -> Option<String> {
    LINK_TAG.find_iter(html).find_map(|tag| {
        let attrs = attributes(tag.as_str());
        let rel = attrs.get("rel")?.to_ascii_lowercase();
        if rel_matches(&rel) {
            attrs.get("href").and_then(|h| clean(h))
        } else {
            None
        }
    })
}

fn attributes(tag: &str) -> HashMap<String, String> {
    ATTRIBUTE
        .captures_iter(tag)
        .filter_map(|caps| {
            let name = caps.get(1)?.as_str().to_ascii_lowercase();
            let value = caps.get(2).or_else(|| caps.get(3)).or_else(|| caps.get(4))?.as_str();
            Some((name, value.to_string()))
        })
        .collect()
}

fn clean(raw: &str) -> Option<String> {
    let value = collapse_whitespace(&decode_entities(raw));
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Resolves `href` against the page. Only http(s) results are kept.
fn resolve(page_url: &Url, href: &str) -> Option<String> {
    let resolved = page_url.join(href.trim()).ok()?;
    match resolved.scheme() {
        "http" | "https" => Some(resolved.to_string()),
        _ => None,
    }
}
