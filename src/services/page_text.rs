//! Plain-text helpers for saved page content.
//!
//! Used by the reading list (offline snapshots), collections (selected text
//! titles) and link previews. Nothing here interprets scripts: markup is
//! removed textually.

use std::sync::LazyLock;

use regex::Regex;

static NON_CONTENT_BLOCKS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?is)<!--.*?-->|<script\b.*?</script\s*>|<style\b.*?</style\s*>|<noscript\b.*?</noscript\s*>|<template\b.*?</template\s*>",
    )
    .expect("static regex")
});

static ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z]{2,8});").expect("static regex"));

/// Strips HTML markup, returning whitespace-collapsed plain text.
///
/// Script, style, template and comment bodies are dropped entirely; every
/// tag is replaced by a space so adjacent blocks do not run together.
pub fn strip_tags(html: &str) -> String {
    let without_blocks = NON_CONTENT_BLOCKS.replace_all(html, " ");

    let mut text = String::with_capacity(without_blocks.len());
    let mut in_tag = false;
    for ch in without_blocks.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                text.push(' ');
            }
            _ if !in_tag => text.push(ch),
            _ => {}
        }
    }

    collapse_whitespace(&decode_entities(&text))
}

/// Decodes named and numeric character references commonly found in pages.
pub fn decode_entities(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &regex::Captures| {
            let body = &caps[1];
            let decoded = if let Some(hex) = body.strip_prefix("#x").or_else(|| body.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = body.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                match body {
                    "amp" => Some('&'),
                    "lt" => Some('<'),
                    "gt" => Some('>'),
                    "quot" => Some('"'),
                    "apos" => Some('\''),
                    "nbsp" => Some(' '),
                    "mdash" => Some('\u{2014}'),
                    "ndash" => Some('\u{2013}'),
                    "hellip" => Some('\u{2026}'),
                    "copy" => Some('\u{a9}'),
                    _ => None,
                }
            };
            match decoded {
                Some(ch) => ch.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Estimates reading time in whole minutes, rounded up, never below one.
pub fn estimate_read_time(text: &str, words_per_minute: u32) -> u32 {
    let wpm = words_per_minute.max(1) as f64;
    ((word_count(text) as f64) / wpm).ceil().max(1.0) as u32
}

/// Keeps the first `max_chars` characters, appending `...` when anything was cut.
pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

/// Plain-text excerpt of an HTML document.
pub fn excerpt(html: &str, max_chars: usize) -> String {
    truncate_with_ellipsis(&strip_tags(html), max_chars)
}
