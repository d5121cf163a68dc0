//! Address pattern matching for boosts.
//!
//! A pattern is `*`, or a comma-separated list of elements. Each element is
//! either a host (`example.com`, `www.example.com`, `*.example.com`,
//! `news.*`) or, when it contains a `/`, a URL prefix
//! (`example.com/docs`, `https://github.com/*/issues`). Matching is
//! case-insensitive, ignores a leading `www.`, and never panics: an address
//! that cannot be parsed matches nothing.

use url::{Position, Url};

/// Tunables for [`matches_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchOptions {
    /// Let a plain host element also match its subdomains.
    pub include_subdomains: bool,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            include_subdomains: true,
        }
    }
}

/// Returns `true` if `address` matches `pattern` (subdomains included).
pub fn matches(address: &str, pattern: &str) -> bool {
    matches_with(address, pattern, MatchOptions::default())
}

/// Returns `true` if `address` matches `pattern` under `options`.
pub fn matches_with(address: &str, pattern: &str, options: MatchOptions) -> bool {
    let Some(target) = Target::parse(address) else {
        return false;
    };

    let pattern = pattern.trim();
    if pattern == "*" {
        return true;
    }

    pattern
        .split(',')
        .map(str::trim)
        .filter(|element| !element.is_empty())
        .any(|element| element_matches(&target, element, options))
}

/// Parsed pieces of the address being tested.
struct Target {
    /// Lowercase host, e.g. `www.example.com`.
    host: String,
    /// Host with a leading `www.` removed.
    bare_host: String,
    /// Address without scheme and leading `www.`, e.g. `example.com/page?q=1`.
    stripped: String,
}

impl Target {
    fn parse(address: &str) -> Option<Self> {
        let address = address.trim();
        if address.is_empty() {
            return None;
        }
        let url = match Url::parse(address) {
            Ok(url) if url.has_host() => url,
            Ok(_) if !is_host_with_port(address) => return None,
            Ok(_) | Err(url::ParseError::RelativeUrlWithoutBase) => {
                Url::parse(&format!("https://{}", address)).ok()?
            }
            Err(_) => return None,
        };

        let host = url.host_str()?.to_ascii_lowercase();
        if host.is_empty() {
            return None;
        }
        let bare_host = strip_www(&host).to_string();
        let after_scheme = url[Position::BeforeHost..].to_ascii_lowercase();
        let stripped = strip_www(&after_scheme).to_string();

        Some(Self {
            host,
            bare_host,
            stripped,
        })
    }
}

/// `example.com:8080/x` parses as scheme `example.com` with no host.
fn is_host_with_port(address: &str) -> bool {
    address
        .split_once(':')
        .is_some_and(|(_, rest)| rest.starts_with(|c: char| c.is_ascii_digit()))
}

fn strip_www(value: &str) -> &str {
    value.strip_prefix("www.").unwrap_or(value)
}

fn strip_scheme(value: &str) -> &str {
    match value.find("://") {
        Some(idx) => &value[idx + 3..],
        None => value,
    }
}

fn element_matches(target: &Target, element: &str, options: MatchOptions) -> bool {
    let element = element.to_ascii_lowercase();

    if element == "*" {
        return true;
    }

    if element.contains('/') {
        return prefix_matches(target, &element);
    }

    if let Some(base) = element.strip_prefix("*.") {
        let base = strip_www(base);
        if base.contains('*') {
            return glob_match(base, &target.bare_host)
                || glob_match(&format!("*.{}", base), &target.host);
        }
        return target.bare_host == base || target.host.ends_with(&format!(".{}", base));
    }

    if element.contains('*') {
        return glob_match(&element, &target.host) || glob_match(&element, &target.bare_host);
    }

    if target.host == element || target.bare_host == strip_www(&element) {
        return true;
    }

    options.include_subdomains && target.host.ends_with(&format!(".{}", element))
}

/// URL-prefix element: compared against the address with scheme and `www.` removed.
fn prefix_matches(target: &Target, element: &str) -> bool {
    let prefix = strip_www(strip_scheme(element));
    if prefix.is_empty() {
        return false;
    }
    if prefix.contains('*') {
        return glob_match(&format!("{}*", prefix), &target.stripped);
    }
    target.stripped.starts_with(prefix)
}

/// Full-string glob match where `*` matches any run of bytes.
fn glob_match(pattern: &str, text: &str) -> bool {
    let p = pattern.as_bytes();
    let t = text.as_bytes();
    let (mut pi, mut ti) = (0, 0);
    let mut star: Option<usize> = None;
    let mut mark = 0;

    while ti < t.len() {
        if pi < p.len() && p[pi] == b'*' {
            star = Some(pi);
            mark = ti;
            pi += 1;
        } else if pi < p.len() && p[pi] == t[ti] {
            pi += 1;
            ti += 1;
        } else if let Some(s) = star {
            pi = s + 1;
            mark += 1;
            ti = mark;
        } else {
            return false;
        }
    }

    while pi < p.len() && p[pi] == b'*' {
        pi += 1;
    }
    pi == p.len()
}
