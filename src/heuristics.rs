//! Plausibility heuristics for URL, title and close-date fields.
//!
//! The browser stores the same logical facts under key names that vary
//! between releases. Everything here is a pure predicate or selector; the
//! key lists are data and may be extended from the config file.

use url::Url;

/// Field names most likely to hold a tab's URL. First match wins.
pub const PRIORITIZED_URL_KEYS: &[&str] = &[
    "TabURL",
    "URL",
    "URLString",
    "TabURLString",
    "HistoryURL",
    "LastVisitedURL",
];

/// Field names most likely to hold a tab or window title. First match wins.
pub const TITLE_KEYS: &[&str] = &["TabTitle", "Title", "Name"];

/// Field names most likely to hold the moment a window or tab was closed.
pub const CLOSED_DATE_KEYS: &[&str] = &[
    "LastClosedDate",
    "ClosedDate",
    "CloseDate",
    "DateClosed",
    "ClosedTimestamp",
    "TabCloseDate",
];

/// Ordered key lists consulted by the miner and the window assembler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyLists {
    pub url_keys: Vec<String>,
    pub title_keys: Vec<String>,
    pub closed_date_keys: Vec<String>,
}

impl Default for KeyLists {
    fn default() -> Self {
        Self {
            url_keys: to_owned_keys(PRIORITIZED_URL_KEYS),
            title_keys: to_owned_keys(TITLE_KEYS),
            closed_date_keys: to_owned_keys(CLOSED_DATE_KEYS),
        }
    }
}

impl KeyLists {
    /// Append extra keys after the defaults.
    ///
    /// Keys already present (exact match) are skipped, so the built-in
    /// priority order is never disturbed.
    pub fn with_extra(
        mut self,
        url_keys: &[String],
        title_keys: &[String],
        closed_date_keys: &[String],
    ) -> Self {
        append_unique(&mut self.url_keys, url_keys);
        append_unique(&mut self.title_keys, title_keys);
        append_unique(&mut self.closed_date_keys, closed_date_keys);
        self
    }
}

/// Cheap syntactic screen for "this string could be a URL".
///
/// Accepts a trimmed string that parses with a non-empty scheme
/// (`https:`, `file:`, `javascript:`, ...) or that starts with `www.`.
/// Strings with inner whitespace are rejected, so prose such as
/// `Re: hello` is never taken for a URL.
pub fn is_plausible_url(s: &str) -> bool {
    let trimmed = s.trim();
    if trimmed.is_empty() || trimmed.contains(char::is_whitespace) {
        return false;
    }
    if trimmed.starts_with("www.") {
        return true;
    }
    match Url::parse(trimmed) {
        Ok(url) => !url.scheme().is_empty(),
        Err(_) => false,
    }
}

pub fn key_suggests_url(key: &str) -> bool {
    key.to_lowercase().contains("url")
}

pub fn key_suggests_title(key: &str) -> bool {
    key.to_lowercase().contains("title")
}

/// Collapse every whitespace run (including newlines) into one space.
pub fn sanitize_title(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Sanitize `s` and return it only if something is left.
pub fn non_empty_title(s: &str) -> Option<String> {
    let title = sanitize_title(s);
    if title.is_empty() { None } else { Some(title) }
}

fn to_owned_keys(keys: &[&str]) -> Vec<String> {
    keys.iter().map(|k| k.to_string()).collect()
}

fn append_unique(list: &mut Vec<String>, extra: &[String]) {
    for key in extra {
        let key = key.trim();
        if key.is_empty() || list.iter().any(|existing| existing == key) {
            continue;
        }
        list.push(key.to_string());
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
