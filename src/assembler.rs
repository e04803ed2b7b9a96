//! Window assembly.
//!
//! Turns one top-level entry into a [`WindowRecord`]: tabs come from the
//! miner, the title and close time from prioritized fallback chains.

use serde::Serialize;
use time::OffsetDateTime;

use crate::heuristics::non_empty_title;
use crate::miner::{
    ExtractOptions, PERSISTENT_STATE_KEY, TabRecord, mine_tabs, persistent_state, tab_states,
    title_from_keys,
};
use crate::value::{Dict, DynamicValue};

/// Title shown in the browser's tab overview for the window.
pub const TAB_OVERVIEW_TITLE_KEY: &str = "TabOverviewTitle";

/// Title the browser recorded for the window itself.
pub const WINDOW_TITLE_KEY: &str = "WindowTitle";

/// One recovered closed window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WindowRecord {
    pub title: String,
    #[serde(with = "time::serde::rfc3339::option")]
    pub closed_at: Option<OffsetDateTime>,
    pub tabs: Vec<TabRecord>,
}

/// Build the record for the entry at 0-based `index` in the source list.
///
/// The tab list may come back empty; dropping such windows is the
/// collector's job.
pub fn assemble_window(entry: &DynamicValue, index: usize, opts: &ExtractOptions) -> WindowRecord {
    WindowRecord {
        title: window_title(entry, index, opts),
        closed_at: closed_at(entry, opts),
        tabs: mine_tabs(entry, opts),
    }
}

/// First usable title, else `Window {index + 1}`.
///
/// Candidates in order: overview title, window title, title of the first
/// titled tab state, then the entry's own title keys.
pub fn window_title(entry: &DynamicValue, index: usize, opts: &ExtractOptions) -> String {
    let state = persistent_state(entry);

    let from_state = |key: &str| {
        state
            .and_then(|s| s.get(key))
            .and_then(DynamicValue::as_str)
            .and_then(non_empty_title)
    };

    from_state(TAB_OVERVIEW_TITLE_KEY)
        .or_else(|| from_state(WINDOW_TITLE_KEY))
        .or_else(|| first_tab_state_title(entry, opts))
        .or_else(|| entry.as_dict().and_then(|d| title_from_keys(d, &opts.keys)))
        .unwrap_or_else(|| format!("Window {}", index + 1))
}

/// When the window was closed, if anything in the entry says so.
///
/// Tiers: known keys on the entry, known keys on the persistent state,
/// any timestamp inside the persistent state, any timestamp in the entry.
/// The first tier with a result wins.
pub fn closed_at(entry: &DynamicValue, opts: &ExtractOptions) -> Option<OffsetDateTime> {
    let state = entry.get(PERSISTENT_STATE_KEY).filter(|s| s.as_dict().is_some());

    entry
        .as_dict()
        .and_then(|d| closed_date_from_keys(d, opts))
        .or_else(|| persistent_state(entry).and_then(|d| closed_date_from_keys(d, opts)))
        .or_else(|| state.and_then(|s| first_timestamp(s, opts, 0)))
        .or_else(|| first_timestamp(entry, opts, 0))
}

fn first_tab_state_title(entry: &DynamicValue, opts: &ExtractOptions) -> Option<String> {
    tab_states(entry)?
        .iter()
        .filter_map(DynamicValue::as_dict)
        .find_map(|d| title_from_keys(d, &opts.keys))
}

fn closed_date_from_keys(dict: &Dict, opts: &ExtractOptions) -> Option<OffsetDateTime> {
    opts.keys
        .closed_date_keys
        .iter()
        .filter_map(|key| dict.get(key.as_str()))
        .find_map(DynamicValue::to_timestamp_lenient)
}

/// Depth-first search for the first timestamp value under any key.
fn first_timestamp(
    value: &DynamicValue,
    opts: &ExtractOptions,
    depth: usize,
) -> Option<OffsetDateTime> {
    if depth > opts.max_depth {
        return None;
    }
    match value {
        DynamicValue::Timestamp(ts) => Some(*ts),
        DynamicValue::Dict(dict) => dict
            .values()
            .find_map(|child| first_timestamp(child, opts, depth + 1)),
        DynamicValue::List(items) => items
            .iter()
            .find_map(|child| first_timestamp(child, opts, depth + 1)),
        DynamicValue::Null
        | DynamicValue::Bool(_)
        | DynamicValue::Int(_)
        | DynamicValue::Real(_)
        | DynamicValue::String(_) => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
