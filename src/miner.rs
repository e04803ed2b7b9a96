//! Tab record mining.
//!
//! Recovers the tabs of one closed-window entry. Two tiers:
//!
//! 1. Specialized: the entry's `PersistentState` dictionary holds a
//!    `TabStates` list and each element describes one tab.
//! 2. Generic: when the specialized list is missing or yields nothing,
//!    every dictionary in the sub-tree is sniffed for URL-shaped keys.
//!
//! Tier 1 wins outright whenever it finds anything; the tiers are never
//! merged. URLs are kept exactly as stored and deduplicated by exact
//! string match in first-seen order.

use std::collections::HashSet;

use serde::Serialize;

use crate::heuristics::{
    KeyLists, is_plausible_url, key_suggests_title, key_suggests_url, non_empty_title,
};
use crate::value::{Dict, DynamicValue};

/// Key of the per-entry dictionary holding the window's saved state.
pub const PERSISTENT_STATE_KEY: &str = "PersistentState";

/// Key of the list of per-tab dictionaries inside the persistent state.
pub const TAB_STATES_KEY: &str = "TabStates";

/// Default ceiling for every recursive traversal.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// One recovered tab. Identity is the URL alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TabRecord {
    pub url: String,
    pub title: Option<String>,
}

/// Knobs shared by every traversal of one extraction run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    pub keys: KeyLists,
    /// Sub-trees nested deeper than this contribute nothing.
    pub max_depth: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            keys: KeyLists::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// The entry's persistent-state dictionary, if it has one.
pub fn persistent_state(entry: &DynamicValue) -> Option<&Dict> {
    entry.get(PERSISTENT_STATE_KEY)?.as_dict()
}

/// The specialized per-tab list, if the entry has one.
pub fn tab_states(entry: &DynamicValue) -> Option<&[DynamicValue]> {
    persistent_state(entry)?.get(TAB_STATES_KEY)?.as_list()
}

/// Recover the ordered, deduplicated tabs of one entry.
pub fn mine_tabs(entry: &DynamicValue, opts: &ExtractOptions) -> Vec<TabRecord> {
    let specialized = specialized_tabs(entry, opts);
    if !specialized.is_empty() {
        return dedup_tabs(specialized);
    }

    let root = match entry.get(PERSISTENT_STATE_KEY) {
        Some(state @ DynamicValue::Dict(_)) => state,
        _ => entry,
    };
    let mut tabs = Vec::new();
    generic_walk(root, opts, 0, &mut tabs);
    dedup_tabs(tabs)
}

/// Drop repeated URLs, keeping the first occurrence and its title.
pub fn dedup_tabs(tabs: Vec<TabRecord>) -> Vec<TabRecord> {
    let mut seen = HashSet::new();
    tabs.into_iter()
        .filter(|tab| seen.insert(tab.url.clone()))
        .collect()
}

/// First sanitized, non-empty title under one of the title keys.
pub fn title_from_keys(dict: &Dict, keys: &KeyLists) -> Option<String> {
    keys.title_keys
        .iter()
        .filter_map(|key| dict.get(key.as_str())?.as_str())
        .find_map(non_empty_title)
}

// ---------------------------------------------------------------------------
// Tier 1: specialized tab-states list
// ---------------------------------------------------------------------------

fn specialized_tabs(entry: &DynamicValue, opts: &ExtractOptions) -> Vec<TabRecord> {
    let Some(candidates) = tab_states(entry) else {
        return Vec::new();
    };

    let mut tabs = Vec::new();
    for candidate in candidates {
        let DynamicValue::Dict(dict) = candidate else {
            continue;
        };
        // A URL-keyed string one level past the depth ceiling is out of reach
        // for the candidate searches but still seen by the generic walk.
        match tab_from_candidate(candidate, dict, opts) {
            Some(tab) => tabs.push(tab),
            None => generic_walk(candidate, opts, 0, &mut tabs),
        }
    }
    tabs
}

fn tab_from_candidate(
    candidate: &DynamicValue,
    dict: &Dict,
    opts: &ExtractOptions,
) -> Option<TabRecord> {
    let url = prioritized_url(dict, &opts.keys)
        .or_else(|| find_prioritized_url(candidate, opts, 0))
        .or_else(|| find_any_url(candidate, opts, 0))?;
    Some(TabRecord {
        url,
        title: title_from_keys(dict, &opts.keys),
    })
}

/// First prioritized key on this dictionary holding a plausible URL.
fn prioritized_url(dict: &Dict, keys: &KeyLists) -> Option<String> {
    keys.url_keys
        .iter()
        .filter_map(|key| dict.get(key.as_str())?.as_str())
        .find(|s| is_plausible_url(s))
        .map(str::to_string)
}

/// Depth-first search for a prioritized URL key anywhere below `value`.
fn find_prioritized_url(
    value: &DynamicValue,
    opts: &ExtractOptions,
    depth: usize,
) -> Option<String> {
    if depth > opts.max_depth {
        return None;
    }
    match value {
        DynamicValue::Dict(dict) => prioritized_url(dict, &opts.keys).or_else(|| {
            dict.values()
                .find_map(|child| find_prioritized_url(child, opts, depth + 1))
        }),
        DynamicValue::List(items) => items
            .iter()
            .find_map(|child| find_prioritized_url(child, opts, depth + 1)),
        DynamicValue::Null
        | DynamicValue::Bool(_)
        | DynamicValue::Int(_)
        | DynamicValue::Real(_)
        | DynamicValue::String(_)
        | DynamicValue::Timestamp(_) => None,
    }
}

/// Depth-first search for any plausible URL string below `value`.
fn find_any_url(value: &DynamicValue, opts: &ExtractOptions, depth: usize) -> Option<String> {
    if depth > opts.max_depth {
        return None;
    }
    match value {
        DynamicValue::String(s) if is_plausible_url(s) => Some(s.clone()),
        DynamicValue::Dict(dict) => dict
            .values()
            .find_map(|child| find_any_url(child, opts, depth + 1)),
        DynamicValue::List(items) => items
            .iter()
            .find_map(|child| find_any_url(child, opts, depth + 1)),
        DynamicValue::Null
        | DynamicValue::Bool(_)
        | DynamicValue::Int(_)
        | DynamicValue::Real(_)
        | DynamicValue::String(_)
        | DynamicValue::Timestamp(_) => None,
    }
}

// ---------------------------------------------------------------------------
// Tier 2: generic key sniffing
// ---------------------------------------------------------------------------

/// Visit every branch, emitting a tab for each URL-shaped key.
///
/// Never stops early: sibling tabs can sit anywhere in the structure.
fn generic_walk(
    value: &DynamicValue,
    opts: &ExtractOptions,
    depth: usize,
    out: &mut Vec<TabRecord>,
) {
    if depth > opts.max_depth {
        return;
    }
    match value {
        DynamicValue::Dict(dict) => {
            for (key, child) in dict {
                if let DynamicValue::String(s) = child
                    && key_suggests_url(key)
                    && is_plausible_url(s)
                {
                    let title = if key_suggests_title(key) {
                        non_empty_title(s)
                    } else {
                        None
                    };
                    out.push(TabRecord {
                        url: s.clone(),
                        title,
                    });
                } else {
                    generic_walk(child, opts, depth + 1, out);
                }
            }
        }
        DynamicValue::List(items) => {
            for item in items {
                generic_walk(item, opts, depth + 1, out);
            }
        }
        DynamicValue::Null
        | DynamicValue::Bool(_)
        | DynamicValue::Int(_)
        | DynamicValue::Real(_)
        | DynamicValue::String(_)
        | DynamicValue::Timestamp(_) => {}
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
