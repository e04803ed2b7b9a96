//! Top-level collection of closed windows.

use crate::assembler::{WindowRecord, assemble_window};
use crate::miner::ExtractOptions;
use crate::value::DynamicValue;

/// Root key of the list of closed windows and tabs.
pub const CLOSED_ENTRIES_KEY: &str = "ClosedTabOrWindowPersistentStates";

/// Counts gathered while collecting, for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectionSummary {
    /// Elements of the top-level list.
    pub entries: usize,
    /// Elements skipped because they were not dictionaries.
    pub skipped_non_dict: usize,
    /// Dictionaries dropped because no tab could be recovered.
    pub dropped_without_tabs: usize,
}

/// Recover every closed window with at least one tab, in source order.
///
/// Never fails: a missing or malformed top-level list gives an empty result.
pub fn collect_windows(root: &DynamicValue, opts: &ExtractOptions) -> Vec<WindowRecord> {
    collect_windows_with_summary(root, opts).0
}

/// Like [`collect_windows`], also reporting what was skipped.
pub fn collect_windows_with_summary(
    root: &DynamicValue,
    opts: &ExtractOptions,
) -> (Vec<WindowRecord>, CollectionSummary) {
    let mut summary = CollectionSummary::default();
    let Some(entries) = root.get(CLOSED_ENTRIES_KEY).and_then(DynamicValue::as_list) else {
        return (Vec::new(), summary);
    };

    let mut windows = Vec::new();
    for (index, entry) in entries.iter().enumerate() {
        summary.entries += 1;
        if entry.as_dict().is_none() {
            summary.skipped_non_dict += 1;
            continue;
        }
        let window = assemble_window(entry, index, opts);
        if window.tabs.is_empty() {
            summary.dropped_without_tabs += 1;
            continue;
        }
        windows.push(window);
    }
    (windows, summary)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::miner::{PERSISTENT_STATE_KEY, TAB_STATES_KEY};
    use time::macros::datetime;

    fn dict(pairs: Vec<(&str, DynamicValue)>) -> DynamicValue {
        DynamicValue::Dict(pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }

    fn window_entry(urls: &[&str]) -> DynamicValue {
        let states = urls
            .iter()
            .map(|u| dict(vec![("TabURL", (*u).into())]))
            .collect();
        dict(vec![(
            PERSISTENT_STATE_KEY,
            dict(vec![(TAB_STATES_KEY, DynamicValue::List(states))]),
        )])
    }

    fn root(entries: Vec<DynamicValue>) -> DynamicValue {
        dict(vec![(CLOSED_ENTRIES_KEY, DynamicValue::List(entries))])
    }

    #[test]
    fn test_collect_preserves_source_order() {
        let doc = root(vec![
            window_entry(&["https://one.example"]),
            window_entry(&["https://two.example", "https://three.example"]),
        ]);
        let windows = collect_windows(&doc, &ExtractOptions::default());
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].tabs[0].url, "https://one.example");
        assert_eq!(windows[1].tabs.len(), 2);
    }

    #[test]
    fn test_collect_drops_entries_without_tabs() {
        let rich_but_empty = dict(vec![
            ("Title", "Rich".into()),
            ("DateClosed", datetime!(2024-01-01 00:00 UTC).into()),
        ]);
        let doc = root(vec![rich_but_empty, window_entry(&["https://kept.example"])]);
        let (windows, summary) = collect_windows_with_summary(&doc, &ExtractOptions::default());
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].tabs[0].url, "https://kept.example");
        assert_eq!(summary.dropped_without_tabs, 1);
    }

    #[test]
    fn test_collect_skips_non_dict_entries_but_keeps_positions() {
        let doc = root(vec![
            "https://not-an-entry.example".into(),
            DynamicValue::Null,
            window_entry(&["https://third.example"]),
        ]);
        let (windows, summary) = collect_windows_with_summary(&doc, &ExtractOptions::default());
        assert_eq!(windows.len(), 1);
        // Fallback title counts skipped entries in the position.
        assert_eq!(windows[0].title, "Window 3");
        assert_eq!(
            summary,
            CollectionSummary {
                entries: 3,
                skipped_non_dict: 2,
                dropped_without_tabs: 0
            }
        );
    }

    #[test]
    fn test_collect_malformed_roots_yield_empty() {
        let opts = ExtractOptions::default();
        assert!(collect_windows(&DynamicValue::Null, &opts).is_empty());
        assert!(collect_windows(&DynamicValue::List(vec![]), &opts).is_empty());
        let wrong_key = dict(vec![("Other", DynamicValue::List(vec![]))]);
        assert!(collect_windows(&wrong_key, &opts).is_empty());
        let wrong_shape = dict(vec![(CLOSED_ENTRIES_KEY, "oops".into())]);
        assert!(collect_windows(&wrong_shape, &opts).is_empty());
    }

    #[test]
    fn test_collect_is_deterministic() {
        let doc = root(vec![
            window_entry(&["https://a.example", "https://b.example", "https://a.example"]),
            dict(vec![("Nested", dict(vec![("PageURL", "https://c.example".into())]))]),
        ]);
        let opts = ExtractOptions::default();
        let first = collect_windows(&doc, &opts);
        let second = collect_windows(&doc, &opts);
        assert_eq!(first, second);
        assert_eq!(first[0].tabs.len(), 2);
        assert_eq!(first[1].title, "Window 2");
    }
}
