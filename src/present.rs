//! Presentation of recovered windows: ordering, selection and rendering.

use anyhow::{Context, Result, bail};
use console::style;
use std::cmp::Ordering;
use std::io::{self, Write};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::assembler::WindowRecord;

/// Newest-closed first; undated windows after dated ones.
///
/// The sort is stable, so ties keep their source order. Tabs inside each
/// window are never touched.
pub fn sort_by_recency(windows: &mut [WindowRecord]) {
    windows.sort_by(|a, b| match (a.closed_at, b.closed_at) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

/// Pick windows by 1-based position in the displayed list.
///
/// Repeated positions are collapsed, keeping the first occurrence.
pub fn select_windows<'a>(
    windows: &'a [WindowRecord],
    positions: &[usize],
) -> Result<Vec<&'a WindowRecord>> {
    let mut selected: Vec<usize> = Vec::new();
    for &position in positions {
        if windows.is_empty() {
            bail!("window {position} does not exist (no windows were recovered)");
        }
        if position == 0 || position > windows.len() {
            bail!(
                "window {position} does not exist (valid: 1-{})",
                windows.len()
            );
        }
        if !selected.contains(&position) {
            selected.push(position);
        }
    }
    Ok(selected.into_iter().map(|p| &windows[p - 1]).collect())
}

/// Format a close time for display.
pub fn format_closed_at(closed_at: Option<OffsetDateTime>) -> String {
    closed_at
        .and_then(|ts| ts.format(&Rfc3339).ok())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Numbered, human-readable listing.
pub fn render_windows(
    w: &mut dyn Write,
    windows: &[WindowRecord],
    is_tty: bool,
) -> io::Result<()> {
    for (idx, window) in windows.iter().enumerate() {
        let count = window.tabs.len();
        let heading = format!(
            "{:>3}. {} ({} tab{}, closed {})",
            idx + 1,
            window.title,
            count,
            if count == 1 { "" } else { "s" },
            format_closed_at(window.closed_at)
        );
        if is_tty {
            writeln!(w, "{}", style(heading).bold())?;
        } else {
            writeln!(w, "{heading}")?;
        }

        for tab in &window.tabs {
            let label = tab.title.as_deref().unwrap_or(&tab.url);
            if is_tty {
                writeln!(w, "       {label}  {}", style(&tab.url).dim())?;
            } else {
                writeln!(w, "       {label}  {}", tab.url)?;
            }
        }
    }
    Ok(())
}

/// Pretty JSON array of windows.
pub fn render_json(windows: &[WindowRecord]) -> Result<String> {
    serde_json::to_string_pretty(windows).context("failed to serialize windows")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
