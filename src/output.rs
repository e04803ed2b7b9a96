//! Status reporting on stderr.
//!
//! Stdout carries the command's result (window listings, JSON). A
//! [`Reporter`] writes everything else: what is being reopened, what
//! failed, and the extraction diagnostics shown with `--verbose`.

use console::{Color, Term, style};
use std::io::{self, Write};
use std::path::Path;

use crate::collector::CollectionSummary;
use crate::config::ResolvedSource;
use crate::restore::{RestoreGroup, RestoreReport};

/// Colour of a status label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tone {
    Progress,
    Done,
    Problem,
    Hint,
    Trace,
}

impl Tone {
    fn color(self) -> Color {
        match self {
            Tone::Progress => Color::Cyan,
            Tone::Done => Color::Green,
            Tone::Problem => Color::Red,
            Tone::Hint => Color::Yellow,
            Tone::Trace => Color::Magenta,
        }
    }
}

/// Writes labeled status lines for the CLI.
///
/// Write errors are ignored.
pub struct Reporter<'a> {
    out: &'a mut dyn Write,
    colored: bool,
    verbose: bool,
}

impl<'a> Reporter<'a> {
    pub fn new(out: &'a mut dyn Write, colored: bool, verbose: bool) -> Self {
        Self {
            out,
            colored,
            verbose,
        }
    }

    /// Reporter on the given stderr handle, coloured when it is a terminal.
    pub fn stderr(out: &'a mut io::Stderr, verbose: bool) -> Self {
        let colored = Term::stderr().is_term();
        Self::new(out, colored, verbose)
    }

    fn line(&mut self, tone: Tone, label: &str, msg: &str) {
        let label = if self.colored {
            style(label).bold().fg(tone.color()).to_string()
        } else {
            label.to_string()
        };
        let _ = writeln!(self.out, "{label} {msg}");
    }

    fn indented(&mut self, msg: &str) {
        let text = format!("    {msg}");
        let _ = if self.colored {
            writeln!(self.out, "{}", style(text).dim())
        } else {
            writeln!(self.out, "{text}")
        };
    }

    /// A group is about to be handed to the restore sink.
    pub fn opening(&mut self, group: &RestoreGroup, dry_run: bool) {
        let label = if dry_run { "Would open" } else { "Opening" };
        let count = group.urls.len();
        let msg = format!("{} ({count} tab{})", group.title, plural(count));
        self.line(Tone::Progress, label, &msg);
    }

    /// Per-group failures followed by the overall count.
    pub fn restore_finished(&mut self, report: &RestoreReport, dry_run: bool) {
        for (title, err) in &report.failed {
            self.line(Tone::Problem, "Failed", title);
            self.indented(&format!("{err:#}"));
        }
        let label = if dry_run { "Would restore" } else { "Restored" };
        let msg = format!("{} window{}", report.opened, plural(report.opened));
        self.line(Tone::Done, label, &msg);
    }

    /// The session file held nothing recoverable.
    pub fn nothing_found(&mut self, source: &Path) {
        let msg = format!("no recently closed windows in {}", source.display());
        self.line(Tone::Hint, "Empty", &msg);
    }

    /// Which file is read and which configuration layer chose it.
    pub fn reading(&mut self, source: &ResolvedSource) {
        if self.verbose {
            let msg = format!("{} (from {})", source.path.display(), source.origin);
            self.line(Tone::Trace, "reading", &msg);
        }
    }

    /// Outcome of one extraction run.
    pub fn extracted(&mut self, root_kind: &str, kept: usize, summary: &CollectionSummary) {
        if self.verbose {
            let msg = format!(
                "{root_kind} root, {} entries: {kept} kept, {} without tabs, {} not dictionaries",
                summary.entries, summary.dropped_without_tabs, summary.skipped_non_dict
            );
            self.line(Tone::Trace, "extracted", &msg);
        }
    }

    /// Fatal error ending the command.
    pub fn error(&mut self, err: &anyhow::Error) {
        self.line(Tone::Problem, "error:", &format!("{err:#}"));
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "" } else { "s" }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
