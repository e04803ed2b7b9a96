use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use console::Term;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;

use closed_windows::WindowRecord;
use closed_windows::collector::collect_windows_with_summary;
use closed_windows::config::{Config, ResolvedSource};
use closed_windows::restore::{
    DryRunSink, OpenCommandSink, RestoreReport, RestoreSink, groups_for, restore_groups,
};
use closed_windows::output::Reporter;
use closed_windows::{loader, present};

/// Recover recently closed browser windows and reopen them.
///
/// Reads the browser's recently-closed session file, recovers every
/// closed window with its tabs, and lists or reopens them.
#[derive(Parser, Debug)]
#[command(
    name = "closed-windows",
    version,
    about,
    after_help = "Examples:\n  closed-windows list\n  closed-windows list --json\n  closed-windows restore 1 3\n  closed-windows restore --all --dry-run\n  closed-windows --source ~/backup/RecentlyClosedTabs.plist list\n  closed-windows status"
)]
struct Cli {
    /// Session file to read instead of the browser's default one.
    #[arg(long, global = true)]
    source: Option<PathBuf>,

    /// Print extraction diagnostics on stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List recently closed windows, newest first.
    List {
        /// Emit JSON instead of a text listing.
        #[arg(long)]
        json: bool,

        /// Keep the order of the session file instead of sorting by close time.
        #[arg(long)]
        source_order: bool,

        /// Show at most this many windows.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Reopen windows by their position in `list`.
    Restore {
        /// 1-based positions as shown by `list` (with the same ordering flag).
        #[arg(value_name = "POSITION")]
        positions: Vec<usize>,

        /// Reopen every recovered window.
        #[arg(long, conflicts_with = "positions")]
        all: bool,

        /// Print the URLs that would be opened without opening them.
        #[arg(long)]
        dry_run: bool,

        /// Positions refer to session file order instead of close time.
        #[arg(long)]
        source_order: bool,
    },

    /// Show the resolved configuration and what the session file yields.
    Status,
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Load the session file and recover its windows in display order.
fn load_windows(
    config: &Config,
    source: &ResolvedSource,
    source_order: bool,
    report: &mut Reporter<'_>,
) -> Result<Vec<WindowRecord>> {
    report.reading(source);
    let root = loader::load_document(&source.path)?;

    let (mut windows, summary) = collect_windows_with_summary(&root, &config.extract_options());
    report.extracted(root.kind(), windows.len(), &summary);

    if !source_order {
        present::sort_by_recency(&mut windows);
    }
    Ok(windows)
}

// ---------------------------------------------------------------------------
// list
// ---------------------------------------------------------------------------

fn run_list(
    source: Option<&Path>,
    json: bool,
    source_order: bool,
    limit: Option<usize>,
    report: &mut Reporter<'_>,
) -> Result<()> {
    let config = Config::load()?;
    let resolved = config.resolve_source(source);
    let windows = load_windows(&config, &resolved, source_order, report)?;

    if windows.is_empty() && !json {
        report.nothing_found(&resolved.path);
        return Ok(());
    }
    run_list_inner(
        &mut io::stdout().lock(),
        &windows,
        json,
        limit,
        Term::stdout().is_term(),
    )
}

/// Inner implementation of `run_list` that writes to a `Write` impl.
fn run_list_inner(
    w: &mut dyn Write,
    windows: &[WindowRecord],
    json: bool,
    limit: Option<usize>,
    is_tty: bool,
) -> Result<()> {
    let shown = &windows[..limit.unwrap_or(windows.len()).min(windows.len())];
    if json {
        writeln!(w, "{}", present::render_json(shown)?)?;
    } else {
        present::render_windows(w, shown, is_tty)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// restore
// ---------------------------------------------------------------------------

fn run_restore(
    source: Option<&Path>,
    positions: &[usize],
    all: bool,
    dry_run: bool,
    source_order: bool,
    report: &mut Reporter<'_>,
) -> Result<()> {
    if positions.is_empty() && !all {
        bail!("choose windows to restore by position, or pass --all");
    }

    let config = Config::load()?;
    let resolved = config.resolve_source(source);
    let windows = load_windows(&config, &resolved, source_order, report)?;
    if windows.is_empty() && all {
        report.nothing_found(&resolved.path);
        return Ok(());
    }

    let outcome = if dry_run {
        let mut sink = DryRunSink::new(io::stdout().lock());
        run_restore_inner(&mut sink, &windows, positions, all, dry_run, report)?
    } else {
        let mut sink = OpenCommandSink::new(config.open_program(), Some(config.browser_app()));
        run_restore_inner(&mut sink, &windows, positions, all, dry_run, report)?
    };

    report.restore_finished(&outcome, dry_run);
    if !outcome.is_success() {
        bail!(
            "{} of {} windows could not be reopened",
            outcome.failed.len(),
            outcome.failed.len() + outcome.opened
        );
    }
    Ok(())
}

/// Select windows and push them through `sink`.
fn run_restore_inner(
    sink: &mut dyn RestoreSink,
    windows: &[WindowRecord],
    positions: &[usize],
    all: bool,
    dry_run: bool,
    report: &mut Reporter<'_>,
) -> Result<RestoreReport> {
    let selected: Vec<&WindowRecord> = if all {
        windows.iter().collect()
    } else {
        present::select_windows(windows, positions)?
    };
    let groups = groups_for(selected);
    for group in &groups {
        report.opening(group, dry_run);
    }
    Ok(restore_groups(sink, &groups))
}

// ---------------------------------------------------------------------------
// status
// ---------------------------------------------------------------------------

fn run_status(source: Option<&Path>, report: &mut Reporter<'_>) -> Result<()> {
    let config = Config::load()?;
    let resolved = config.resolve_source(source);
    run_status_inner(
        &mut io::stderr(),
        Config::config_path().as_deref(),
        &config,
        &resolved,
        report,
    )
}

/// Inner implementation of `run_status` that writes to a `Write` impl.
fn run_status_inner(
    w: &mut dyn Write,
    config_path: Option<&Path>,
    config: &Config,
    source: &ResolvedSource,
    report: &mut Reporter<'_>,
) -> Result<()> {
    writeln!(w, "closed-windows status")?;

    match config_path {
        Some(path) => {
            let state = if path.exists() { "present" } else { "not found, using defaults" };
            writeln!(w, "  Config: {} ({state})", path.display())?;
        }
        None => writeln!(w, "  Config: (unavailable: $HOME is not set)")?,
    }

    writeln!(w, "  Source: {} (from {})", source.path.display(), source.origin)?;
    writeln!(w, "  Browser: {} via `{}`", config.browser_app(), config.open_program())?;

    if !source.path.exists() {
        writeln!(w, "  Windows: (source file not found)")?;
        return Ok(());
    }
    match load_windows(config, source, true, report) {
        Ok(windows) => {
            let tabs: usize = windows.iter().map(|win| win.tabs.len()).sum();
            writeln!(w, "  Windows: {} ({} tabs)", windows.len(), tabs)?;
        }
        Err(e) => writeln!(w, "  Windows: (unreadable: {e:#})")?,
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() {
    let cli = Cli::parse();
    let mut stderr = io::stderr();
    let mut report = Reporter::stderr(&mut stderr, cli.verbose);
    let source = cli.source.as_deref();

    let result = match cli.command {
        Command::List {
            json,
            source_order,
            limit,
        } => run_list(source, json, source_order, limit, &mut report),
        Command::Restore {
            positions,
            all,
            dry_run,
            source_order,
        } => run_restore(source, &positions, all, dry_run, source_order, &mut report),
        Command::Status => run_status(source, &mut report),
    };

    if let Err(e) = result {
        report.error(&e);
        process::exit(1);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
