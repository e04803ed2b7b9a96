//! Reopening recovered windows.
//!
//! A window becomes a [`RestoreGroup`]: its title plus its URLs in tab
//! order. How the URLs actually get opened is up to a [`RestoreSink`].

use anyhow::{Context, Result, bail};
use serde::Serialize;
use std::io::Write;
use std::process::Command;

use crate::assembler::WindowRecord;

/// One window's worth of URLs to reopen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestoreGroup {
    /// Informational only.
    pub title: String,
    /// Never empty.
    pub urls: Vec<String>,
}

impl RestoreGroup {
    /// `None` when the window has no tabs.
    pub fn from_window(window: &WindowRecord) -> Option<Self> {
        if window.tabs.is_empty() {
            return None;
        }
        Some(Self {
            title: window.title.clone(),
            urls: window.tabs.iter().map(|t| t.url.clone()).collect(),
        })
    }
}

/// Build restore groups for the given windows, skipping tab-less ones.
pub fn groups_for<'a>(windows: impl IntoIterator<Item = &'a WindowRecord>) -> Vec<RestoreGroup> {
    windows
        .into_iter()
        .filter_map(RestoreGroup::from_window)
        .collect()
}

/// Something that can open a group of URLs.
pub trait RestoreSink {
    fn open_group(&mut self, group: &RestoreGroup) -> Result<()>;
}

/// Opens URLs by running `<program> [-a <app>] <url>...`.
///
/// With the defaults this is macOS `open -a Safari`.
#[derive(Debug, Clone)]
pub struct OpenCommandSink {
    program: String,
    app: Option<String>,
}

impl OpenCommandSink {
    pub fn new(program: impl Into<String>, app: Option<String>) -> Self {
        Self {
            program: program.into(),
            app: app.filter(|a| !a.trim().is_empty()),
        }
    }

    fn command_for(&self, group: &RestoreGroup) -> Command {
        let mut cmd = Command::new(&self.program);
        if let Some(app) = &self.app {
            cmd.arg("-a").arg(app);
        }
        cmd.args(&group.urls);
        cmd
    }
}

impl RestoreSink for OpenCommandSink {
    fn open_group(&mut self, group: &RestoreGroup) -> Result<()> {
        let status = self
            .command_for(group)
            .status()
            .with_context(|| format!("failed to run {}", self.program))?;
        if !status.success() {
            bail!("{} exited with {}", self.program, status);
        }
        Ok(())
    }
}

/// Writes what would be opened instead of opening it.
pub struct DryRunSink<W: Write> {
    writer: W,
}

impl<W: Write> DryRunSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RestoreSink for DryRunSink<W> {
    fn open_group(&mut self, group: &RestoreGroup) -> Result<()> {
        writeln!(self.writer, "{}", group.title)?;
        for url in &group.urls {
            writeln!(self.writer, "  {url}")?;
        }
        Ok(())
    }
}

/// Outcome of a restore run.
#[derive(Debug, Default)]
pub struct RestoreReport {
    pub opened: usize,
    /// Group title and the error that stopped it.
    pub failed: Vec<(String, anyhow::Error)>,
}

impl RestoreReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Open every group in order, carrying on past failures.
pub fn restore_groups(sink: &mut dyn RestoreSink, groups: &[RestoreGroup]) -> RestoreReport {
    let mut report = RestoreReport::default();
    for group in groups {
        match sink.open_group(group) {
            Ok(()) => report.opened += 1,
            Err(e) => report.failed.push((group.title.clone(), e)),
        }
    }
    report
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
