//! Local config file.
//!
//! Settings live in `$HOME/.closed-windows/config.toml`. Every field is
//! optional; a missing file means defaults. The session file location is
//! resolved through layers (flag, environment, file, default).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::heuristics::KeyLists;
use crate::loader::default_source_path;
use crate::miner::{DEFAULT_MAX_DEPTH, ExtractOptions};

/// Environment variable overriding the session file location.
pub const SOURCE_ENV_VAR: &str = "CLOSED_WINDOWS_SOURCE";

/// Config directory under `$HOME/`.
const CONFIG_DIR_NAME: &str = ".closed-windows";

/// Config file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Browser the restore sink targets when nothing is configured.
pub const DEFAULT_BROWSER_APP: &str = "Safari";

/// Program the restore sink runs when nothing is configured.
pub const DEFAULT_OPEN_PROGRAM: &str = "open";

/// Which configuration layer supplied the session file path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceOrigin {
    Flag,
    Env,
    ConfigFile,
    Default,
}

impl std::fmt::Display for SourceOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceOrigin::Flag => write!(f, "--source flag"),
            SourceOrigin::Env => write!(f, "{SOURCE_ENV_VAR}"),
            SourceOrigin::ConfigFile => write!(f, "config file"),
            SourceOrigin::Default => write!(f, "default"),
        }
    }
}

/// Result of resolving the session file path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSource {
    pub path: PathBuf,
    pub origin: SourceOrigin,
}

/// Persisted settings.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Session file to read instead of the browser's default one.
    pub source_path: Option<String>,
    /// Application the restore sink asks to open URLs.
    pub browser_app: Option<String>,
    /// Program used to hand URLs to the browser.
    pub open_program: Option<String>,
    /// Recursion ceiling for tree traversal.
    pub max_depth: Option<usize>,
    /// Extra URL field names, tried after the built-in ones.
    pub extra_url_keys: Option<Vec<String>>,
    /// Extra title field names, tried after the built-in ones.
    pub extra_title_keys: Option<Vec<String>>,
    /// Extra close-date field names, tried after the built-in ones.
    pub extra_closed_date_keys: Option<Vec<String>>,
}

impl Config {
    /// `$HOME/.closed-windows/config.toml`, or `None` without `$HOME`.
    pub fn config_path() -> Option<PathBuf> {
        Some(Self::config_path_with_home(home_dir()?.as_path()))
    }

    fn config_path_with_home(home: &Path) -> PathBuf {
        home.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME)
    }

    /// Load config from disk. Returns defaults if the file does not exist.
    ///
    /// Parse errors and I/O errors other than not-found are hard failures.
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load config from a specific path. Returns defaults if the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents)
                .with_context(|| format!("failed to parse config file at {}", path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => {
                Err(e).with_context(|| format!("failed to read config file at {}", path.display()))
            }
        }
    }

    /// Resolve the session file path.
    ///
    /// Priority (highest wins):
    /// 1. `cli_override` (`--source`)
    /// 2. `CLOSED_WINDOWS_SOURCE`
    /// 3. `source_path` from the config file
    /// 4. `~/Library/Safari/RecentlyClosedTabs.plist`
    ///
    /// Empty or whitespace-only values fall through to the next layer.
    pub fn resolve_source(&self, cli_override: Option<&Path>) -> ResolvedSource {
        self.resolve_source_with(
            cli_override,
            std::env::var(SOURCE_ENV_VAR).ok(),
            home_dir(),
        )
    }

    fn resolve_source_with(
        &self,
        cli_override: Option<&Path>,
        env_value: Option<String>,
        home: Option<PathBuf>,
    ) -> ResolvedSource {
        let layers = [
            (
                cli_override.map(|p| p.to_string_lossy().into_owned()),
                SourceOrigin::Flag,
            ),
            (env_value, SourceOrigin::Env),
            (self.source_path.clone(), SourceOrigin::ConfigFile),
        ];

        for (value, origin) in layers {
            if let Some(raw) = non_empty_trimmed(value) {
                return ResolvedSource {
                    path: expand_home(&raw, home.as_deref()),
                    origin,
                };
            }
        }

        let home = home.unwrap_or_else(|| PathBuf::from("/"));
        ResolvedSource {
            path: default_source_path(&home),
            origin: SourceOrigin::Default,
        }
    }

    /// Browser application for the restore sink.
    pub fn browser_app(&self) -> String {
        non_empty_trimmed(self.browser_app.clone())
            .unwrap_or_else(|| DEFAULT_BROWSER_APP.to_string())
    }

    /// Program for the restore sink.
    pub fn open_program(&self) -> String {
        non_empty_trimmed(self.open_program.clone())
            .unwrap_or_else(|| DEFAULT_OPEN_PROGRAM.to_string())
    }

    /// Extraction options: built-in key lists plus configured extras.
    pub fn extract_options(&self) -> ExtractOptions {
        let keys = KeyLists::default().with_extra(
            self.extra_url_keys.as_deref().unwrap_or_default(),
            self.extra_title_keys.as_deref().unwrap_or_default(),
            self.extra_closed_date_keys.as_deref().unwrap_or_default(),
        );
        ExtractOptions {
            keys,
            max_depth: self.max_depth.unwrap_or(DEFAULT_MAX_DEPTH).max(1),
        }
    }
}

/// Expand a leading `~/` against the home directory.
fn expand_home(raw: &str, home: Option<&Path>) -> PathBuf {
    match (raw.strip_prefix("~/"), home) {
        (Some(rest), Some(home)) => home.join(rest),
        _ if raw == "~" => home.map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from(raw)),
        _ => PathBuf::from(raw),
    }
}

/// Return the trimmed value if non-empty after trimming, otherwise `None`.
fn non_empty_trimmed(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim().to_string();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    })
}

/// Resolve the user's home directory from the `HOME` environment variable.
pub fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(PathBuf::from)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    /// Helper: save/restore an env var around a test.
    struct EnvGuard {
        key: String,
        original: Option<String>,
    }

    impl EnvGuard {
        fn new(key: &str) -> Self {
            Self {
                key: key.to_string(),
                original: std::env::var(key).ok(),
            }
        }

        fn set(&self, value: &str) {
            unsafe { std::env::set_var(&self.key, value) };
        }

        fn remove(&self) {
            unsafe { std::env::remove_var(&self.key) };
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            match &self.original {
                Some(v) => unsafe { std::env::set_var(&self.key, v) },
                None => unsafe { std::env::remove_var(&self.key) },
            }
        }
    }

    fn home() -> Option<PathBuf> {
        Some(PathBuf::from("/Users/tester"))
    }

    // -----------------------------------------------------------------------
    // Config path
    // -----------------------------------------------------------------------

    #[test]
    fn test_config_path_with_home() {
        let path = Config::config_path_with_home(Path::new("/home/tester"));
        assert_eq!(path, PathBuf::from("/home/tester/.closed-windows/config.toml"));
    }

    #[test]
    #[serial]
    fn test_config_path_uses_home_env() {
        let guard = EnvGuard::new("HOME");
        guard.set("/tmp/fake-home");

        assert_eq!(
            Config::config_path().unwrap(),
            PathBuf::from("/tmp/fake-home/.closed-windows/config.toml")
        );
        drop(guard);
    }

    #[test]
    #[serial]
    fn test_config_path_none_when_home_missing() {
        let guard = EnvGuard::new("HOME");
        guard.remove();

        assert!(Config::config_path().is_none());
        drop(guard);
    }

    // -----------------------------------------------------------------------
    // load_from
    // -----------------------------------------------------------------------

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let tmp = TempDir::new().unwrap();
        let cfg = Config::load_from(&tmp.path().join("nope.toml")).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn test_load_partial_fields() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(
            &path,
            "browser_app = \"Safari Technology Preview\"\nextra_url_keys = [\"CurrentURL\"]\n",
        )
        .unwrap();

        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.browser_app.as_deref(), Some("Safari Technology Preview"));
        assert_eq!(cfg.extra_url_keys, Some(vec!["CurrentURL".to_string()]));
        assert_eq!(cfg.source_path, None);
    }

    #[test]
    fn test_load_malformed_toml_returns_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "max_depth = \"deep\"").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("failed to parse config file"));
    }

    // -----------------------------------------------------------------------
    // resolve_source
    // -----------------------------------------------------------------------

    #[test]
    fn test_resolve_default_when_nothing_set() {
        let resolved = Config::default().resolve_source_with(None, None, home());
        assert_eq!(resolved.origin, SourceOrigin::Default);
        assert_eq!(
            resolved.path,
            PathBuf::from("/Users/tester/Library/Safari/RecentlyClosedTabs.plist")
        );
    }

    #[test]
    fn test_resolve_file_overrides_default() {
        let cfg = Config {
            source_path: Some("/data/tabs.plist".into()),
            ..Config::default()
        };
        let resolved = cfg.resolve_source_with(None, None, home());
        assert_eq!(resolved.origin, SourceOrigin::ConfigFile);
        assert_eq!(resolved.path, PathBuf::from("/data/tabs.plist"));
    }

    #[test]
    fn test_resolve_env_overrides_file() {
        let cfg = Config {
            source_path: Some("/data/tabs.plist".into()),
            ..Config::default()
        };
        let resolved = cfg.resolve_source_with(None, Some("/env/tabs.plist".into()), home());
        assert_eq!(resolved.origin, SourceOrigin::Env);
        assert_eq!(resolved.path, PathBuf::from("/env/tabs.plist"));
    }

    #[test]
    fn test_resolve_flag_overrides_all() {
        let cfg = Config {
            source_path: Some("/data/tabs.plist".into()),
            ..Config::default()
        };
        let resolved = cfg.resolve_source_with(
            Some(Path::new("/flag/tabs.plist")),
            Some("/env/tabs.plist".into()),
            home(),
        );
        assert_eq!(resolved.origin, SourceOrigin::Flag);
        assert_eq!(resolved.path, PathBuf::from("/flag/tabs.plist"));
    }

    #[test]
    fn test_resolve_whitespace_layers_fall_through() {
        let cfg = Config {
            source_path: Some("   ".into()),
            ..Config::default()
        };
        let resolved = cfg.resolve_source_with(Some(Path::new(" ")), Some("".into()), home());
        assert_eq!(resolved.origin, SourceOrigin::Default);
    }

    #[test]
    fn test_resolve_expands_tilde() {
        let cfg = Config {
            source_path: Some("~/backups/tabs.plist".into()),
            ..Config::default()
        };
        let resolved = cfg.resolve_source_with(None, None, home());
        assert_eq!(resolved.path, PathBuf::from("/Users/tester/backups/tabs.plist"));
    }

    #[test]
    #[serial]
    fn test_resolve_source_reads_real_env_var() {
        let guard = EnvGuard::new(SOURCE_ENV_VAR);
        guard.set("/from/env.plist");

        let resolved = Config::default().resolve_source(None);
        assert_eq!(resolved.origin, SourceOrigin::Env);
        assert_eq!(resolved.path, PathBuf::from("/from/env.plist"));
        drop(guard);
    }

    // -----------------------------------------------------------------------
    // derived settings
    // -----------------------------------------------------------------------

    #[test]
    fn test_browser_and_program_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.browser_app(), "Safari");
        assert_eq!(cfg.open_program(), "open");

        let cfg = Config {
            browser_app: Some(" Firefox ".into()),
            open_program: Some("".into()),
            ..Config::default()
        };
        assert_eq!(cfg.browser_app(), "Firefox");
        assert_eq!(cfg.open_program(), "open");
    }

    #[test]
    fn test_extract_options_defaults() {
        assert_eq!(Config::default().extract_options(), ExtractOptions::default());
    }

    #[test]
    fn test_extract_options_applies_extras_and_clamps_depth() {
        let cfg = Config {
            max_depth: Some(0),
            extra_title_keys: Some(vec!["DisplayTitle".into()]),
            ..Config::default()
        };
        let opts = cfg.extract_options();
        assert_eq!(opts.max_depth, 1);
        assert_eq!(opts.keys.title_keys.last().unwrap(), "DisplayTitle");
    }
}
