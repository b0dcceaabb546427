//! Dev tool configuration: `appshell.toml` plus the persisted project record.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/   # [watch] and [bridge]
//! ├── error      # ConfigError, ConfigDiagnostics
//! ├── project    # project.json (create once, reuse)
//! └── mod.rs     # AppConfig (this file)
//! ```
//!
//! The file is optional: every field has a default, and the project root
//! falls back to the current directory when no config is found.

mod error;
pub mod project;
pub mod section;

pub use error::{ConfigDiagnostics, ConfigError};
pub use project::ProjectConfig;
pub use section::{BridgeConfig, WatchConfig};

use crate::cli::{BridgeArgs, Cli, Commands, SourceArgs};
use crate::log;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure representing appshell.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    #[serde(default)]
    pub watch: WatchConfig,

    #[serde(default)]
    pub bridge: BridgeConfig,
}

impl AppConfig {
    /// Load configuration for a CLI invocation.
    ///
    /// Searches upward from cwd for the config file, applies CLI overrides,
    /// resolves paths against the project root and validates the result.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let mut config = match find_config_file(&cwd, &cli.config) {
            Some(path) => {
                let mut config = Self::from_path(&path)?;
                config.root = path.parent().map(Path::to_path_buf).unwrap_or(cwd);
                config.config_path = path;
                config
            }
            None => {
                crate::debug!("config"; "no {} found, using defaults", cli.config.display());
                Self {
                    config_path: cwd.join(&cli.config),
                    root: cwd,
                    ..Self::default()
                }
            }
        };

        config.apply_cli(cli);
        config.resolve_paths();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "ignoring unknown fields in {}: {}", display_path, fields.join(", "));
    }

    /// Apply command-line overrides on top of the file values.
    fn apply_cli(&mut self, cli: &Cli) {
        match &cli.command {
            Commands::Watch { source, bridge, port, .. } => {
                self.apply_source_args(source);
                self.apply_bridge_args(bridge);
                if let Some(port) = port {
                    self.bridge.port = *port;
                }
            }
            Commands::Snapshot { source } => self.apply_source_args(source),
            Commands::Url { bridge, .. } | Commands::Publish { bridge, .. } => {
                self.apply_bridge_args(bridge)
            }
            Commands::Restore { .. } | Commands::Init => {}
        }
    }

    fn apply_source_args(&mut self, args: &SourceArgs) {
        if let Some(source) = &args.source {
            self.watch.source = source.clone();
        }
        if let Some(bundle) = &args.bundle {
            self.watch.bundle = bundle.clone();
        }
        if let Some(format) = args.format {
            self.watch.format = format;
        }
    }

    fn apply_bridge_args(&mut self, args: &BridgeArgs) {
        if let Some(app_id) = &args.app_id {
            self.bridge.app_id = app_id.clone();
        }
        if let Some(dev) = args.dev {
            self.bridge.dev = dev;
        }
    }

    /// Turn root-relative paths into absolute ones (with `~` expansion).
    fn resolve_paths(&mut self) {
        self.watch.source = self.root_path(&self.watch.source);
        self.watch.bundle = self.root_path(&self.watch.bundle);
    }

    /// Resolve a user-supplied path against the project root.
    pub fn root_path(&self, path: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();
        let path = PathBuf::from(expanded);
        if path.is_relative() {
            self.root.join(path)
        } else {
            path
        }
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        &self.root
    }

    /// Validate values that would make the pipeline misbehave.
    ///
    /// Collects all validation errors and returns them at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut diag = ConfigDiagnostics::new();

        if self.watch.debounce_ms == 0 {
            diag.error("watch.debounce_ms", "must be greater than 0");
        }
        if self.watch.bundle == self.watch.source {
            diag.error("watch.bundle", "must not be the watched source directory");
        }

        let app_id = &self.bridge.app_id;
        if app_id.is_empty() {
            diag.error_with_hint("bridge.app_id", "must not be empty", "set `app_id = \"my-app\"`");
        } else if !app_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        {
            diag.error(
                "bridge.app_id",
                format!("`{app_id}` may only contain letters, digits, `-`, `_` and `.`"),
            );
        }

        for (field, host) in [
            ("bridge.dev_host", &self.bridge.dev_host),
            ("bridge.prod_host", &self.bridge.prod_host),
        ] {
            if !is_http_origin(host) {
                diag.error_with_hint(
                    field,
                    format!("`{host}` is not an http(s) URL"),
                    "use a value like `http://localhost:3000`",
                );
            }
        }
        if self.bridge.extra_origins.iter().any(|o| !is_http_origin(o)) {
            diag.error("bridge.extra_origins", "every entry must be an http(s) origin");
        }

        diag.into_result()
    }
}

fn is_http_origin(value: &str) -> bool {
    url::Url::parse(value).is_ok_and(|u| matches!(u.scheme(), "http" | "https") && u.has_host())
}

/// Find config file by searching upward from `start`.
///
/// ```text
/// /home/user/miniapp/app/pages/   ← cwd
/// /home/user/miniapp/appshell.toml ← found
/// ```
fn find_config_file(start: &Path, config_name: &Path) -> Option<PathBuf> {
    if config_name.is_absolute() {
        return config_name.exists().then(|| config_name.to_path_buf());
    }

    start
        .ancestors()
        .map(|dir| dir.join(config_name))
        .find(|candidate| candidate.is_file())
}

/// Parse config and panic on unknown fields (to catch typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> AppConfig {
    let (parsed, ignored) = AppConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}
