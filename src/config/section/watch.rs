//! `[watch]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [watch]
//! source = "app"                      # Directory mirrored into the bundle
//! bundle = "generated/app-files.json" # Bundle artifact path
//! format = "json"                     # "json" or "module"
//! debounce_ms = 300                   # Quiet window before regenerating
//! stability_ms = 100                  # File size must hold still this long
//! ignore = ["node_modules"]           # Extra directories to skip
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::bundle::BundleFormat;

/// File watcher and bundle settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Source directory, relative to the project root.
    pub source: PathBuf,

    /// Bundle artifact path, relative to the project root.
    pub bundle: PathBuf,

    /// Serialization of the bundle artifact.
    pub format: BundleFormat,

    /// Quiescence window in milliseconds. Reset on every event.
    pub debounce_ms: u64,

    /// How long a file's size must stay unchanged before it is read.
    pub stability_ms: u64,

    /// Root-relative path prefixes excluded from snapshots.
    pub ignore: Vec<String>,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from("app"),
            bundle: PathBuf::from("generated/app-files.json"),
            format: BundleFormat::Json,
            debounce_ms: 300,
            stability_ms: 100,
            ignore: vec!["node_modules".into()],
        }
    }
}

impl WatchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn stability(&self) -> Duration {
        Duration::from_millis(self.stability_ms)
    }
}
