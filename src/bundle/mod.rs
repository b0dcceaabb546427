//! File bundles: a flat `relative path -> content` snapshot of a source tree.
//!
//! ```text
//! snapshot (read tree) --> FileBundle --> writer (atomic artifact) --> restore (tree)
//! ```
//!
//! A bundle is regenerated wholesale on every flush; nothing here patches
//! an existing artifact in place.

mod error;
mod job;
pub mod restore;
pub mod snapshot;
pub mod writer;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use error::BundleError;
pub use job::{BuildReport, BundleJob};
pub use restore::restore_bundle;
pub use snapshot::{SnapshotOptions, snapshot};
pub use writer::{WriteOutcome, read_bundle, write_bundle};

/// Relative path (forward slashes) to UTF-8 file content.
///
/// Backed by a `BTreeMap` so the serialized artifact is stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileBundle(BTreeMap<String, String>);

impl FileBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, content: impl Into<String>) {
        self.0.insert(key.into(), content.into());
    }

    #[cfg(test)]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    #[cfg(test)]
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[cfg(test)]
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Total content size in bytes.
    pub fn byte_len(&self) -> usize {
        self.0.values().map(String::len).sum()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FileBundle {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// On-disk representation of the bundle artifact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BundleFormat {
    /// Plain JSON object.
    #[default]
    Json,
    /// ES module with the object as its default export.
    Module,
}
