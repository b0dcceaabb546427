use std::path::{Path, PathBuf};

use super::types::{ChangeKind, RawChanges, WatchEvent};
use crate::bundle::SnapshotOptions;
use crate::utils::path::{bundle_key, is_hidden, normalize_path};

/// Decides which notify paths belong to the bundle.
///
/// Mirrors the snapshotter's rules so the watcher never flushes for a change
/// the snapshot would skip anyway: hidden entries, ignored prefixes and the
/// artifact itself.
pub(super) struct EventFilter {
    /// The root as configured and its canonical form (notify may report either)
    roots: Vec<PathBuf>,
    options: SnapshotOptions,
}

impl EventFilter {
    pub(super) fn new(root: &Path, options: SnapshotOptions) -> Self {
        let mut roots = vec![root.to_path_buf()];
        let canonical = normalize_path(root);
        if canonical != root {
            roots.push(canonical);
        }

        let mut options = options;
        let extra: Vec<_> = options.exclude.iter().map(|p| normalize_path(p)).collect();
        options.exclude.extend(extra);

        Self { roots, options }
    }

    pub(super) fn is_root(&self, path: &Path) -> bool {
        self.roots.iter().any(|root| root == path)
    }

    /// Bundle key for `path`, or `None` if the change is irrelevant.
    pub(super) fn key(&self, path: &Path) -> Option<String> {
        if self.options.is_excluded(path) {
            return None;
        }

        let (root, key) = self
            .roots
            .iter()
            .find_map(|root| bundle_key(root, path).map(|key| (root, key)))?;

        if is_hidden(root, path) || self.options.is_ignored(&key) {
            return None;
        }
        Some(key)
    }

    /// Whether a raw path should reach the debouncer.
    pub(super) fn accepts(&self, path: &Path) -> bool {
        self.is_root(path) || self.key(path).is_some()
    }

    /// Turn debounced absolute paths into root-relative events.
    ///
    /// The root itself carries no key and is left out.
    pub(super) fn to_events(&self, changes: RawChanges) -> Vec<WatchEvent> {
        changes
            .into_iter()
            .filter_map(|(path, kind): (PathBuf, ChangeKind)| {
                self.key(&path).map(|path| WatchEvent { kind, path })
            })
            .collect()
    }
}
