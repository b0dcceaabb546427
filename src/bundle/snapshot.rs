//! Directory snapshotter.
//!
//! Walks a source tree (parallel `jwalk`), skips hidden and ignored entries,
//! then reads every regular file on the rayon pool. The bundle is assembled
//! only after every read has finished.

use std::fs;
use std::path::{Path, PathBuf};

use jwalk::WalkDir;
use rayon::prelude::*;

use super::FileBundle;
use crate::utils::path::bundle_key;

/// What to leave out of a snapshot besides dot-prefixed entries.
#[derive(Debug, Clone, Default)]
pub struct SnapshotOptions {
    /// Names (no `/`) matched at any depth, or root-relative prefixes.
    pub ignore: Vec<String>,
    /// Files never included, e.g. the bundle artifact itself.
    pub exclude: Vec<PathBuf>,
}

impl SnapshotOptions {
    pub fn new(ignore: &[String]) -> Self {
        Self {
            ignore: ignore.to_vec(),
            exclude: Vec::new(),
        }
    }

    pub fn exclude(mut self, path: impl Into<PathBuf>) -> Self {
        self.exclude.push(path.into());
        self
    }

    pub fn is_excluded(&self, path: &Path) -> bool {
        self.exclude.iter().any(|excluded| excluded == path)
    }

    /// Whether a root-relative key falls under the ignore list.
    pub fn is_ignored(&self, key: &str) -> bool {
        self.ignore.iter().any(|pattern| {
            if pattern.contains('/') {
                let pattern = pattern.trim_matches('/');
                key == pattern || key.starts_with(&format!("{pattern}/"))
            } else {
                key.split('/').any(|part| part == pattern)
            }
        })
    }
}

/// Result of one snapshot pass.
#[derive(Debug, Default)]
pub struct Snapshot {
    pub bundle: FileBundle,
    /// Keys recorded with empty content because the read failed.
    pub unreadable: Vec<String>,
    /// The root itself could not be read; `bundle` is empty.
    pub root_failed: bool,
}

/// Read every regular, non-hidden file under `root` into a bundle.
///
/// Never fails: an unreadable file becomes an empty entry with a warning,
/// an unreadable root becomes an empty bundle with a logged error.
pub fn snapshot(root: &Path, options: &SnapshotOptions) -> Snapshot {
    if let Err(e) = fs::read_dir(root) {
        crate::log!("error"; "cannot read {}: {}", root.display(), e);
        return Snapshot {
            root_failed: true,
            ..Snapshot::default()
        };
    }

    let files = collect_files(root, options);

    let results: Vec<(String, Result<String, std::io::Error>)> = files
        .into_par_iter()
        .map(|(key, path)| {
            let content = fs::read_to_string(&path);
            (key, content)
        })
        .collect();

    let mut snapshot = Snapshot::default();
    for (key, content) in results {
        match content {
            Ok(content) => snapshot.bundle.insert(key, content),
            Err(e) => {
                crate::log!("warning"; "unreadable {}: {}", key, e);
                snapshot.bundle.insert(key.clone(), String::new());
                snapshot.unreadable.push(key);
            }
        }
    }

    crate::debug!("bundle"; "snapshot of {}: {} files", root.display(), snapshot.bundle.len());
    snapshot
}

/// Walk the tree and return `(key, absolute path)` for each regular file.
fn collect_files(root: &Path, options: &SnapshotOptions) -> Vec<(String, PathBuf)> {
    let prune_root = root.to_path_buf();
    let prune_options = options.clone();

    let walker = WalkDir::new(root)
        .skip_hidden(true)
        .follow_links(false)
        .process_read_dir(move |_depth, dir, _state, children| {
            children.retain(|child| {
                let Ok(entry) = child else {
                    return true;
                };
                bundle_key(&prune_root, &dir.join(&entry.file_name))
                    .is_none_or(|key| !prune_options.is_ignored(&key))
            });
        });

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                crate::log!("warning"; "skipping unreadable entry: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        if options.is_excluded(&path) {
            continue;
        }
        if let Some(key) = bundle_key(root, &path) {
            files.push((key, path));
        }
    }
    files
}
