//! Re-materialize a bundle artifact as a directory tree.
//!
//! Existing files are overwritten without prompting. Every key is checked
//! before the first write, so an unsafe or colliding key aborts with
//! nothing written.

use std::fs;
use std::path::{Path, PathBuf};

use super::{BundleError, FileBundle, read_bundle};
use crate::utils::path::resolve_key;

/// What a restore did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RestoreReport {
    /// Files written (created or overwritten).
    pub written: usize,
    /// Files that existed before and were replaced.
    pub overwritten: usize,
}

/// Read the artifact at `bundle_path` and write its files under `target`.
pub fn restore_bundle(bundle_path: &Path, target: &Path) -> Result<RestoreReport, BundleError> {
    let bundle = read_bundle(bundle_path)?;
    restore_files(&bundle, target)
}

/// Write every bundle entry under `target`, creating directories as needed.
pub fn restore_files(bundle: &FileBundle, target: &Path) -> Result<RestoreReport, BundleError> {
    let planned = plan(bundle, target)?;

    let mut report = RestoreReport::default();
    for (path, content) in planned {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| BundleError::io(parent, e))?;
        }
        if path.is_file() {
            report.overwritten += 1;
        }
        fs::write(&path, content).map_err(|e| BundleError::io(&path, e))?;
        report.written += 1;
    }

    crate::debug!("restore"; "{} files into {}", report.written, target.display());
    Ok(report)
}

/// Resolve all destination paths up front.
///
/// Two keys that land on the same path, or where one lands on a directory
/// the other needs, are rejected here. So is a destination already taken
/// by a directory, or one whose parent is an existing file.
fn plan<'a>(bundle: &'a FileBundle, target: &Path) -> Result<Vec<(PathBuf, &'a str)>, BundleError> {
    let mut planned = bundle
        .iter()
        .map(|(key, content)| {
            resolve_key(target, key)
                .map(|path| (path, content))
                .ok_or_else(|| BundleError::UnsafeKey(key.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    // Sorted, a file and anything nested under it end up adjacent.
    planned.sort_by(|a, b| a.0.cmp(&b.0));
    for pair in planned.windows(2) {
        let (first, second) = (&pair[0].0, &pair[1].0);
        if second.starts_with(first) {
            return Err(conflict(target, first, second));
        }
    }

    for (path, _) in &planned {
        if path.is_dir() {
            return Err(conflict(target, path, path));
        }
        let blocked = path
            .ancestors()
            .skip(1)
            .take_while(|dir| dir.starts_with(target) && *dir != target)
            .find(|dir| dir.is_file());
        if let Some(file) = blocked {
            return Err(conflict(target, file, path));
        }
    }

    Ok(planned)
}

fn conflict(target: &Path, first: &Path, second: &Path) -> BundleError {
    let rel = |p: &Path| p.strip_prefix(target).unwrap_or(p).display().to_string();
    BundleError::Conflict {
        first: rel(first),
        second: rel(second),
    }
}
