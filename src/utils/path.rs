//! Path normalization utilities.
//!
//! - `normalize_path` - file system paths (canonicalize + fallback)
//! - `bundle_key` - root-relative, forward-slash key used in a `FileBundle`
//! - `is_hidden` - dot-prefixed component check

use std::path::{Component, Path, PathBuf};

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`).
/// Falls back to:
/// - Return as-is if already absolute
/// - Join with current directory if relative
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

/// Build the bundle key for `path` relative to `root`.
///
/// Components are joined with `/` regardless of platform. Returns `None`
/// when `path` is not under `root` or is `root` itself.
pub fn bundle_key(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<_> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect();

    if parts.is_empty() {
        return None;
    }
    Some(parts.join("/"))
}

/// Check whether any component of `path` below `root` starts with a dot.
pub fn is_hidden(root: &Path, path: &Path) -> bool {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative.components().any(|c| match c {
        Component::Normal(part) => part.to_str().is_some_and(|s| s.starts_with('.')),
        _ => false,
    })
}

/// Resolve a bundle key against a target directory.
///
/// Rejects keys that would land outside `target` (absolute paths, `..`,
/// drive prefixes) and empty keys.
pub fn resolve_key(target: &Path, key: &str) -> Option<PathBuf> {
    let mut resolved = target.to_path_buf();
    let mut depth = 0usize;

    for part in key.split('/') {
        match part {
            "" | "." => continue,
            ".." => return None,
            _ if Path::new(part).is_absolute() || part.contains('\\') || part.contains(':') => {
                return None;
            }
            _ => {
                resolved.push(part);
                depth += 1;
            }
        }
    }

    (depth > 0 && !key.starts_with('/')).then_some(resolved)
}
