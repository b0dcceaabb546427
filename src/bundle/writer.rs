//! Bundle writer and reader.
//!
//! The artifact is replaced atomically: the new content goes to a hidden
//! sibling temp file which is then renamed over the old artifact, so a
//! reader sees either the previous bundle or the new one, never a mix.

use std::fs;
use std::path::{Path, PathBuf};

use super::{BundleError, BundleFormat, FileBundle};

/// Header line of the ES module format
const MODULE_HEADER: &str = "// Generated by appshell watch. Do not edit.";
const MODULE_PREFIX: &str = "export default ";

/// Whether `write_bundle` touched the disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    /// Serialized content matched the existing artifact.
    Unchanged,
}

/// Serialize a bundle in the given format.
pub fn encode(bundle: &FileBundle, format: BundleFormat) -> Result<String, BundleError> {
    let json = serde_json::to_string_pretty(bundle)?;
    Ok(match format {
        BundleFormat::Json => format!("{json}\n"),
        BundleFormat::Module => format!("{MODULE_HEADER}\n{MODULE_PREFIX}{json};\n"),
    })
}

/// Parse artifact content written in either format.
pub fn decode(content: &str) -> Result<FileBundle, serde_json::Error> {
    let body: String = content
        .lines()
        .filter(|line| !line.trim_start().starts_with("//"))
        .collect::<Vec<_>>()
        .join("\n");

    let body = body.trim();
    let body = body.strip_prefix(MODULE_PREFIX).unwrap_or(body);
    let body = body.strip_suffix(';').unwrap_or(body);
    serde_json::from_str(body)
}

/// Persist `bundle` at `path`, replacing any previous artifact entirely.
pub fn write_bundle(
    bundle: &FileBundle,
    path: &Path,
    format: BundleFormat,
) -> Result<WriteOutcome, BundleError> {
    let content = encode(bundle, format)?;

    if file_content_matches(path, &content) {
        crate::debug!("bundle"; "artifact unchanged, skipping write");
        return Ok(WriteOutcome::Unchanged);
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| BundleError::io(parent, e))?;
    }

    let temp = temp_path(path);
    fs::write(&temp, &content).map_err(|e| BundleError::io(&temp, e))?;

    if let Err(e) = fs::rename(&temp, path) {
        let _ = fs::remove_file(&temp);
        return Err(BundleError::io(path, e));
    }

    crate::debug!("bundle"; "wrote {} ({} entries)", path.display(), bundle.len());
    Ok(WriteOutcome::Written)
}

/// Read an artifact back into a bundle.
pub fn read_bundle(path: &Path) -> Result<FileBundle, BundleError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(BundleError::Missing(path.to_path_buf()));
        }
        Err(e) => return Err(BundleError::io(path, e)),
    };

    decode(&content).map_err(|source| BundleError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}

/// Hidden sibling used as the rename source.
fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "bundle".into());
    path.with_file_name(format!(".{name}.tmp"))
}

fn file_content_matches(path: &Path, content: &str) -> bool {
    fs::read_to_string(path).is_ok_and(|existing| existing == content)
}
