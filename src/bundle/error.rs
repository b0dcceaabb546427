//! Error types for bundle operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while writing, reading or restoring a bundle.
#[derive(Debug, Error)]
pub enum BundleError {
    /// I/O error on a specific path.
    #[error("I/O error on `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Bundle artifact does not exist.
    #[error("bundle not found: `{0}`")]
    Missing(PathBuf),

    /// Bundle artifact is not a JSON object of strings.
    #[error("malformed bundle `{path}`: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Serialization failed (never expected for string maps).
    #[error("failed to serialize bundle: {0}")]
    Encode(#[from] serde_json::Error),

    /// Key would resolve outside the restore target.
    #[error("refusing to restore unsafe path `{0}`")]
    UnsafeKey(String),

    /// Two entries (or an entry and the existing tree) need the same path
    /// as both a file and a directory.
    #[error("conflicting restore paths `{first}` and `{second}`")]
    Conflict { first: String, second: String },
}

impl BundleError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_displays_path() {
        let err = BundleError::Missing(PathBuf::from("generated/app-files.json"));
        assert_eq!(
            err.to_string(),
            "bundle not found: `generated/app-files.json`"
        );
    }

    #[test]
    fn test_io_displays_source() {
        let err = BundleError::io(
            "app/a.txt",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().contains("app/a.txt"));
        assert!(err.to_string().contains("denied"));
    }
}
