//! Persisted project identity (`project.json`).
//!
//! Created once with a fresh UUID and reused by every later run. The record
//! is loaded at start-up and passed explicitly to whoever needs it.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ConfigError;

/// Project record file name (next to appshell.toml)
pub const PROJECT_FILE: &str = "project.json";

/// Version written into freshly created records
const INITIAL_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    pub project_id: Uuid,
    pub version: String,
}

impl ProjectConfig {
    pub fn path(root: &Path) -> PathBuf {
        root.join(PROJECT_FILE)
    }

    /// Read the record if it exists.
    pub fn load(root: &Path) -> Result<Option<Self>, ConfigError> {
        let path = Self::path(root);
        match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content)
                .map(Some)
                .map_err(|e| ConfigError::Project(path, e)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ConfigError::Io(path, e)),
        }
    }

    /// Return the existing record, or create it.
    ///
    /// The boolean is `true` when this call created the file. The record is
    /// written to a temporary sibling and hard-linked into place, so readers
    /// never see a partial file and racing callers end up with one record.
    pub fn load_or_create(root: &Path) -> Result<(Self, bool), ConfigError> {
        if let Some(existing) = Self::load(root)? {
            return Ok((existing, false));
        }

        let record = Self {
            project_id: Uuid::new_v4(),
            version: INITIAL_VERSION.to_string(),
        };
        let path = Self::path(root);
        let mut json = serde_json::to_string_pretty(&record)
            .map_err(|e| ConfigError::Project(path.clone(), e))?;
        json.push('\n');

        let temp = root.join(format!(".{}.{}.tmp", PROJECT_FILE, record.project_id));
        fs::write(&temp, &json).map_err(|e| ConfigError::Io(temp.clone(), e))?;
        let linked = fs::hard_link(&temp, &path);
        let _ = fs::remove_file(&temp);

        match linked {
            Ok(()) => {
                crate::debug!("project"; "created project {}", record.project_id);
                Ok((record, true))
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                let existing = Self::load(root)?.ok_or_else(|| {
                    ConfigError::Io(path, std::io::Error::from(ErrorKind::NotFound))
                })?;
                Ok((existing, false))
            }
            Err(e) => Err(ConfigError::Io(path, e)),
        }
    }
}
