//! One regeneration pass: snapshot the source tree, then persist it.

use std::path::{Path, PathBuf};

use super::{BundleError, BundleFormat, SnapshotOptions, WriteOutcome, snapshot, write_bundle};
use crate::config::WatchConfig;

/// Everything needed to regenerate the artifact.
#[derive(Debug, Clone)]
pub struct BundleJob {
    pub source: PathBuf,
    pub artifact: PathBuf,
    pub format: BundleFormat,
    options: SnapshotOptions,
}

/// Summary of a finished pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub files: usize,
    pub bytes: usize,
    /// Keys recorded empty because they could not be read.
    pub unreadable: Vec<String>,
    pub root_failed: bool,
    pub outcome: WriteOutcome,
}

impl BundleJob {
    pub fn new(source: impl Into<PathBuf>, artifact: impl Into<PathBuf>, format: BundleFormat) -> Self {
        let artifact = artifact.into();
        Self {
            source: source.into(),
            options: SnapshotOptions::default().exclude(artifact.clone()),
            artifact,
            format,
        }
    }

    /// Job for an already resolved `[watch]` section.
    pub fn from_config(watch: &WatchConfig) -> Self {
        let mut job = Self::new(&watch.source, &watch.bundle, watch.format);
        job.options.ignore = watch.ignore.clone();
        job
    }

    pub fn options(&self) -> &SnapshotOptions {
        &self.options
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Snapshot and write. Blocking; run on `spawn_blocking` from async code.
    pub fn run(&self) -> Result<BuildReport, BundleError> {
        let snap = snapshot(&self.source, &self.options);
        let outcome = write_bundle(&snap.bundle, &self.artifact, self.format)?;

        Ok(BuildReport {
            files: snap.bundle.len(),
            bytes: snap.bundle.byte_len(),
            unreadable: snap.unreadable,
            root_failed: snap.root_failed,
            outcome,
        })
    }
}

impl BuildReport {
    /// One-line summary for status output.
    pub fn summary(&self) -> String {
        let mut line = format!(
            "bundled {} ({})",
            crate::utils::plural_count(self.files, "file"),
            format_bytes(self.bytes)
        );
        if !self.unreadable.is_empty() {
            line.push_str(&format!(", {} unreadable", self.unreadable.len()));
        }
        line
    }
}

fn format_bytes(bytes: usize) -> String {
    match bytes {
        b if b < 1024 => format!("{b} B"),
        b if b < 1024 * 1024 => format!("{:.1} KB", b as f64 / 1024.0),
        b => format!("{:.1} MB", b as f64 / (1024.0 * 1024.0)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::read_bundle;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_job_writes_artifact() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("app");
        fs::create_dir_all(source.join("src")).unwrap();
        fs::write(source.join("index.html"), "<div></div>").unwrap();
        fs::write(source.join("src/app.js"), "run()").unwrap();

        let job = BundleJob::new(&source, temp.path().join("out/app-files.json"), BundleFormat::Json);
        let report = job.run().unwrap();

        assert_eq!(report.files, 2);
        assert_eq!(report.bytes, 16);
        assert_eq!(report.outcome, WriteOutcome::Written);
        assert_eq!(read_bundle(&job.artifact).unwrap().get("src/app.js"), Some("run()"));

        assert_eq!(job.run().unwrap().outcome, WriteOutcome::Unchanged);
    }

    #[test]
    fn test_job_excludes_artifact_inside_source() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("main.js"), "1").unwrap();

        let job = BundleJob::new(temp.path(), temp.path().join("app-files.json"), BundleFormat::Json);
        job.run().unwrap();
        let report = job.run().unwrap();

        assert_eq!(report.files, 1);
        assert_eq!(report.outcome, WriteOutcome::Unchanged);
    }

    #[test]
    fn test_job_from_config_uses_ignore_list() {
        let temp = TempDir::new().unwrap();
        let watch = WatchConfig {
            source: temp.path().join("app"),
            bundle: temp.path().join("bundle.json"),
            ..WatchConfig::default()
        };
        fs::create_dir_all(watch.source.join("node_modules/react")).unwrap();
        fs::write(watch.source.join("node_modules/react/index.js"), "x").unwrap();
        fs::write(watch.source.join("app.js"), "y").unwrap();

        let report = BundleJob::from_config(&watch).run().unwrap();
        assert_eq!(report.files, 1);
    }

    #[test]
    fn test_missing_source_writes_empty_bundle() {
        let temp = TempDir::new().unwrap();
        let job = BundleJob::new(temp.path().join("gone"), temp.path().join("b.json"), BundleFormat::Json);

        let report = job.run().unwrap();
        assert!(report.root_failed);
        assert_eq!(report.files, 0);
        assert!(read_bundle(&job.artifact).unwrap().is_empty());
    }

    #[test]
    fn test_summary() {
        let report = BuildReport {
            files: 3,
            bytes: 2048,
            unreadable: vec!["logo.png".into()],
            root_failed: false,
            outcome: WriteOutcome::Written,
        };
        assert_eq!(report.summary(), "bundled 3 files (2.0 KB), 1 unreadable");
    }
}
