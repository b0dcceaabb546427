//! One-shot bundle commands.

use std::path::Path;

use anyhow::{Context, Result};

use crate::bundle::{BundleJob, WriteOutcome, restore_bundle};
use crate::config::AppConfig;
use crate::log;
use crate::utils::plural_count;

/// `appshell snapshot`: write the bundle once.
pub fn snapshot(config: &AppConfig) -> Result<()> {
    let job = BundleJob::from_config(&config.watch);
    let report = job
        .run()
        .with_context(|| format!("failed to write {}", job.artifact.display()))?;

    if report.root_failed {
        log!("warning"; "{} is unreadable, wrote an empty bundle", job.source.display());
    }
    match report.outcome {
        WriteOutcome::Written => log!("bundle"; "{} -> {}", report.summary(), job.artifact.display()),
        WriteOutcome::Unchanged => log!("bundle"; "{} is up to date", job.artifact.display()),
    }
    Ok(())
}

/// `appshell restore`: re-create the bundle's files under `target`.
///
/// Relative paths are resolved against the project root. Defaults are the
/// configured artifact and source directory.
pub fn restore(config: &AppConfig, bundle: Option<&Path>, target: Option<&Path>) -> Result<()> {
    let bundle = bundle
        .map(|p| config.root_path(p))
        .unwrap_or_else(|| config.watch.bundle.clone());
    let target = target
        .map(|p| config.root_path(p))
        .unwrap_or_else(|| config.watch.source.clone());

    let report = restore_bundle(&bundle, &target)
        .with_context(|| format!("failed to restore {}", bundle.display()))?;

    log!(
        "restore";
        "{} into {} ({} overwritten)",
        plural_count(report.written, "file"),
        target.display(),
        report.overwritten
    );
    Ok(())
}
