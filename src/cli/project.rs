//! Project record and preview commands.

use anyhow::{Result, bail};

use crate::config::{AppConfig, ProjectConfig};
use crate::log;
use crate::panel::{ControlPanel, DryRunClient};

/// `appshell init`: create the project record once and print its id.
pub fn init(config: &AppConfig) -> Result<()> {
    let (project, created) = ProjectConfig::load_or_create(config.get_root())?;
    if created {
        log!("project"; "created {}", ProjectConfig::path(config.get_root()).display());
    }
    println!("{}", project.project_id);
    Ok(())
}

/// `appshell url`: print the preview URL and, given a remote id, the
/// shareable one.
pub fn url(config: &AppConfig, remote: Option<&str>) -> Result<()> {
    let panel = ControlPanel::new(config);
    println!("{}", panel.preview_url()?);
    if let Some(remote) = remote {
        println!("{}", panel.share_url(remote)?);
    }
    Ok(())
}

/// `appshell publish`: build the publish request from the latest bundle.
///
/// Only `--dry-run` is available from the command line; a real backend is
/// plugged in through [`crate::panel::PublishClient`].
pub fn publish(config: &AppConfig, name: &str, description: &str, dry_run: bool) -> Result<()> {
    if !dry_run {
        bail!("no publishing client is configured, re-run with --dry-run to inspect the request");
    }

    let (project, created) = ProjectConfig::load_or_create(config.get_root())?;
    if created {
        log!("project"; "created project {}", project.project_id);
    }

    let panel = ControlPanel::new(config);
    let published = panel.publish(&mut DryRunClient::stdout(), &project, name, description)?;
    log!("publish"; "share at {}", published.share_url);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let config = AppConfig {
            root: temp.path().to_path_buf(),
            ..AppConfig::default()
        };

        init(&config).unwrap();
        let first = ProjectConfig::load(temp.path()).unwrap().unwrap();
        init(&config).unwrap();
        let second = ProjectConfig::load(temp.path()).unwrap().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_publish_without_dry_run_fails() {
        let temp = TempDir::new().unwrap();
        let config = AppConfig {
            root: temp.path().to_path_buf(),
            ..AppConfig::default()
        };
        assert!(publish(&config, "Todo", "", false).is_err());
        assert!(ProjectConfig::load(temp.path()).unwrap().is_none());
    }
}
