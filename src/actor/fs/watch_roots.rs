use std::path::{Path, PathBuf};

use notify::{RecursiveMode, Watcher};

/// Keeps the source root attached to the watcher.
///
/// A root that is missing at start-up, or deleted and recreated later, is
/// attached as soon as it exists again.
pub(super) struct WatchRoot {
    path: PathBuf,
    attached: bool,
}

impl WatchRoot {
    pub(super) fn new(path: PathBuf) -> Self {
        Self {
            path,
            attached: false,
        }
    }

    pub(super) fn path(&self) -> &Path {
        &self.path
    }

    pub(super) fn is_attached(&self) -> bool {
        self.attached
    }

    pub(super) fn attach<W: Watcher>(&mut self, watcher: &mut W) -> notify::Result<()> {
        if !self.path.exists() {
            crate::log!("watch"; "{} does not exist yet, waiting for it", self.path.display());
            return Ok(());
        }
        watcher.watch(&self.path, RecursiveMode::Recursive)?;
        self.attached = true;
        Ok(())
    }

    /// Drop a stale handle or re-attach a recreated root.
    ///
    /// Returns `true` when the root was re-attached, since files that were
    /// created along with it produced no events.
    pub(super) fn maintain<W: Watcher>(&mut self, watcher: &mut W) -> bool {
        let exists = self.path.is_dir();

        if self.attached && !exists {
            let _ = watcher.unwatch(&self.path);
            self.attached = false;
            crate::debug!("watch"; "watch root vanished: {}", self.path.display());
            return false;
        }

        if !self.attached && exists && watcher.watch(&self.path, RecursiveMode::Recursive).is_ok() {
            self.attached = true;
            crate::debug!("watch"; "re-attached watch: {}", self.path.display());
            return true;
        }

        false
    }
}
