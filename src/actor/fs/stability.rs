//! Write-stability gate.
//!
//! Editors and bundlers often write a file in several chunks. A changed file
//! is settled once its size has stayed the same for the stability window;
//! until then the flush is postponed.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use rustc_hash::FxHashMap;

pub(super) struct StabilityGate {
    window: Duration,
    /// Last observed size and when it was first seen.
    observed: FxHashMap<PathBuf, (u64, Instant)>,
}

impl StabilityGate {
    pub(super) fn new(window: Duration) -> Self {
        Self {
            window,
            observed: FxHashMap::default(),
        }
    }

    /// Record the current size of a changed path.
    pub(super) fn observe(&mut self, path: &Path) {
        if !self.window.is_zero() {
            self.record(path, Instant::now());
        }
    }

    /// Check the pending paths.
    ///
    /// Returns `None` when all of them settled, otherwise how long to wait
    /// before asking again. A path that vanished counts as settled.
    pub(super) fn check<'a>(&mut self, paths: impl IntoIterator<Item = &'a Path>) -> Option<Duration> {
        if self.window.is_zero() {
            return None;
        }

        let now = Instant::now();
        let mut wait: Option<Duration> = None;

        for path in paths {
            let Some(since) = self.record(path, now) else {
                continue;
            };

            let remaining = self.window.saturating_sub(now.duration_since(since));
            if !remaining.is_zero() {
                crate::debug!("watch"; "still writing: {}", path.display());
                wait = Some(wait.map_or(remaining, |w| w.max(remaining)));
            }
        }

        wait
    }

    /// Update the observation for `path`; returns since when its size held.
    fn record(&mut self, path: &Path, now: Instant) -> Option<Instant> {
        let Some(size) = fs::metadata(path).ok().map(|m| m.len()) else {
            self.observed.remove(path);
            return None;
        };

        match self.observed.get(path) {
            Some(&(previous, since)) if previous == size => Some(since),
            _ => {
                self.observed.insert(path.to_path_buf(), (size, now));
                Some(now)
            }
        }
    }

    /// Forget observations after a flush.
    pub(super) fn reset(&mut self) {
        self.observed.clear();
    }
}
