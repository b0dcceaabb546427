use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use notify::event::{ModifyKind, RenameMode};
use rustc_hash::FxHashMap;

use super::types::{ChangeKind, RawChanges};
use crate::utils::path::normalize_path;

/// Sleep used while nothing is pending
const IDLE_SLEEP: Duration = Duration::from_secs(86400);

/// Pure debouncer: only handles timing and event deduplication.
/// No filesystem access, no global state.
pub(super) struct Debouncer {
    /// Quiet window; every accepted event restarts it
    window: Duration,
    /// Path → ChangeKind (dedup is free via HashMap key uniqueness)
    pub(super) changes: FxHashMap<PathBuf, ChangeKind>,
    pub(super) last_event: Option<Instant>,
    /// Flush postponed until this instant (files still being written)
    pub(super) held_until: Option<Instant>,
}

impl Debouncer {
    pub(super) fn new(window: Duration) -> Self {
        Self {
            window,
            changes: FxHashMap::default(),
            last_event: None,
            held_until: None,
        }
    }

    /// Add a notify event, applying dedup rules:
    /// - Remove + Add/Modify → Add/Modify (file was restored)
    /// - Modify + Remove → Remove (file was deleted)
    /// - Add + Remove → dropped (never existed as far as readers know)
    /// - otherwise: first event wins
    pub(super) fn add_event(&mut self, event: &notify::Event) {
        use notify::EventKind;

        let kind = match event.kind {
            EventKind::Create(_) => ChangeKind::Added,
            EventKind::Remove(_) => ChangeKind::Removed,
            EventKind::Modify(ModifyKind::Metadata(_)) => return,
            EventKind::Modify(ModifyKind::Name(RenameMode::From)) => ChangeKind::Removed,
            EventKind::Modify(ModifyKind::Name(RenameMode::To)) => ChangeKind::Added,
            EventKind::Modify(_) => ChangeKind::Modified,
            _ => return,
        };

        crate::debug!("watch"; "raw notify: {:?} {:?}", event.kind, event.paths);

        for path in &event.paths {
            if is_temp_file(path) {
                continue;
            }
            self.record(normalize_path(path), kind);
        }
    }

    /// Record a modification that notify did not report.
    pub(super) fn touch(&mut self, path: &Path) {
        self.record(normalize_path(path), ChangeKind::Modified);
    }

    fn record(&mut self, path: PathBuf, kind: ChangeKind) {
        if let Some(&existing) = self.changes.get(&path) {
            match (existing, kind) {
                (ChangeKind::Removed, ChangeKind::Added | ChangeKind::Modified) => {
                    crate::debug!("watch"; "restore {}->{}: {}", existing.label(), kind.label(), path.display());
                    self.changes.insert(path, kind);
                }
                (ChangeKind::Modified, ChangeKind::Removed) => {
                    crate::debug!("watch"; "upgrade modified->removed: {}", path.display());
                    self.changes.insert(path, ChangeKind::Removed);
                }
                (ChangeKind::Added, ChangeKind::Removed) => {
                    crate::debug!("watch"; "discard added+removed: {}", path.display());
                    self.changes.remove(&path);
                }
                _ => {}
            }
        } else {
            crate::debug!("watch"; "event {}: {}", kind.label(), path.display());
            self.changes.insert(path, kind);
        }

        // Every event restarts the window, even one that coalesced away.
        self.last_event = Some(Instant::now());
    }

    /// Paths whose content will be read by the next flush.
    pub(super) fn pending_writes(&self) -> impl Iterator<Item = &Path> {
        self.changes
            .iter()
            .filter(|(_, kind)| **kind != ChangeKind::Removed)
            .map(|(path, _)| path.as_path())
    }

    /// Postpone the flush by `delay`.
    pub(super) fn hold(&mut self, delay: Duration) {
        self.held_until = Some(Instant::now() + delay);
    }

    /// Take the coalesced changes if the window elapsed, sorted by path.
    pub(super) fn take_if_ready(&mut self) -> Option<RawChanges> {
        if !self.is_ready() {
            return None;
        }

        let mut changes: RawChanges = std::mem::take(&mut self.changes).into_iter().collect();
        self.last_event = None;
        self.held_until = None;

        changes.sort_by(|a, b| a.0.cmp(&b.0));
        Some(changes)
    }

    /// Drop everything pending (shutdown abandons the flush).
    pub(super) fn clear(&mut self) -> usize {
        let dropped = self.changes.len();
        self.changes.clear();
        self.last_event = None;
        self.held_until = None;
        dropped
    }

    /// Window elapsed since the last event and no hold is active.
    ///
    /// Ready even when every change coalesced away: a path that appeared
    /// and vanished may still have left a directory behind.
    pub(super) fn is_ready(&self) -> bool {
        let Some(last_event) = self.last_event else {
            return false;
        };

        if last_event.elapsed() < self.window {
            return false;
        }

        self.held_until.is_none_or(|until| Instant::now() >= until)
    }

    /// Precise sleep duration until next possible ready time.
    pub(super) fn sleep_duration(&self) -> Duration {
        let Some(last_event) = self.last_event else {
            return IDLE_SLEEP;
        };

        let debounce_remaining = self.window.saturating_sub(last_event.elapsed());
        let hold_remaining = self
            .held_until
            .map(|until| until.saturating_duration_since(Instant::now()))
            .unwrap_or(Duration::ZERO);

        debounce_remaining
            .max(hold_remaining)
            .max(Duration::from_millis(1))
    }
}

/// Check if path is a temp/backup file (editor artifacts).
pub(super) fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "tmp")
        || name.ends_with('~')
        || name.starts_with('.')
        || name == "4913"
}
