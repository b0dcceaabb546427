//! FileSystem Actor
//!
//! Watches the source root and asks the BundlerActor to regenerate the
//! artifact once changes went quiet. Implements the "Watcher-First" pattern:
//! the watcher is attached before the initial bundle is written, so no
//! change made during start-up is lost.
//!
//! ```text
//! notify → EventFilter → Debouncer (quiet window) → StabilityGate → BundleMsg
//! ```
//!
//! The config file is watched too. Editing it rebuilds and reloads every
//! embedded app; new settings apply on the next start.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::event::ModifyKind;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use super::messages::BundleMsg;
use crate::bundle::BundleJob;
use crate::config::WatchConfig;
use crate::utils::path::normalize_path;

// Pure timing and deduplication.
mod debouncer;
// Relevance rules (hidden, ignored, artifact).
mod filter;
// File-size settling before a flush.
mod stability;
// Shared fs event types.
mod types;
// Watch root attach/re-attach lifecycle.
mod watch_roots;


pub use types::WatchEvent;

use debouncer::Debouncer;
use filter::EventFilter;
use stability::StabilityGate;
use watch_roots::WatchRoot;

/// Poll interval for a root that is not attached
const REATTACH_POLL: Duration = Duration::from_secs(1);

/// FileSystem Actor - watches the source root for changes
pub struct FsActor {
    /// Channel to receive notify events (sync -> async bridge)
    notify_rx: std::sync::mpsc::Receiver<notify::Result<notify::Event>>,
    /// Watcher handle (dropping it closes the subscription)
    watcher: RecommendedWatcher,
    root: WatchRoot,
    pipeline: ChangePipeline,
    bundler_tx: mpsc::Sender<BundleMsg>,
}

impl FsActor {
    /// Create the watcher and attach it immediately.
    ///
    /// Events buffer in the notify channel while the caller writes the
    /// initial bundle. `config_file` is watched when it exists.
    pub fn new(
        config: &WatchConfig,
        job: &BundleJob,
        config_file: Option<&Path>,
        bundler_tx: mpsc::Sender<BundleMsg>,
    ) -> notify::Result<Self> {
        let (notify_tx, notify_rx) = std::sync::mpsc::channel();

        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = notify_tx.send(res);
        })?;

        let mut root = WatchRoot::new(job.source().to_path_buf());
        root.attach(&mut watcher)?;

        let mut pipeline = ChangePipeline::new(config, job);
        if let Some(file) = config_file.filter(|f| f.is_file()) {
            let file = normalize_path(file);
            if !file.starts_with(normalize_path(job.source())) {
                watcher.watch(&file, RecursiveMode::NonRecursive)?;
            }
            pipeline = pipeline.with_config_file(file);
        }

        Ok(Self {
            notify_rx,
            watcher,
            pipeline,
            root,
            bundler_tx,
        })
    }

    /// Run the actor event loop until shutdown or the bundler goes away.
    pub async fn run(self) {
        let notify_rx = self.notify_rx;
        let bundler_tx = self.bundler_tx;
        let mut pipeline = self.pipeline;
        let mut watcher = self.watcher;
        let mut root = self.root;

        let (async_tx, mut async_rx) = mpsc::channel::<notify::Event>(64);

        // Forward notify events from its callback thread into tokio
        std::thread::spawn(move || {
            while let Ok(result) = notify_rx.recv() {
                match result {
                    Ok(event) => {
                        if async_tx.blocking_send(event).is_err() {
                            break; // Receiver dropped
                        }
                    }
                    Err(e) => crate::log!("watch"; "notify error: {}", e),
                }
            }
        });

        loop {
            let sleep = if root.is_attached() {
                pipeline.sleep_duration()
            } else {
                pipeline.sleep_duration().min(REATTACH_POLL)
            };

            tokio::select! {
                biased;
                Some(event) = async_rx.recv() => pipeline.accept(event),
                _ = tokio::time::sleep(sleep) => {
                    if crate::core::is_shutdown() {
                        pipeline.abandon();
                        break;
                    }
                    if root.maintain(&mut watcher) {
                        pipeline.touch(root.path());
                    }
                    let Some(events) = pipeline.poll() else {
                        continue;
                    };
                    let msg = if pipeline.take_config_change() {
                        crate::log!("watch"; "config changed, restart to apply new settings");
                        BundleMsg::ConfigChanged { events }
                    } else {
                        log_events(&events);
                        BundleMsg::Rebuild { events }
                    };
                    if bundler_tx.send(msg).await.is_err() {
                        break;
                    }
                }
            }
        }

        crate::debug!("watch"; "watcher stopped");
    }
}

/// Event handling between notify and the bundler, free of I/O channels.
struct ChangePipeline {
    filter: EventFilter,
    debouncer: Debouncer,
    stability: StabilityGate,
    /// Normalized config file path
    config_file: Option<PathBuf>,
    config_changed: bool,
}

impl ChangePipeline {
    fn new(config: &WatchConfig, job: &BundleJob) -> Self {
        Self {
            filter: EventFilter::new(job.source(), job.options().clone()),
            debouncer: Debouncer::new(config.debounce()),
            stability: StabilityGate::new(config.stability()),
            config_file: None,
            config_changed: false,
        }
    }

    fn with_config_file(mut self, path: PathBuf) -> Self {
        self.config_file = Some(path);
        self
    }

    fn accept(&mut self, mut event: notify::Event) {
        self.note_config_change(&event);

        event.paths.retain(|path| self.filter.accepts(path));
        if event.paths.is_empty() {
            return;
        }

        // Stability is tracked under the same keys the debouncer reports.
        if !event.kind.is_remove() {
            for path in &event.paths {
                self.stability.observe(&normalize_path(path));
            }
        }
        self.debouncer.add_event(&event);
    }

    fn note_config_change(&mut self, event: &notify::Event) {
        let Some(config) = &self.config_file else {
            return;
        };
        if matches!(
            event.kind,
            EventKind::Access(_) | EventKind::Modify(ModifyKind::Metadata(_))
        ) {
            return;
        }
        if event.paths.iter().any(|p| normalize_path(p) == *config) {
            self.config_changed = true;
            self.debouncer.touch(config);
        }
    }

    /// Whether the config file changed since the last call.
    fn take_config_change(&mut self) -> bool {
        std::mem::take(&mut self.config_changed)
    }

    /// Register a change not reported by notify.
    fn touch(&mut self, path: &Path) {
        self.debouncer.touch(path);
    }

    /// Coalesced events once the window elapsed and every file settled.
    fn poll(&mut self) -> Option<Vec<WatchEvent>> {
        if !self.debouncer.is_ready() {
            return None;
        }

        if let Some(wait) = self.stability.check(self.debouncer.pending_writes()) {
            self.debouncer.hold(wait);
            return None;
        }

        let changes = self.debouncer.take_if_ready()?;
        self.stability.reset();
        Some(self.filter.to_events(changes))
    }

    fn sleep_duration(&self) -> Duration {
        self.debouncer.sleep_duration()
    }

    fn abandon(&mut self) {
        let dropped = self.debouncer.clear();
        if dropped > 0 {
            crate::debug!("watch"; "abandoned {} pending changes", dropped);
        }
    }
}

fn log_events(events: &[WatchEvent]) {
    for event in events {
        crate::debug!("watch"; "{}", event);
    }
    match events {
        [] => crate::debug!("watch"; "source tree changed"),
        [event] => crate::log!("watch"; "{}", event),
        _ => crate::log!("watch"; "{}", crate::utils::plural_count(events.len(), "change")),
    }
}
