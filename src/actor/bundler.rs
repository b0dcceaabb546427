//! Bundler Actor - regenerates the artifact after each quiet window.
//!
//! Flushes are processed one at a time: the next `Rebuild` is not read
//! before the previous write finished, so at most one write is in flight.

use std::sync::Arc;

use tokio::sync::mpsc;

use super::fs::WatchEvent;
use super::messages::BundleMsg;
use crate::bundle::{BuildReport, BundleError, BundleJob, WriteOutcome};
use crate::logger::WatchStatus;
use crate::panel::ControlPanel;

pub struct BundlerActor {
    rx: mpsc::Receiver<BundleMsg>,
    job: Arc<BundleJob>,
    panel: ControlPanel,
    status: WatchStatus,
}

impl BundlerActor {
    pub fn new(rx: mpsc::Receiver<BundleMsg>, job: Arc<BundleJob>, panel: ControlPanel) -> Self {
        Self {
            rx,
            job,
            panel,
            status: WatchStatus::new(),
        }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        while let Some(msg) = self.rx.recv().await {
            match msg {
                BundleMsg::Rebuild { events } => {
                    self.rebuild(&events).await;
                }
                BundleMsg::ConfigChanged { events } => {
                    if !self.rebuild(&events).await {
                        self.reload().await;
                    }
                }
                BundleMsg::Shutdown => {
                    crate::debug!("bundle"; "shutting down");
                    break;
                }
            }
        }
    }

    /// Regenerate the artifact. Returns whether the apps were notified.
    async fn rebuild(&mut self, events: &[WatchEvent]) -> bool {
        crate::debug!("bundle"; "rebuild after {} events", events.len());

        match run_job(Arc::clone(&self.job)).await {
            Ok(report) => {
                self.report(&report);
                if report.outcome != WriteOutcome::Written {
                    return false;
                }
                match self.panel.send_file_update_notification().await {
                    Ok(sent) => sent,
                    Err(e) => {
                        crate::log!("bridge"; "failed to notify apps: {}", e);
                        false
                    }
                }
            }
            Err(e) => {
                self.status.error("bundle failed", &e.to_string());
                false
            }
        }
    }

    async fn reload(&self) {
        if let Err(e) = self.panel.trigger_reload().await {
            crate::log!("bridge"; "failed to reload apps: {}", e);
        }
    }

    fn report(&mut self, report: &BuildReport) {
        if report.root_failed {
            self.status.warning(&format!(
                "{} is unreadable, wrote an empty bundle",
                self.job.source().display()
            ));
            return;
        }
        match report.outcome {
            WriteOutcome::Written => self.status.success(&report.summary()),
            WriteOutcome::Unchanged => self.status.unchanged("bundle unchanged"),
        }
    }
}

/// Run a job on the blocking pool (snapshot reads fan out on rayon).
pub async fn run_job(job: Arc<BundleJob>) -> Result<BuildReport, BundleError> {
    match tokio::task::spawn_blocking(move || job.run()).await {
        Ok(result) => result,
        Err(e) => Err(BundleError::io(
            "<bundle task>",
            std::io::Error::other(e.to_string()),
        )),
    }
}
