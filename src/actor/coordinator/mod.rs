//! Actor Coordinator - wires up the watch pipeline
//!
//! The Coordinator is a thin orchestrator that:
//! - Attaches the watcher before the initial bundle (Watcher-First)
//! - Writes the initial bundle
//! - Starts the bridge endpoint when serving
//! - Runs the actors until Ctrl+C

mod runtime;

use std::sync::Arc;

use anyhow::Result;
use crossbeam::channel::Receiver;
use tokio::sync::mpsc;

use super::bundler::{BundlerActor, run_job};
use super::fs::FsActor;
use super::messages::{BundleMsg, WsMsg};
use super::ws::{WsActor, start_bridge_server};
use crate::bundle::BundleJob;
use crate::config::AppConfig;
use crate::logger::{status_success, status_warning};
use crate::panel::ControlPanel;

const CHANNEL_BUFFER: usize = 32;

/// Coordinator - wires up and runs the actor system.
pub struct Coordinator {
    config: Arc<AppConfig>,
    job: Arc<BundleJob>,
    serve: bool,
    shutdown_rx: Option<Receiver<()>>,
}

impl Coordinator {
    pub fn with_config(config: Arc<AppConfig>) -> Self {
        let job = Arc::new(BundleJob::from_config(&config.watch));
        Self {
            config,
            job,
            serve: false,
            shutdown_rx: None,
        }
    }

    /// Start the bridge endpoint on `bridge.port`.
    pub fn with_bridge(mut self, serve: bool) -> Self {
        self.serve = serve;
        self
    }

    /// Set shutdown signal receiver.
    pub fn with_shutdown_signal(mut self, rx: Receiver<()>) -> Self {
        self.shutdown_rx = Some(rx);
        self
    }

    /// Run the actor system.
    pub async fn run(mut self) -> Result<()> {
        let (bundle_tx, bundle_rx) = mpsc::channel::<BundleMsg>(CHANNEL_BUFFER);
        let (ws_tx, ws_rx) = mpsc::channel::<WsMsg>(CHANNEL_BUFFER);

        let fs_actor = FsActor::new(
            &self.config.watch,
            &self.job,
            Some(self.config.config_path.as_path()),
            bundle_tx.clone(),
        )
            .map_err(|e| anyhow::anyhow!("watcher failed: {}", e))?;

        let mut panel = ControlPanel::new(&self.config);
        let ws_actor = if self.serve {
            let port = start_bridge_server(self.config.bridge.port, ws_tx.clone())?;
            crate::log!("bridge"; "listening on ws://127.0.0.1:{}", port);
            panel = panel.with_bridge(ws_tx.clone());
            Some(WsActor::new(
                ws_rx,
                self.config.bridge.clone(),
                self.config.watch.bundle.clone(),
            ))
        } else {
            None
        };

        self.initial_bundle().await?;

        let bundler = BundlerActor::new(bundle_rx, Arc::clone(&self.job), panel);

        crate::debug!("actor"; "start");
        let shutdown_rx = self.shutdown_rx.take();
        runtime::run_actors(fs_actor, bundler, ws_actor, bundle_tx, ws_tx, shutdown_rx).await;

        crate::core::set_serving(false);
        crate::debug!("actor"; "stopped");
        Ok(())
    }

    async fn initial_bundle(&self) -> Result<()> {
        let report = run_job(Arc::clone(&self.job)).await?;
        if report.root_failed {
            status_warning(&format!(
                "{} is unreadable, wrote an empty bundle",
                self.job.source().display()
            ));
        } else {
            status_success(&report.summary());
        }
        Ok(())
    }
}
