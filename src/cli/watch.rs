//! `appshell watch`: initial bundle, then regenerate on change until Ctrl+C.

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::actor::Coordinator;
use crate::config::AppConfig;
use crate::core::register_shutdown;
use crate::log;
use crate::panel::ControlPanel;

pub fn watch(config: AppConfig, serve: bool) -> Result<()> {
    let (shutdown_tx, shutdown_rx) = crossbeam::channel::bounded(1);
    register_shutdown(shutdown_tx);

    log!(
        "watch";
        "{} -> {}",
        config.watch.source.display(),
        config.watch.bundle.display()
    );
    if serve {
        let url = ControlPanel::new(&config).preview_url()?;
        log!("bridge"; "preview at {}", url);
    }

    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    let coordinator = Coordinator::with_config(Arc::new(config))
        .with_bridge(serve)
        .with_shutdown_signal(shutdown_rx);
    rt.block_on(coordinator.run())
}
