use std::time::Duration;

use crossbeam::channel::Receiver;
use tokio::sync::mpsc;

use crate::actor::bundler::BundlerActor;
use crate::actor::fs::FsActor;
use crate::actor::messages::{BundleMsg, WsMsg};
use crate::actor::ws::WsActor;

/// Run all actors concurrently until shutdown or until one of them stops.
pub(super) async fn run_actors(
    fs: FsActor,
    bundler: BundlerActor,
    ws: Option<WsActor>,
    bundle_tx: mpsc::Sender<BundleMsg>,
    ws_tx: mpsc::Sender<WsMsg>,
    shutdown_rx: Option<Receiver<()>>,
) {
    let fs_handle = tokio::spawn(fs.run());
    let bundler_handle = tokio::spawn(bundler.run());
    let ws_handle = ws.map(|ws| tokio::spawn(ws.run()));

    loop {
        if shutdown_rx.as_ref().is_some_and(|rx| rx.try_recv().is_ok()) {
            crate::debug!("actor"; "shutdown signal received");
            break;
        }
        if fs_handle.is_finished() || bundler_handle.is_finished() {
            crate::debug!("actor"; "actor stopped, shutting down");
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    // Closing the subscription abandons any pending flush.
    fs_handle.abort();

    let _ = bundle_tx.send(BundleMsg::Shutdown).await;
    let _ = tokio::time::timeout(Duration::from_millis(500), bundler_handle).await;

    if let Some(handle) = ws_handle {
        let _ = ws_tx.send(WsMsg::Shutdown).await;
        let _ = tokio::time::timeout(Duration::from_millis(500), handle).await;
    }
}
