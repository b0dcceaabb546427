//! Watch-mode state.
//!
//! Two orthogonal flags:
//! - `SERVING`: the bridge endpoint is up and receives flush notifications
//! - `SHUTDOWN`: Ctrl+C was received

use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

/// Bridge endpoint is accepting clients
static SERVING: AtomicBool = AtomicBool::new(false);

/// Shutdown has been requested (Ctrl+C received)
static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// Shutdown signal sender for the actor system
static SHUTDOWN_TX: OnceLock<crossbeam::channel::Sender<()>> = OnceLock::new();

// =============================================================================
// SERVING state
// =============================================================================

pub fn is_serving() -> bool {
    SERVING.load(Ordering::SeqCst)
}

pub fn set_serving(serving: bool) {
    SERVING.store(serving, Ordering::SeqCst);
}

// =============================================================================
// SHUTDOWN state
// =============================================================================

/// Setup the global Ctrl+C handler. Call once at program start.
///
/// - Before `register_shutdown()`: exit immediately (one-shot commands)
/// - After `register_shutdown()`: notify the actor system, which abandons
///   any pending flush and returns
pub fn setup_shutdown_handler() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        if !request_shutdown() {
            std::process::exit(130);
        }
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {}", e))
}

/// Register the channel the actor system listens on for shutdown.
pub fn register_shutdown(shutdown_tx: crossbeam::channel::Sender<()>) {
    let _ = SHUTDOWN_TX.set(shutdown_tx);
}

/// Mark shutdown and notify the actor system.
///
/// Returns `false` when nothing was registered to receive the signal.
pub fn request_shutdown() -> bool {
    SHUTDOWN.store(true, Ordering::SeqCst);
    match SHUTDOWN_TX.get() {
        Some(tx) => {
            crate::log!("watch"; "shutting down...");
            let _ = tx.send(());
            true
        }
        None => false,
    }
}

/// Check if shutdown has been requested
pub fn is_shutdown() -> bool {
    SHUTDOWN.load(Ordering::Relaxed)
}
