//! WebSocket Actor - iframe bridge transport
//!
//! Each connection stands in for one embedded app. The handshake `Origin`
//! header is the origin of every message on that connection, and each
//! connection owns its own [`IframeBridge`].
//!
//! # Architecture
//!
//! ```text
//! BundlerActor --[FileUpdate]--> WsActor --[BAIBIAN_APP_FILE_UPDATE]--> apps
//!                                   ^                                     |
//!                                   +---[READY / ERROR / GET_APP_FILES]---+
//! ```

mod client_io;
mod delivery;
mod server;

#[cfg(test)]
mod tests;

use std::net::TcpStream;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tungstenite::WebSocket;

use super::messages::WsMsg;
use crate::bridge::{BridgeHost, IframeBridge};
use crate::config::BridgeConfig;

pub use server::start_bridge_server;

/// A registered app connection
struct RegisteredClient {
    ws: WebSocket<TcpStream>,
    /// Origin from the handshake (`null` when absent)
    origin: String,
    bridge: IframeBridge<ClientHost>,
}

/// Bridge callbacks for one connection, reported through the logger.
struct ClientHost {
    peer: String,
}

impl BridgeHost for ClientHost {
    fn on_ready(&mut self, app_id: Option<&str>) {
        crate::log!("bridge"; "{} ready ({})", app_id.unwrap_or("app"), self.peer);
    }

    fn on_error(&mut self, error: &str) {
        crate::logger::status_error(&format!("app error ({})", self.peer), error);
    }

    fn on_toast(&mut self, message: &str) {
        crate::log!("bridge"; "{}", message);
    }
}

/// WebSocket Actor - manages app connections and pushes updates
pub struct WsActor {
    rx: mpsc::Receiver<WsMsg>,
    /// Connected apps (shared for push + read threads)
    clients: Arc<Mutex<Vec<RegisteredClient>>>,
    config: BridgeConfig,
    /// Artifact served to `GET_APP_FILES_REQUEST`
    artifact: PathBuf,
}

impl WsActor {
    pub fn new(rx: mpsc::Receiver<WsMsg>, config: BridgeConfig, artifact: PathBuf) -> Self {
        Self {
            rx,
            clients: Arc::new(Mutex::new(Vec::new())),
            config,
            artifact,
        }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        let clients_for_reader = Arc::clone(&self.clients);
        let artifact = self.artifact.clone();
        std::thread::spawn(move || {
            Self::client_reader_loop(clients_for_reader, artifact);
        });

        while let Some(msg) = self.rx.recv().await {
            match msg {
                WsMsg::FileUpdate => self.push_file_update(),
                WsMsg::Reload => self.reload_all(),
                WsMsg::AddClient(stream) => self.add_client(stream),
                WsMsg::Shutdown => {
                    crate::debug!("bridge"; "shutting down");
                    let mut clients = self.clients.lock();
                    for mut client in clients.drain(..) {
                        let _ = client.ws.close(None);
                    }
                    break;
                }
            }
        }
    }
}
