use std::io::ErrorKind;
use std::net::TcpStream;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tungstenite::protocol::Message;

use super::delivery::WsSink;
use super::{ClientHost, RegisteredClient, WsActor};
use crate::bridge::{Dispatch, IframeBridge};

/// Poll interval of the reader thread
const READ_POLL: Duration = Duration::from_millis(100);

/// Longest a peer may take to send its handshake request
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(2);

impl WsActor {
    /// Complete the handshake and register the connection.
    pub(super) fn add_client(&self, stream: TcpStream) {
        let peer = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown peer".into());

        let mut origin = None;
        let capture_origin = |request: &Request, response: Response| {
            origin = request
                .headers()
                .get("origin")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            Ok::<_, ErrorResponse>(response)
        };

        // Keep blocking mode during handshake, switch to non-blocking after.
        // A silent peer must not stall the actor.
        if let Err(e) = stream.set_read_timeout(Some(HANDSHAKE_TIMEOUT)) {
            crate::log!("bridge"; "cannot set handshake timeout: {}", e);
            return;
        }
        let ws = match tungstenite::accept_hdr(stream, capture_origin) {
            Ok(ws) => ws,
            Err(e) => {
                crate::log!("bridge"; "handshake failed: {}", e);
                return;
            }
        };
        let _ = ws.get_ref().set_read_timeout(None);
        let _ = ws.get_ref().set_nonblocking(true);
        let origin = origin.unwrap_or_else(|| "null".into());

        let mut bridge = match IframeBridge::new(&self.config, ClientHost { peer }) {
            Ok(bridge) => bridge,
            Err(e) => {
                crate::log!("bridge"; "cannot create bridge: {}", e);
                return;
            }
        };
        match bridge.load() {
            Ok(url) => crate::debug!("bridge"; "loading {}", url),
            Err(e) => bridge.fail_load(&e.to_string()),
        }

        let mut clients = self.clients.lock();
        crate::debug!("bridge"; "app connected from {} (total: {})", origin, clients.len() + 1);
        clients.push(RegisteredClient { ws, origin, bridge });
    }

    /// Background thread to read app messages (non-blocking poll)
    pub(super) fn client_reader_loop(clients: Arc<Mutex<Vec<RegisteredClient>>>, artifact: PathBuf) {
        loop {
            std::thread::sleep(READ_POLL);
            if crate::core::is_shutdown() {
                break;
            }

            let mut clients = clients.lock();
            clients.retain_mut(|client| {
                let alive = Self::drain_client(client, &artifact);
                if !alive {
                    crate::debug!("bridge"; "app disconnected ({})", client.origin);
                }
                alive
            });
        }
    }

    /// Dispatch every message that is ready. Returns `false` once closed.
    fn drain_client(client: &mut RegisteredClient, artifact: &Path) -> bool {
        let files = artifact.to_path_buf();
        loop {
            match client.ws.read() {
                Ok(Message::Text(text)) => {
                    let RegisteredClient { ws, origin, bridge } = client;
                    let mut sink = WsSink::new(ws, origin);
                    let dispatch = bridge.handle(origin, text.as_str(), &mut sink, &files);
                    match dispatch {
                        Dispatch::Unexpected(kind) => {
                            crate::debug!("bridge"; "app sent host-bound {}", kind);
                        }
                        Dispatch::Ready | Dispatch::Error(_) => {
                            crate::debug!("bridge"; "{} is {:?}", origin, bridge.status());
                        }
                        _ => {}
                    }
                }
                Ok(Message::Close(_)) => return false,
                Ok(_) => {}
                Err(tungstenite::Error::Io(ref e)) if e.kind() == ErrorKind::WouldBlock => {
                    return true;
                }
                Err(_) => return false,
            }
        }
    }
}
