use std::net::TcpStream;

use tungstenite::WebSocket;
use tungstenite::protocol::Message;

use super::WsActor;
use crate::bridge::{BridgeError, BridgeMessage, MessageSink, normalize_origin};

/// `postMessage` over one connection.
///
/// A message whose target origin differs from the peer's origin is dropped,
/// as a browser drops a `postMessage` to a window at another origin.
pub(super) struct WsSink<'a> {
    ws: &'a mut WebSocket<TcpStream>,
    peer_origin: Option<String>,
}

impl<'a> WsSink<'a> {
    pub(super) fn new(ws: &'a mut WebSocket<TcpStream>, peer_origin: &str) -> Self {
        Self {
            ws,
            peer_origin: normalize_origin(peer_origin),
        }
    }
}

impl MessageSink for WsSink<'_> {
    fn post(&mut self, message: &BridgeMessage, target_origin: &str) -> Result<(), BridgeError> {
        if self.peer_origin.as_deref() != Some(target_origin) {
            crate::debug!("bridge"; "not delivering {} to {:?}", message.kind(), self.peer_origin);
            return Ok(());
        }

        let json = message.to_json()?;
        self.ws
            .send(Message::Text(json.into()))
            .map_err(|e| BridgeError::Send(e.to_string()))
    }
}

impl WsActor {
    /// Push `BAIBIAN_APP_FILE_UPDATE` to every app, then reload its bridge.
    pub(super) fn push_file_update(&self) {
        let mut clients = self.clients.lock();
        if clients.is_empty() {
            crate::debug!("bridge"; "no apps connected");
            return;
        }

        let count = clients.len();
        clients.retain_mut(|client| {
            let mut sink = WsSink::new(&mut client.ws, &client.origin);
            if let Err(e) = client.bridge.notify_file_update(&mut sink) {
                crate::debug!("bridge"; "app disconnected: {}", e);
                return false;
            }
            if let Err(e) = client.bridge.reload() {
                client.bridge.fail_load(&e.to_string());
            }
            true
        });
        crate::debug!("bridge"; "file update pushed to {} apps", count);
    }

    /// Re-enter `Loading` on every bridge with a fresh URL.
    pub(super) fn reload_all(&self) {
        let mut clients = self.clients.lock();
        for client in clients.iter_mut() {
            match client.bridge.reload() {
                Ok(url) => crate::log!("bridge"; "reload {}", url),
                Err(e) => client.bridge.fail_load(&e.to_string()),
            }
        }
    }
}
