//! Actor Message Definitions
//!
//! ```text
//! FsActor --Rebuild--> BundlerActor --FileUpdate--> WsActor
//! FsActor --ConfigChanged--> BundlerActor --Reload--> WsActor
//! ```

use std::net::TcpStream;

use super::fs::WatchEvent;

// =============================================================================
// BundlerActor Messages
// =============================================================================

/// Messages to the Bundler Actor
#[derive(Debug)]
pub enum BundleMsg {
    /// Regenerate the artifact after a quiet window.
    Rebuild { events: Vec<WatchEvent> },
    /// The config file changed: rebuild, then reload every app.
    ConfigChanged { events: Vec<WatchEvent> },
    Shutdown,
}

// =============================================================================
// WsActor Messages
// =============================================================================

/// Messages to the Bridge Actor
#[derive(Debug)]
pub enum WsMsg {
    /// Artifact changed: push `BAIBIAN_APP_FILE_UPDATE` and reload every app.
    FileUpdate,
    /// Reload every app without a file update push.
    Reload,
    /// Raw connection from the accept thread (handshake pending).
    AddClient(TcpStream),
    Shutdown,
}
