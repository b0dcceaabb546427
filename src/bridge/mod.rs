//! Iframe bridge: the host side of the preview iframe's message channel.
//!
//! # Module Structure
//!
//! ```text
//! bridge/
//! ├── message   # BridgeMessage, Inbound classification
//! ├── origin    # OriginAllowList
//! ├── preview   # preview / share URLs
//! └── mod.rs    # IframeBridge state machine (this file)
//! ```
//!
//! # Lifecycle
//!
//! ```text
//! Idle --load--> Loading --READY--> Ready
//!                   │
//!                   └--ERROR / fail_load--> Errored
//!
//! reload (any state) --> Loading
//! ```
//!
//! The bridge is transport-agnostic: inbound data arrives through
//! [`IframeBridge::handle`] together with its origin, replies leave through
//! a [`MessageSink`]. The WebSocket transport lives in `actor::ws`.

mod error;
pub mod message;
pub mod origin;
pub mod preview;

#[cfg(test)]
mod tests;

use std::path::PathBuf;

use url::Url;

pub use error::BridgeError;
pub use message::{BridgeMessage, Inbound};
pub use origin::{OriginAllowList, normalize_origin};
pub use preview::{preview_url, share_url};

use crate::bundle::{BundleError, FileBundle, read_bundle};
use crate::config::BridgeConfig;
use crate::utils::time::unix_millis;

/// Loading state of the embedded app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeStatus {
    Idle,
    Loading,
    Ready,
    Errored(String),
}

/// Callbacks into the embedding UI. Each dispatched message fires at most
/// one of them, once.
pub trait BridgeHost {
    fn on_ready(&mut self, app_id: Option<&str>);
    fn on_error(&mut self, error: &str);
    /// Transient notification (e.g. "files updated").
    fn on_toast(&mut self, message: &str);
}

/// Outbound channel to one peer.
pub trait MessageSink {
    /// Deliver `message` if the peer's origin is `target_origin`.
    ///
    /// A peer at any other origin must not receive it; that is not an error.
    fn post(&mut self, message: &BridgeMessage, target_origin: &str) -> Result<(), BridgeError>;
}

/// Where `GET_APP_FILES_REQUEST` answers come from.
pub trait BundleSource {
    fn read_files(&self) -> Result<FileBundle, BundleError>;
}

impl BundleSource for PathBuf {
    fn read_files(&self) -> Result<FileBundle, BundleError> {
        read_bundle(self)
    }
}

impl BundleSource for FileBundle {
    fn read_files(&self) -> Result<FileBundle, BundleError> {
        Ok(self.clone())
    }
}

/// Outcome of [`IframeBridge::handle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Origin not in the allow-list. Nothing happened.
    Untrusted,
    /// Not JSON or a known kind with a broken payload.
    Malformed,
    /// SDK chatter or unknown kind.
    Ignored(String),
    Ready,
    Error(String),
    Toast,
    /// File request answered; `error` is set when the bundle read failed.
    FilesServed { error: Option<String> },
    /// A host-bound kind arrived from the app.
    Unexpected(&'static str),
}

/// Host side of one embedded app.
pub struct IframeBridge<H> {
    host: H,
    allow_list: OriginAllowList,
    app_id: String,
    base: String,
    target_origin: String,
    status: BridgeStatus,
}

impl<H: BridgeHost> IframeBridge<H> {
    pub fn new(config: &BridgeConfig, host: H) -> Result<Self, BridgeError> {
        let base = config.base_host().to_string();
        let target_origin = normalize_origin(&base).ok_or_else(|| {
            BridgeError::NotABase(base.clone())
        })?;
        let allow_list = OriginAllowList::new(&config.prod_host, &config.dev_host)
            .with_extra(&config.extra_origins);

        Ok(Self {
            host,
            allow_list,
            app_id: config.app_id.clone(),
            base,
            target_origin,
            status: BridgeStatus::Idle,
        })
    }

    pub fn status(&self) -> &BridgeStatus {
        &self.status
    }

    /// Origin of the iframe document, used as the target of pushes.
    pub fn target_origin(&self) -> &str {
        &self.target_origin
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    #[cfg(test)]
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Start loading the preview. Returns the URL to load.
    pub fn load(&mut self) -> Result<Url, BridgeError> {
        self.enter_loading()
    }

    /// Re-derive the URL with a fresh timestamp and re-enter `Loading`.
    pub fn reload(&mut self) -> Result<Url, BridgeError> {
        crate::debug!("bridge"; "reload {}", self.app_id);
        self.enter_loading()
    }

    /// The iframe itself failed to load.
    pub fn fail_load(&mut self, error: &str) {
        self.apply_error(error.to_string());
    }

    /// Push `BAIBIAN_APP_FILE_UPDATE` to the iframe.
    pub fn notify_file_update(&self, sink: &mut dyn MessageSink) -> Result<(), BridgeError> {
        let message = BridgeMessage::file_update(&self.app_id, unix_millis());
        sink.post(&message, &self.target_origin)
    }

    /// Validate and dispatch one inbound message.
    ///
    /// `reply` is the requester's own channel, `files` answers file
    /// requests.
    pub fn handle(
        &mut self,
        origin: &str,
        data: &str,
        reply: &mut dyn MessageSink,
        files: &dyn BundleSource,
    ) -> Dispatch {
        if !self.allow_list.is_allowed(origin) {
            crate::debug!("bridge"; "dropped message from untrusted origin {}", origin);
            return Dispatch::Untrusted;
        }

        let message = match Inbound::parse(data) {
            Ok(Inbound::Message(message)) => message,
            Ok(Inbound::Ignored(kind) | Inbound::Unknown(kind)) => return Dispatch::Ignored(kind),
            Err(e) => {
                crate::debug!("bridge"; "discarding malformed message: {}", e);
                return Dispatch::Malformed;
            }
        };

        match message {
            ref ready @ BridgeMessage::Ready { .. } => {
                if self.status == BridgeStatus::Loading {
                    self.status = BridgeStatus::Ready;
                }
                self.host.on_ready(ready.ready_app_id().as_deref());
                Dispatch::Ready
            }
            ref error @ BridgeMessage::Error { .. } => {
                let text = error.error_text().unwrap_or_default();
                self.apply_error(text.clone());
                Dispatch::Error(text)
            }
            BridgeMessage::FilesUpdated => {
                self.host.on_toast("App files updated");
                Dispatch::Toast
            }
            BridgeMessage::FilesRequest => self.serve_files(origin, reply, files),
            other => Dispatch::Unexpected(other.kind()),
        }
    }

    fn serve_files(
        &self,
        origin: &str,
        reply: &mut dyn MessageSink,
        files: &dyn BundleSource,
    ) -> Dispatch {
        let (bundle, error) = match files.read_files() {
            Ok(bundle) => (bundle, None),
            Err(e) => {
                crate::log!("bridge"; "cannot serve files: {}", e);
                (FileBundle::new(), Some(e.to_string()))
            }
        };

        let response = BridgeMessage::files_response(bundle, unix_millis(), error.clone());
        let target = normalize_origin(origin).unwrap_or_else(|| self.target_origin.clone());
        if let Err(e) = reply.post(&response, &target) {
            crate::log!("bridge"; "failed to answer file request: {}", e);
        }
        Dispatch::FilesServed { error }
    }

    fn enter_loading(&mut self) -> Result<Url, BridgeError> {
        let url = preview_url(&self.base, &self.app_id, unix_millis())?;
        self.status = BridgeStatus::Loading;
        Ok(url)
    }

    fn apply_error(&mut self, error: String) {
        if self.status == BridgeStatus::Loading {
            self.status = BridgeStatus::Errored(error.clone());
        }
        self.host.on_error(&error);
    }
}
