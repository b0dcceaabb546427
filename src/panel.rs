//! Control panel: the developer-facing surface over the bundle and bridge.
//!
//! Everything the UI (or CLI) does to the running system goes through
//! [`ControlPanel`]: read the latest bundle, reload the preview, push a file
//! update, publish.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tokio::sync::mpsc;
use url::Url;
use uuid::Uuid;

use crate::actor::messages::WsMsg;
use crate::bridge::{BridgeError, preview_url, share_url};
use crate::bundle::{BundleError, FileBundle, read_bundle};
use crate::config::{AppConfig, BridgeConfig, ProjectConfig};
use crate::utils::time::unix_millis;

#[derive(Debug, Error)]
pub enum PanelError {
    #[error(transparent)]
    Bundle(#[from] BundleError),

    #[error(transparent)]
    Bridge(#[from] BridgeError),

    /// The bridge actor has stopped.
    #[error("bridge is not running")]
    BridgeClosed,

    #[error("failed to encode publish request: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("publish failed: {0}")]
    Publish(String),
}

/// Payload handed to a [`PublishClient`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishRequest {
    pub project_id: Uuid,
    pub app_id: String,
    pub name: String,
    pub description: String,
    pub version: String,
    /// The bundle serialized as a JSON object.
    pub code: String,
}

/// Remote publishing backend.
pub trait PublishClient {
    /// Publish and return the remote app id.
    fn publish(&mut self, request: &PublishRequest) -> Result<String, PanelError>;
}

/// Prints the request instead of sending it.
pub struct DryRunClient<W> {
    out: W,
}

impl DryRunClient<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> DryRunClient<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> PublishClient for DryRunClient<W> {
    fn publish(&mut self, request: &PublishRequest) -> Result<String, PanelError> {
        let json = serde_json::to_string_pretty(request)?;
        writeln!(self.out, "{json}").map_err(|e| PanelError::Publish(e.to_string()))?;
        Ok(request.app_id.clone())
    }
}

/// Result of a successful publish.
#[derive(Debug, Clone, PartialEq)]
pub struct Published {
    pub remote_app_id: String,
    pub share_url: Url,
}

#[derive(Debug, Clone)]
pub struct ControlPanel {
    artifact: PathBuf,
    bridge: BridgeConfig,
    bridge_tx: Option<mpsc::Sender<WsMsg>>,
}

impl ControlPanel {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            artifact: config.watch.bundle.clone(),
            bridge: config.bridge.clone(),
            bridge_tx: None,
        }
    }

    /// Attach the running bridge actor.
    pub fn with_bridge(mut self, tx: mpsc::Sender<WsMsg>) -> Self {
        self.bridge_tx = Some(tx);
        self
    }

    pub fn artifact(&self) -> &Path {
        &self.artifact
    }

    /// Latest complete bundle written by the watcher.
    pub fn read_latest_bundle(&self) -> Result<FileBundle, PanelError> {
        Ok(read_bundle(&self.artifact)?)
    }

    /// Reload every embedded app. Returns `false` without a bridge.
    pub async fn trigger_reload(&self) -> Result<bool, PanelError> {
        self.send(WsMsg::Reload).await
    }

    /// Push `BAIBIAN_APP_FILE_UPDATE` to every embedded app. Returns `false`
    /// without a bridge.
    pub async fn send_file_update_notification(&self) -> Result<bool, PanelError> {
        self.send(WsMsg::FileUpdate).await
    }

    async fn send(&self, msg: WsMsg) -> Result<bool, PanelError> {
        let Some(tx) = &self.bridge_tx else {
            crate::debug!("bridge"; "no bridge attached, dropping {:?}", msg);
            return Ok(false);
        };
        tx.send(msg).await.map_err(|_| PanelError::BridgeClosed)?;
        Ok(true)
    }

    /// Embedded preview URL with a fresh timestamp.
    pub fn preview_url(&self) -> Result<Url, PanelError> {
        Ok(preview_url(self.bridge.base_host(), &self.bridge.app_id, unix_millis())?)
    }

    /// Shareable URL for a published app.
    pub fn share_url(&self, remote_app_id: &str) -> Result<Url, PanelError> {
        Ok(share_url(self.bridge.base_host(), remote_app_id, unix_millis())?)
    }

    /// Build the publish payload from the latest bundle.
    pub fn publish_request(
        &self,
        project: &ProjectConfig,
        name: &str,
        description: &str,
    ) -> Result<PublishRequest, PanelError> {
        let bundle = self.read_latest_bundle()?;
        Ok(PublishRequest {
            project_id: project.project_id,
            app_id: self.bridge.app_id.clone(),
            name: name.to_string(),
            description: description.to_string(),
            version: project.version.clone(),
            code: serde_json::to_string(&bundle)?,
        })
    }

    pub fn publish(
        &self,
        client: &mut dyn PublishClient,
        project: &ProjectConfig,
        name: &str,
        description: &str,
    ) -> Result<Published, PanelError> {
        let request = self.publish_request(project, name, description)?;
        let remote_app_id = client.publish(&request)?;
        crate::debug!("publish"; "published {} as {}", request.app_id, remote_app_id);

        Ok(Published {
            share_url: self.share_url(&remote_app_id)?,
            remote_app_id,
        })
    }
}
