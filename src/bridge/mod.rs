//! Extension bridge
//!
//! Turns capture requests into commands for the attached browser extension and pairs the
//! extension's asynchronous replies with the callers waiting on them:
//! - `peer`: the single active extension connection
//! - `correlation`: outstanding requests, their deadlines and completions
//! - `dispatch`: sending capture commands
//! - `router`: classifying and applying inbound frames

mod correlation;
mod dispatch;
mod peer;
mod router;

pub use correlation::{CaptureReply, CorrelationTable, PendingReply};
pub use peer::{ConnectionId, PeerHandle, PeerRegistry};
pub use router::RouteOutcome;

use std::{path::PathBuf, time::Duration};

use serde::Serialize;

use crate::{
    config::{Config, UnmatchedReplyPolicy},
    error::{BridgeError, Result},
    store::{ArtifactStore, SelectedElements},
};

/// Where a screenshot ended up, as returned to HTTP and MCP callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavedScreenshot {
    pub path: PathBuf,
    pub filename: String,
}

impl SavedScreenshot {
    pub fn from_path(path: PathBuf) -> Self {
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { path, filename }
    }
}

/// One bridge per process, shared by the HTTP facade, the extension socket and the MCP tools.
pub struct Bridge {
    peers: PeerRegistry,
    pending: CorrelationTable,
    artifacts: ArtifactStore,
    elements: SelectedElements,
    capture_timeout: Duration,
    unmatched_policy: UnmatchedReplyPolicy,
}

impl Bridge {
    pub fn new(config: &Config) -> Self {
        Self {
            peers: PeerRegistry::new(),
            pending: CorrelationTable::new(),
            artifacts: ArtifactStore::new(config.screenshot_path.clone()),
            elements: SelectedElements::default(),
            capture_timeout: config.capture_timeout(),
            unmatched_policy: config.unmatched_reply_policy,
        }
    }

    pub fn peers(&self) -> &PeerRegistry {
        &self.peers
    }

    pub fn pending(&self) -> &CorrelationTable {
        &self.pending
    }

    pub fn artifacts(&self) -> &ArtifactStore {
        &self.artifacts
    }

    pub fn elements(&self) -> &SelectedElements {
        &self.elements
    }

    pub fn capture_timeout(&self) -> Duration {
        self.capture_timeout
    }

    pub fn unmatched_policy(&self) -> UnmatchedReplyPolicy {
        self.unmatched_policy
    }

    /// Ask the extension for a screenshot and save it once it arrives.
    pub async fn capture_screenshot(&self) -> Result<SavedScreenshot> {
        tracing::info!("Starting screenshot capture");
        let pending = self.request_capture()?;
        let request_id = pending.id().to_string();

        let reply = pending.wait().await?;
        if reply.data.is_empty() {
            return Err(BridgeError::RemoteCapture(
                "No screenshot data received from the browser extension".to_string(),
            ));
        }

        tracing::debug!("Received screenshot data for request {request_id}, saving");
        let path = self
            .artifacts
            .write_artifact(&reply.data, reply.path.as_deref())
            .await?;
        Ok(SavedScreenshot::from_path(path))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use tokio::sync::mpsc;

    use super::*;
    use crate::protocol::OutboundMessage;

    pub fn bridge_in(dir: &std::path::Path) -> Bridge {
        let config = Config {
            screenshot_path: dir.to_path_buf(),
            ..Config::default()
        };
        Bridge::new(&config)
    }

    pub fn attach_peer(bridge: &Bridge) -> (PeerHandle, mpsc::UnboundedReceiver<OutboundMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let peer = PeerHandle::new(bridge.peers().next_connection_id(), tx);
        bridge.peers().attach(peer.clone());
        (peer, rx)
    }

    pub fn take_request_id(rx: &mut mpsc::UnboundedReceiver<OutboundMessage>) -> String {
        match rx.try_recv() {
            Ok(OutboundMessage::TakeScreenshot { request_id }) => request_id,
            other => panic!("expected take-screenshot, got {other:?}"),
        }
    }
}
