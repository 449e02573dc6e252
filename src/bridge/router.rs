//! Inbound frame handling.

use std::path::PathBuf;

use super::{Bridge, CaptureReply, PeerHandle};
use crate::{
    config::UnmatchedReplyPolicy,
    error::{BridgeError, Result},
    protocol::{InboundMessage, OutboundMessage},
};

const DEFAULT_CAPTURE_ERROR: &str = "Screenshot capture failed";

/// What the router did with one frame.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteOutcome {
    /// A pending capture was completed with the reply.
    Resolved { request_id: String },
    /// A pending capture was failed with the reported error.
    Failed { request_id: String },
    /// Nobody was waiting; the screenshot went straight to disk.
    Saved { path: PathBuf },
    /// An unmatched error report or an empty unmatched screenshot, logged and dropped.
    Dropped,
    ElementStored,
    ConsoleLog,
    PathUpdated,
}

impl Bridge {
    /// Parse and apply one text frame received on `peer`'s connection.
    pub async fn handle_frame(&self, peer: &PeerHandle, text: &str) -> Result<RouteOutcome> {
        let message = InboundMessage::parse(text)?;
        tracing::debug!(
            "Received {} from connection {}",
            message.kind(),
            peer.id()
        );
        self.route(peer, message).await
    }

    pub async fn route(&self, peer: &PeerHandle, message: InboundMessage) -> Result<RouteOutcome> {
        match message {
            InboundMessage::ScreenshotData {
                request_id,
                data,
                path,
            } => {
                self.route_screenshot(request_id, CaptureReply { data, path })
                    .await
            }
            InboundMessage::ScreenshotError { request_id, error } => {
                let error = error
                    .filter(|e| !e.is_empty())
                    .unwrap_or_else(|| DEFAULT_CAPTURE_ERROR.to_string());
                Ok(self.route_screenshot_error(request_id, error))
            }
            InboundMessage::SelectedElement { data } => {
                tracing::info!("Received selected element <{}>", data.tag);
                self.elements.push(data);
                Ok(RouteOutcome::ElementStored)
            }
            InboundMessage::ConsoleLogData { data } => {
                tracing::debug!("Extension console log: {data}");
                Ok(RouteOutcome::ConsoleLog)
            }
            InboundMessage::UpdateSavePath { path } => {
                if path.trim().is_empty() {
                    return Err(BridgeError::Malformed(
                        "update-save-path with an empty path".to_string(),
                    ));
                }
                self.artifacts.set_destination(path);
                if let Err(e) = peer.send(OutboundMessage::PathUpdateConfirmation { success: true }) {
                    tracing::warn!("Could not confirm path update: {e}");
                }
                Ok(RouteOutcome::PathUpdated)
            }
        }
    }

    async fn route_screenshot(
        &self,
        request_id: Option<String>,
        reply: CaptureReply,
    ) -> Result<RouteOutcome> {
        let reply = match request_id {
            Some(id) => match self.pending.try_resolve(&id, reply) {
                Ok(()) => {
                    tracing::debug!("Resolved capture request {id}");
                    return Ok(RouteOutcome::Resolved { request_id: id });
                }
                Err(reply) => {
                    tracing::warn!("Screenshot reply for unknown or expired request {id}");
                    reply
                }
            },
            None => reply,
        };

        let reply = match self.oldest_for_fallback() {
            Some(oldest) => match self.pending.try_resolve(&oldest, reply) {
                Ok(()) => {
                    tracing::info!("Resolved oldest capture request {oldest} with unmatched reply");
                    return Ok(RouteOutcome::Resolved { request_id: oldest });
                }
                Err(reply) => reply,
            },
            None => reply,
        };

        if reply.data.trim().is_empty() {
            tracing::warn!("Ignoring unmatched screenshot reply without data");
            return Ok(RouteOutcome::Dropped);
        }

        tracing::info!("No capture request waiting, saving screenshot directly");
        let path = self
            .artifacts
            .write_artifact(&reply.data, reply.path.as_deref())
            .await?;
        Ok(RouteOutcome::Saved { path })
    }

    fn route_screenshot_error(&self, request_id: Option<String>, error: String) -> RouteOutcome {
        tracing::warn!("Extension reported screenshot error: {error}");

        let target = request_id
            .filter(|id| self.pending.contains(id))
            .or_else(|| self.oldest_for_fallback());

        if let Some(id) = target {
            if self.pending.fail(&id, BridgeError::RemoteCapture(error)) {
                return RouteOutcome::Failed { request_id: id };
            }
        }

        tracing::warn!("No capture request matches the screenshot error, dropping it");
        RouteOutcome::Dropped
    }

    fn oldest_for_fallback(&self) -> Option<String> {
        match self.unmatched_policy {
            UnmatchedReplyPolicy::DiskOnly => None,
            UnmatchedReplyPolicy::ResolveOldest => self.pending.oldest(),
        }
    }
}
