use uuid::Uuid;

use super::{Bridge, PendingReply};
use crate::{
    error::{BridgeError, Result},
    protocol::OutboundMessage,
};

impl Bridge {
    /// Send a `take-screenshot` command to the active extension.
    ///
    /// Fails immediately, with nothing registered, when no extension is attached or the
    /// command cannot be handed to the connection. Otherwise the returned reply settles
    /// on the matching reply, an explicit error or the capture timeout.
    pub fn request_capture(&self) -> Result<PendingReply> {
        let Some(peer) = self.peers.current() else {
            tracing::warn!("No active extension connection for screenshot capture");
            return Err(BridgeError::NoPeer);
        };

        let request_id = Uuid::new_v4().to_string();
        let pending = self
            .pending
            .register(request_id.clone(), self.capture_timeout)?;

        if let Err(e) = peer.send(OutboundMessage::TakeScreenshot {
            request_id: request_id.clone(),
        }) {
            self.pending.cancel(&request_id);
            tracing::error!("Failed to send capture request {request_id}: {e}");
            return Err(e);
        }

        tracing::debug!(
            "Sent capture request {request_id} to connection {}",
            peer.id()
        );
        Ok(pending)
    }
}
