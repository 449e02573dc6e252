//! Single-slot registry for the attached browser extension.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tokio::sync::mpsc;

use crate::{
    error::{BridgeError, Result},
    protocol::OutboundMessage,
};

pub type ConnectionId = u64;

/// Write half of one extension connection.
///
/// Frames go through an unbounded channel to the connection's writer task, so sending
/// never blocks the caller; it fails once the writer is gone.
#[derive(Clone, Debug)]
pub struct PeerHandle {
    id: ConnectionId,
    tx: mpsc::UnboundedSender<OutboundMessage>,
}

impl PeerHandle {
    pub fn new(id: ConnectionId, tx: mpsc::UnboundedSender<OutboundMessage>) -> Self {
        Self { id, tx }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn send(&self, message: OutboundMessage) -> Result<()> {
        self.tx
            .send(message)
            .map_err(|_| BridgeError::PeerSend(format!("connection {} is closed", self.id)))
    }

    pub fn is_open(&self) -> bool {
        !self.tx.is_closed()
    }
}

#[derive(Default)]
pub struct PeerRegistry {
    active: RwLock<Option<PeerHandle>>,
    next_id: AtomicU64,
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_connection_id(&self) -> ConnectionId {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Make `peer` the active connection, superseding any previous one.
    pub fn attach(&self, peer: PeerHandle) {
        let previous = self.active.write().replace(peer.clone());
        match previous {
            Some(old) => tracing::info!(
                "Extension connection {} supersedes connection {}",
                peer.id,
                old.id
            ),
            None => tracing::info!("Extension connected (connection {})", peer.id),
        }
    }

    pub fn current(&self) -> Option<PeerHandle> {
        self.active.read().clone()
    }

    /// Clear the active slot if it still holds connection `id`.
    ///
    /// Returns false when a newer connection has already taken over.
    pub fn detach(&self, id: ConnectionId) -> bool {
        let mut active = self.active.write();
        match active.as_ref() {
            Some(peer) if peer.id == id => {
                *active = None;
                tracing::info!("Extension disconnected (connection {id})");
                true
            }
            _ => {
                tracing::debug!("Ignoring detach of superseded connection {id}");
                false
            }
        }
    }

    pub fn is_connected(&self) -> bool {
        self.active.read().is_some()
    }
}
