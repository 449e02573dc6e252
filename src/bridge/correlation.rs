//! Pending capture requests keyed by request id.
//!
//! Every entry is completed exactly once: whoever removes it from the map (a reply,
//! an error, the deadline timer or a rollback) owns the completion.

use std::{collections::HashMap, sync::Arc, time::Duration};

use parking_lot::Mutex;
use tokio::{sync::oneshot, task::AbortHandle, time::Instant};

use crate::error::{BridgeError, Result};

/// Screenshot payload delivered by the extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureReply {
    pub data: String,
    /// One-shot destination override carried by the reply.
    pub path: Option<String>,
}

struct PendingEntry {
    tx: oneshot::Sender<Result<CaptureReply>>,
    created_at: Instant,
    timer: AbortHandle,
}

impl PendingEntry {
    fn finish(self, id: &str, outcome: Result<CaptureReply>) {
        self.timer.abort();
        if self.tx.send(outcome).is_err() {
            tracing::debug!("Caller for capture request {id} is gone, dropping its reply");
        }
    }
}

#[derive(Clone, Default)]
pub struct CorrelationTable {
    entries: Arc<Mutex<HashMap<String, PendingEntry>>>,
}

impl CorrelationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `id` and arm its deadline. Must be called from within a Tokio runtime.
    pub fn register(&self, id: impl Into<String>, timeout: Duration) -> Result<PendingReply> {
        let id = id.into();
        let mut entries = self.entries.lock();
        if entries.contains_key(&id) {
            return Err(BridgeError::DuplicateRequest(id));
        }

        let (tx, rx) = oneshot::channel();
        let created_at = Instant::now();
        let timer = {
            let table = self.clone();
            let id = id.clone();
            tokio::spawn(async move {
                tokio::time::sleep_until(created_at + timeout).await;
                table.expire(&id, timeout);
            })
            .abort_handle()
        };

        entries.insert(
            id.clone(),
            PendingEntry {
                tx,
                created_at,
                timer,
            },
        );
        tracing::debug!("Registered capture request {id} (timeout {timeout:?})");

        Ok(PendingReply { id, rx })
    }

    /// Complete `id` with a payload. False if `id` is not outstanding.
    pub fn resolve(&self, id: &str, reply: CaptureReply) -> bool {
        self.try_resolve(id, reply).is_ok()
    }

    /// Like `resolve`, but hands the payload back when `id` is not outstanding.
    pub(crate) fn try_resolve(
        &self,
        id: &str,
        reply: CaptureReply,
    ) -> std::result::Result<(), CaptureReply> {
        let Some(entry) = self.entries.lock().remove(id) else {
            return Err(reply);
        };
        entry.finish(id, Ok(reply));
        Ok(())
    }

    /// Complete `id` with an error. False if `id` is not outstanding.
    pub fn fail(&self, id: &str, error: BridgeError) -> bool {
        self.complete(id, Err(error))
    }

    /// Drop `id` without completing it, e.g. when the command never left.
    pub fn cancel(&self, id: &str) -> bool {
        let removed = self.entries.lock().remove(id);
        match removed {
            Some(entry) => {
                entry.timer.abort();
                true
            }
            None => false,
        }
    }

    /// Id of the longest-waiting request.
    pub fn oldest(&self) -> Option<String> {
        self.entries
            .lock()
            .iter()
            .min_by_key(|(_, entry)| entry.created_at)
            .map(|(id, _)| id.clone())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.lock().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    fn complete(&self, id: &str, outcome: Result<CaptureReply>) -> bool {
        let removed = self.entries.lock().remove(id);
        match removed {
            Some(entry) => {
                entry.finish(id, outcome);
                true
            }
            None => false,
        }
    }

    fn expire(&self, id: &str, after: Duration) {
        let timed_out = self.complete(
            id,
            Err(BridgeError::Timeout {
                request_id: id.to_string(),
                after,
            }),
        );
        if timed_out {
            tracing::warn!("Screenshot capture timed out for request {id}");
        }
    }
}

/// Caller's side of a registered request.
#[derive(Debug)]
pub struct PendingReply {
    id: String,
    rx: oneshot::Receiver<Result<CaptureReply>>,
}

impl PendingReply {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub async fn wait(self) -> Result<CaptureReply> {
        match self.rx.await {
            Ok(outcome) => outcome,
            Err(_) => Err(BridgeError::PeerSend(format!(
                "request {} was dropped before completion",
                self.id
            ))),
        }
    }
}
