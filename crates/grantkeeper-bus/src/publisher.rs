//! Fire-and-forget publication.
//!
//! [`Publisher::publish`] encodes the message on the caller's task, queues
//! it, and returns. A background worker owns the bus and does the actual
//! publishing. Nothing about the outcome reaches the caller: encode
//! failures, a full queue, a stopped worker, and bus errors are all logged
//! and the message is dropped.

use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::messages::encode;
use crate::transport::MessageBus;

/// A message waiting for the worker.
#[derive(Debug)]
struct Outbound {
    subject: String,
    payload: Bytes,
}

/// Handle for queueing messages onto a detached publishing worker.
///
/// Cloning the handle shares the worker. The worker stops once every
/// handle has been dropped and the queue has drained.
#[derive(Clone)]
pub struct Publisher {
    tx: mpsc::Sender<Outbound>,
}

impl Publisher {
    /// Spawn the worker on the current Tokio runtime.
    ///
    /// `capacity` bounds the number of queued messages; beyond it new
    /// messages are dropped.
    pub fn spawn(bus: Arc<dyn MessageBus>, capacity: usize) -> Self {
        Self::spawn_with_handle(bus, capacity).0
    }

    /// Like [`Publisher::spawn`], also returning the worker's join handle.
    pub fn spawn_with_handle(bus: Arc<dyn MessageBus>, capacity: usize) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let worker = tokio::spawn(run_worker(bus, rx));
        (Self { tx }, worker)
    }

    /// Queue `message` for publication on `subject`. Never blocks.
    pub fn publish<T: Serialize>(&self, subject: &str, message: &T) {
        let payload = match encode(message) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(subject, error = %e, "dropping unencodable message");
                return;
            }
        };

        let outbound = Outbound {
            subject: subject.to_string(),
            payload,
        };

        match self.tx.try_send(outbound) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(out)) => {
                tracing::warn!(subject = %out.subject, "publish queue full, dropping message");
            }
            Err(mpsc::error::TrySendError::Closed(out)) => {
                tracing::warn!(subject = %out.subject, "publisher stopped, dropping message");
            }
        }
    }
}

async fn run_worker(bus: Arc<dyn MessageBus>, mut rx: mpsc::Receiver<Outbound>) {
    while let Some(out) = rx.recv().await {
        if let Err(e) = bus.publish(&out.subject, out.payload).await {
            tracing::warn!(subject = %out.subject, error = %e, "failed to publish message");
        }
    }
    tracing::debug!("publisher worker stopped");
}
