//! Message bus abstraction.
//!
//! The bus carries opaque byte payloads on named subjects. Implementations
//! may use NATS, Kafka, or any other broker.

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;

/// Publish side of a message bus.
///
/// Implementations must be thread-safe (Send + Sync). Delivery is
/// best-effort and unacknowledged.
#[async_trait]
pub trait MessageBus: Send + Sync {
    /// Publish a payload on a subject.
    async fn publish(&self, subject: &str, payload: Bytes) -> Result<()>;
}

/// A simple in-memory bus for testing and single-process deployments.
///
/// Uses channels to fan messages out to subscribers.
pub mod memory {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tokio::sync::{mpsc, RwLock};

    use crate::error::BusError;

    /// Buffer size of each subscriber channel.
    const SUBSCRIBER_BUFFER: usize = 1000;

    /// In-memory bus implementation.
    pub struct MemoryBus {
        /// Subscriber channels for each subject.
        subscribers: RwLock<HashMap<String, Vec<mpsc::Sender<Bytes>>>>,
        /// When set, every publish fails.
        failing: AtomicBool,
    }

    impl MemoryBus {
        /// Create a new memory bus.
        pub fn new() -> Self {
            Self {
                subscribers: RwLock::new(HashMap::new()),
                failing: AtomicBool::new(false),
            }
        }

        /// Subscribe to a subject.
        pub async fn subscribe(&self, subject: &str) -> mpsc::Receiver<Bytes> {
            let (tx, rx) = mpsc::channel(SUBSCRIBER_BUFFER);
            self.subscribers
                .write()
                .await
                .entry(subject.to_string())
                .or_default()
                .push(tx);
            rx
        }

        /// Make every subsequent publish fail (or succeed again).
        pub fn set_failing(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }
    }

    impl Default for MemoryBus {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl MessageBus for MemoryBus {
        async fn publish(&self, subject: &str, payload: Bytes) -> Result<()> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(BusError::Publish("bus unavailable".into()));
            }

            let mut subscribers = self.subscribers.write().await;
            if let Some(senders) = subscribers.get_mut(subject) {
                // Drop subscribers that have gone away; a full subscriber just misses this one.
                senders.retain(|tx| !tx.is_closed());
                for tx in senders.iter() {
                    let _ = tx.try_send(payload.clone());
                }
            }
            Ok(())
        }
    }
}
