//! In-memory queue publisher for tests and single-process deployments.

use mediant_core::{BoxError, QueuePublisher};
use serde::de::DeserializeOwned;
use std::sync::{
    Arc, Mutex, MutexGuard, PoisonError,
    atomic::{AtomicBool, Ordering},
};
use thiserror::Error;

/// One payload handed to the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedMessage {
    /// Queue (or topic) name.
    pub queue: String,
    /// Serialized event.
    pub payload: Vec<u8>,
}

impl QueuedMessage {
    /// Decode the JSON payload.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.payload)
    }
}

/// Returned by [`InMemoryQueue`] while it is set to reject publishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("queue unavailable")]
pub struct QueueUnavailable;

/// A [`QueuePublisher`] that appends every payload to a shared log.
///
/// Clones share the same log, so a handle kept by a test sees what the
/// mediator published.
///
/// ## Example
///
/// ```rust,ignore
/// let queue = InMemoryQueue::new();
/// let mediator = Mediator::builder()
///     .queue_publisher(queue.clone())
///     .build()?;
///
/// mediator.publish_to_queue(OrderShipped { id: 1 }).await?;
/// assert_eq!(queue.messages_for("order.shipped").len(), 1);
/// ```
#[derive(Clone, Default)]
pub struct InMemoryQueue {
    log: Arc<Mutex<Vec<QueuedMessage>>>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    fn log(&self) -> MutexGuard<'_, Vec<QueuedMessage>> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Get a copy of every message, in publish order.
    pub fn messages(&self) -> Vec<QueuedMessage> {
        self.log().clone()
    }

    /// Get the messages published to `queue`, in publish order.
    pub fn messages_for(&self, queue: &str) -> Vec<QueuedMessage> {
        self.log()
            .iter()
            .filter(|message| message.queue == queue)
            .cloned()
            .collect()
    }

    /// Get the total number of messages.
    pub fn len(&self) -> usize {
        self.log().len()
    }

    /// Check if nothing was published.
    pub fn is_empty(&self) -> bool {
        self.log().is_empty()
    }

    /// Drop every recorded message.
    pub fn clear(&self) {
        self.log().clear();
    }

    /// Make subsequent publishes fail with [`QueueUnavailable`] (or succeed again).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }
}

impl std::fmt::Debug for InMemoryQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryQueue")
            .field("messages", &self.len())
            .field("unavailable", &self.unavailable.load(Ordering::SeqCst))
            .finish()
    }
}

impl QueuePublisher for InMemoryQueue {
    async fn publish(&self, queue: &str, payload: Vec<u8>) -> Result<(), BoxError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(Box::new(QueueUnavailable));
        }
        tracing::trace!(queue, bytes = payload.len(), "message queued");
        self.log().push(QueuedMessage {
            queue: queue.to_owned(),
            payload,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Shipped {
        id: u32,
    }

    #[tokio::test]
    async fn test_publish_records_messages() {
        let queue = InMemoryQueue::new();
        let observer = queue.clone();

        queue
            .publish("order.shipped", br#"{"id":1}"#.to_vec())
            .await
            .unwrap();
        queue.publish("order.cancelled", b"{}".to_vec()).await.unwrap();

        assert_eq!(observer.len(), 2);
        let shipped = observer.messages_for("order.shipped");
        assert_eq!(shipped.len(), 1);
        assert_eq!(shipped[0].decode::<Shipped>().unwrap(), Shipped { id: 1 });
        assert_eq!(observer.messages()[1].queue, "order.cancelled");
    }

    #[tokio::test]
    async fn test_unavailable_rejects() {
        let queue = InMemoryQueue::new();
        queue.set_unavailable(true);

        let err = queue.publish("q", Vec::new()).await.unwrap_err();
        assert!(err.downcast_ref::<QueueUnavailable>().is_some());
        assert!(queue.is_empty());

        queue.set_unavailable(false);
        queue.publish("q", Vec::new()).await.unwrap();
        assert_eq!(queue.len(), 1);
        queue.clear();
        assert!(queue.is_empty());
    }
}
