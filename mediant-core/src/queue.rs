//! Outbound seam towards an external message broker.
//!
//! The mediator never speaks a broker protocol itself. It serializes an event
//! and hands the bytes to a [`QueuePublisher`], which owns any connection or
//! channel resources.

use crate::error::BoxError;
use futures::future::BoxFuture;
use std::{future::Future, sync::Arc};

/// Publishes serialized payloads to a named queue or topic.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a `QueuePublisher`",
    label = "missing `QueuePublisher` implementation",
    note = "Implement `publish(queue, payload)` to forward events to a broker."
)]
pub trait QueuePublisher: Send + Sync + 'static {
    /// Hand `payload` to the broker under `queue`.
    fn publish(
        &self,
        queue: &str,
        payload: Vec<u8>,
    ) -> impl Future<Output = Result<(), BoxError>> + Send;
}

/// Dynamic object-safe version of [`QueuePublisher`].
pub trait DynQueuePublisher: Send + Sync + 'static {
    /// Hand `payload` to the broker under `queue` (dynamic dispatch version).
    fn publish_dyn<'a>(
        &'a self,
        queue: &'a str,
        payload: Vec<u8>,
    ) -> BoxFuture<'a, Result<(), BoxError>>;
}

impl<T: QueuePublisher> DynQueuePublisher for T {
    fn publish_dyn<'a>(
        &'a self,
        queue: &'a str,
        payload: Vec<u8>,
    ) -> BoxFuture<'a, Result<(), BoxError>> {
        Box::pin(self.publish(queue, payload))
    }
}

impl<T: QueuePublisher> QueuePublisher for Arc<T> {
    async fn publish(&self, queue: &str, payload: Vec<u8>) -> Result<(), BoxError> {
        (**self).publish(queue, payload).await
    }
}
