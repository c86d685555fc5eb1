//! The mediator: single entry point for requests and events.

use crate::builder::MediatorBuilder;
use mediant_core::{DynQueuePublisher, Envelope, Event, MediatorError, Request};
use mediant_std::{EventBus, HandlerRegistry, Pipeline};
use serde::Serialize;
use std::sync::Arc;

pub(crate) struct Inner {
    pub(crate) handlers: HandlerRegistry,
    pub(crate) pipeline: Pipeline,
    pub(crate) bus: EventBus,
    pub(crate) queue: Option<Arc<dyn DynQueuePublisher>>,
}

/// Routes requests to their handler through the behavior pipeline, and
/// events to their subscribers.
///
/// A `Mediator` is frozen once built: handlers, behaviors and subscriptions
/// cannot change afterwards. Cloning is cheap and every clone dispatches
/// through the same registries and behavior instances.
///
/// # Example
///
/// ```rust,ignore
/// let mediator = Mediator::builder()
///     .behavior(LoggingBehavior)
///     .handler::<CreateOrder, _>(CreateOrderHandler)
///     .subscribe::<OrderCreated, _>("order.created", SendReceipt)
///     .build()?;
///
/// let id = mediator.send(CreateOrder { sku: "A-1".into() }).await?;
/// mediator.publish(OrderCreated { id });
/// ```
#[derive(Clone)]
pub struct Mediator {
    inner: Arc<Inner>,
}

impl Mediator {
    /// Start configuring a mediator.
    pub fn builder() -> MediatorBuilder {
        MediatorBuilder::new()
    }

    pub(crate) fn from_parts(inner: Inner) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Send a request to its handler and wait for the response.
    ///
    /// The handler is looked up before any behavior runs, so a missing handler
    /// fails with [`MediatorError::HandlerNotFound`] without being retried or
    /// counted by a circuit breaker.
    pub async fn send<R: Request>(&self, request: R) -> Result<R::Response, MediatorError> {
        let envelope = Envelope::new(request);
        let handler = self.inner.handlers.lookup_envelope(&envelope)?;
        let response = self.inner.pipeline.run(&envelope, handler.as_ref()).await?;

        response
            .downcast::<R::Response>()
            .map(|response| *response)
            .map_err(|_| MediatorError::ResponseMismatch {
                request: envelope.type_name(),
            })
    }

    /// Publish an event to every subscriber of its name, without waiting.
    ///
    /// Returns how many subscribers the event was dispatched to. Subscriber
    /// failures are logged and never reported here. May be called from any
    /// thread, inside a Tokio runtime or not.
    pub fn publish<E: Event>(&self, event: E) -> usize {
        self.inner.bus.publish(event)
    }

    /// Serialize `event` to JSON and hand it to the queue publisher, using the
    /// event name as the queue name.
    pub async fn publish_to_queue<E>(&self, event: &E) -> Result<(), MediatorError>
    where
        E: Event + Serialize,
    {
        let publisher = self
            .inner
            .queue
            .as_ref()
            .ok_or(MediatorError::NotConfigured("queue publisher"))?;
        let payload =
            serde_json::to_vec(event).map_err(|err| MediatorError::Serialization(Box::new(err)))?;

        let queue = event.name();
        publisher
            .publish_dyn(queue, payload)
            .await
            .map_err(MediatorError::Publish)?;
        tracing::debug!(queue, "event published to queue");
        Ok(())
    }

    /// Check whether a handler is registered for `R`.
    pub fn handles<R: Request>(&self) -> bool {
        self.inner.handlers.contains::<R>()
    }

    /// Get the behavior pipeline.
    pub fn pipeline(&self) -> &Pipeline {
        &self.inner.pipeline
    }

    /// Get the event bus.
    pub fn events(&self) -> &EventBus {
        &self.inner.bus
    }
}

impl std::fmt::Debug for Mediator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mediator")
            .field("handlers", &self.inner.handlers)
            .field("pipeline", &self.inner.pipeline)
            .field("subscriptions", self.inner.bus.registry())
            .field("queue", &self.inner.queue.is_some())
            .finish()
    }
}
