//! Fire-and-forget event bus.
//!
//! `publish` spawns one Tokio task per subscriber and returns immediately.
//! Subscribers run concurrently and independently; a failing or panicking
//! subscriber affects nobody else, and its error is only logged.
//!
//! Tasks go to the runtime of the calling thread. A caller outside any runtime
//! falls back to the handle given to [`EventBus::with_runtime`], and without
//! one the subscribers run on a dedicated thread.

use super::subscriptions::SubscriptionRegistry;
use futures::{FutureExt, executor, future};
use mediant_core::{DynEventHandler, Event, EventHandler};
use std::{any::Any, panic::AssertUnwindSafe, sync::Arc};
use tokio::runtime::Handle;

/// Publishes events to every subscriber registered under the event's name.
#[derive(Debug, Default)]
pub struct EventBus {
    registry: SubscriptionRegistry,
    runtime: Option<Handle>,
}

impl EventBus {
    /// Create a bus with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a bus over an existing registry.
    pub fn with_registry(registry: SubscriptionRegistry) -> Self {
        Self {
            registry,
            runtime: None,
        }
    }

    /// Spawn subscribers on `runtime` when `publish` is called from outside
    /// any Tokio runtime.
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Append a subscriber for events named `name`.
    pub fn subscribe<E, H>(&mut self, name: impl Into<String>, handler: H)
    where
        E: Event,
        H: EventHandler<E>,
    {
        self.registry.subscribe::<E, H>(name, handler);
    }

    /// Get the subscription registry.
    pub fn registry(&self) -> &SubscriptionRegistry {
        &self.registry
    }

    /// Dispatch `event` to its subscribers without waiting for them.
    ///
    /// Returns the number of subscribers the event was dispatched to.
    /// Publishing a name with no subscribers does nothing and returns 0.
    pub fn publish<E: Event>(&self, event: E) -> usize {
        let subscribers = self.registry.subscribers(event.name());
        if subscribers.is_empty() {
            tracing::trace!(event = event.name(), "no subscribers");
            return 0;
        }

        let name: Arc<str> = Arc::from(event.name());
        let event: Arc<dyn Any + Send + Sync> = Arc::new(event);
        let deliveries = subscribers.iter().map(|subscriber| {
            deliver(Arc::clone(subscriber), Arc::clone(&name), Arc::clone(&event))
        });

        match Handle::try_current().ok().or_else(|| self.runtime.clone()) {
            Some(runtime) => {
                for delivery in deliveries {
                    runtime.spawn(delivery);
                }
            }
            None => {
                let deliveries: Vec<_> = deliveries.collect();
                let spawned = std::thread::Builder::new()
                    .name("mediant-events".into())
                    .spawn(move || executor::block_on(future::join_all(deliveries)));
                if let Err(err) = spawned {
                    tracing::error!(
                        event = %name,
                        error = %err,
                        "failed to start event delivery thread, event dropped"
                    );
                    return 0;
                }
                tracing::trace!(event = %name, "no Tokio runtime, delivering on a thread");
            }
        }

        tracing::debug!(event = %name, subscribers = subscribers.len(), "event published");
        subscribers.len()
    }
}

async fn deliver(
    subscriber: Arc<dyn DynEventHandler>,
    name: Arc<str>,
    event: Arc<dyn Any + Send + Sync>,
) {
    let outcome = AssertUnwindSafe(subscriber.handle_dyn(&name, event.as_ref()))
        .catch_unwind()
        .await;
    match outcome {
        Ok(Ok(())) => {}
        Ok(Err(err)) => tracing::error!(
            event = %name,
            subscriber = subscriber.event_type(),
            error = %err,
            "event handler failed"
        ),
        Err(_) => tracing::error!(
            event = %name,
            subscriber = subscriber.event_type(),
            "event handler panicked"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FailingEventHandler, RecordingEventHandler};
    use mediant_core::BoxError;
    use std::time::Duration;

    #[derive(Clone, Debug, PartialEq)]
    struct Shipped {
        id: u32,
    }
    impl Event for Shipped {
        fn name(&self) -> &str {
            "order.shipped"
        }
    }

    #[derive(Clone, Debug)]
    struct Cancelled;
    impl Event for Cancelled {
        fn name(&self) -> &str {
            "order.cancelled"
        }
    }

    struct Panicker;
    impl EventHandler<Shipped> for Panicker {
        async fn handle(&self, _event: &Shipped) -> Result<(), BoxError> {
            panic!("subscriber bug");
        }
    }

    #[tokio::test]
    async fn test_publish_reaches_every_subscriber() {
        let first = RecordingEventHandler::<Shipped>::new();
        let second = RecordingEventHandler::<Shipped>::new();
        let mut bus = EventBus::new();
        bus.subscribe::<Shipped, _>("order.shipped", first.clone());
        bus.subscribe::<Shipped, _>("order.shipped", second.clone());

        assert_eq!(bus.publish(Shipped { id: 1 }), 2);

        assert!(first.wait_for(1, Duration::from_secs(1)).await);
        assert!(second.wait_for(1, Duration::from_secs(1)).await);
        assert_eq!(first.events(), vec![Shipped { id: 1 }]);
    }

    #[tokio::test]
    async fn test_no_subscribers_is_noop() {
        let bus = EventBus::new();
        assert_eq!(bus.publish(Shipped { id: 1 }), 0);
    }

    #[tokio::test]
    async fn test_failures_and_panics_are_isolated() {
        let failing = FailingEventHandler::new();
        let recorder = RecordingEventHandler::<Shipped>::new();
        let mut bus = EventBus::new();
        bus.subscribe::<Shipped, _>("order.shipped", Panicker);
        bus.subscribe::<Shipped, _>("order.shipped", failing.clone());
        bus.subscribe::<Shipped, _>("order.shipped", recorder.clone());

        assert_eq!(bus.publish(Shipped { id: 7 }), 3);
        assert!(recorder.wait_for(1, Duration::from_secs(1)).await);

        bus.publish(Shipped { id: 8 });
        assert!(recorder.wait_for(2, Duration::from_secs(1)).await);
    }

    #[tokio::test]
    async fn test_mismatched_event_type_is_logged_not_delivered() {
        let recorder = RecordingEventHandler::<Shipped>::new();
        let mut bus = EventBus::new();
        bus.subscribe::<Shipped, _>("order.cancelled", recorder.clone());

        assert_eq!(bus.publish(Cancelled), 1);
        assert!(!recorder.wait_for(1, Duration::from_millis(50)).await);
    }

    #[test]
    fn test_publish_outside_runtime_uses_fallback_handle() {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .unwrap();
        let recorder = RecordingEventHandler::<Shipped>::new();
        let mut bus = EventBus::new().with_runtime(runtime.handle().clone());
        bus.subscribe::<Shipped, _>("order.shipped", recorder.clone());

        assert_eq!(bus.publish(Shipped { id: 1 }), 1);
        assert!(runtime.block_on(recorder.wait_for(1, Duration::from_secs(1))));
    }

    #[test]
    fn test_publish_without_any_runtime_still_delivers() {
        let recorder = RecordingEventHandler::<Shipped>::new();
        let mut bus = EventBus::new();
        bus.subscribe::<Shipped, _>("order.shipped", recorder.clone());

        assert_eq!(bus.publish(Shipped { id: 1 }), 1);

        let deadline = std::time::Instant::now() + Duration::from_secs(1);
        while recorder.count() == 0 && std::time::Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(recorder.events(), vec![Shipped { id: 1 }]);
    }
}
