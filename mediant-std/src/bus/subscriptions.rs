//! Subscription registry: event name to ordered subscriber list.

use mediant_core::{DynEventHandler, Event, EventHandler, EventHandlerAdapter};
use std::{collections::HashMap, sync::Arc};

/// Maps an event name to its subscribers, in subscription order.
///
/// Populated during setup; there is no unsubscribe.
#[derive(Default)]
pub struct SubscriptionRegistry {
    subscribers: HashMap<String, Vec<Arc<dyn DynEventHandler>>>,
}

impl SubscriptionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a subscriber for events named `name`.
    pub fn subscribe<E, H>(&mut self, name: impl Into<String>, handler: H)
    where
        E: Event,
        H: EventHandler<E>,
    {
        self.subscribe_dyn(name, Arc::new(EventHandlerAdapter::<E, H>::new(handler)));
    }

    /// Append an already erased subscriber.
    pub fn subscribe_dyn(&mut self, name: impl Into<String>, handler: Arc<dyn DynEventHandler>) {
        self.subscribers.entry(name.into()).or_default().push(handler);
    }

    /// Subscribers for `name`, oldest first. Empty if there are none.
    pub fn subscribers(&self, name: &str) -> &[Arc<dyn DynEventHandler>] {
        self.subscribers.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    /// Iterate over every event name with at least one subscriber.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.subscribers.keys().map(String::as_str)
    }

    /// Total number of subscriptions across all names.
    pub fn len(&self) -> usize {
        self.subscribers.values().map(Vec::len).sum()
    }

    /// Check if nothing is subscribed.
    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

impl std::fmt::Debug for SubscriptionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.subscribers.iter().map(|(name, subs)| (name, subs.len())))
            .finish()
    }
}
