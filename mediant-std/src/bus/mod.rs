//! Event bus and its subscription registry.

pub mod event_bus;
pub mod subscriptions;

pub use event_bus::EventBus;
pub use subscriptions::SubscriptionRegistry;
