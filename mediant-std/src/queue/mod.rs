//! Queue publishers.
//!
//! Only the in-memory publisher ships here; broker-backed publishers
//! implement [`QueuePublisher`](mediant_core::QueuePublisher) in their own
//! crates.

pub mod in_memory;

pub use in_memory::{InMemoryQueue, QueueUnavailable, QueuedMessage};
