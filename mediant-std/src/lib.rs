//! # mediant-std
//!
//! Standard implementations for the Mediant request mediator.
//!
//! This crate provides:
//! - **Routing**: [`HandlerRegistry`]
//! - **Pipeline**: [`Pipeline`], [`PipelineBuilder`]
//! - **Standard behaviors**: Circuit breaker, Retry, Logging, Timing, Timeout
//! - **Events**: [`EventBus`], [`SubscriptionRegistry`]
//! - **Dependencies**: [`Container`], [`Inject`]
//! - **Queue**: [`InMemoryQueue`]
//! - **Configuration**: [`MediatorConfig`]

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core traits
pub use mediant_core;

// Modules
pub mod behaviors;
pub mod bus;
pub mod config;
pub mod container;
pub mod pipeline;
pub mod queue;
pub mod registry;
pub mod testing;

pub use behaviors::{
    CircuitBreaker, CircuitState, LoggingBehavior, Retry, TimeoutBehavior, TimingBehavior,
};
pub use bus::{EventBus, SubscriptionRegistry};
pub use config::{CircuitBreakerConfig, MediatorConfig, RetryConfig};
pub use container::{Container, Inject};
pub use pipeline::{Pipeline, PipelineBuilder};
pub use queue::{InMemoryQueue, QueuedMessage};
pub use registry::HandlerRegistry;
