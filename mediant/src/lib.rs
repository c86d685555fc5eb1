//! # mediant - In-Process Request Mediator
//!
//! `mediant` routes each typed request to exactly one handler through an
//! ordered chain of behaviors, and separately delivers named events to any
//! number of subscribers, fire-and-forget.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use mediant::prelude::*;
//!
//! #[derive(Request)]
//! #[request(response = u64)]
//! struct CreateOrder { sku: String }
//!
//! struct CreateOrderHandler;
//! impl Handler<CreateOrder> for CreateOrderHandler {
//!     async fn handle(&self, request: &CreateOrder) -> Result<u64, BoxError> {
//!         Ok(42)
//!     }
//! }
//!
//! let mediator = Mediator::builder()
//!     .behavior(LoggingBehavior)
//!     .behavior(Retry::new(RetryConfig::default()))
//!     .handler::<CreateOrder, _>(CreateOrderHandler)
//!     .build()?;
//!
//! let id = mediator.send(CreateOrder { sku: "A-1".into() }).await?;
//! ```
//!
//! ## Behaviors
//!
//! Behaviors run in registration order, the first one outermost. A behavior
//! may call the rest of the chain once ([`LoggingBehavior`]), several times
//! ([`Retry`]) or not at all ([`CircuitBreaker`] while open).
//!
//! ## Events
//!
//! [`Mediator::publish`] spawns one task per subscriber and returns
//! immediately. Subscriber failures are logged with `tracing` and never reach
//! the publisher.

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod builder;
mod mediator;

pub use builder::MediatorBuilder;
pub use mediator::Mediator;

pub use mediant_core::{
    // Behavior
    Behavior,
    // Error types
    BoxError,
    DispatchResult,
    DynBehavior,
    DynEventHandler,
    DynHandler,
    DynQueuePublisher,
    // Request
    Envelope,
    // Event
    Event,
    EventHandler,
    EventHandlerAdapter,
    // Handler
    Handler,
    HandlerAdapter,
    MediatorError,
    Next,
    // Queue
    QueuePublisher,
    Request,
    Response,
};

pub use mediant_std::{
    CircuitBreaker, CircuitBreakerConfig, CircuitState, Container, EventBus, HandlerRegistry,
    InMemoryQueue, Inject, LoggingBehavior, MediatorConfig, Pipeline, PipelineBuilder,
    QueuedMessage, Retry, RetryConfig, SubscriptionRegistry, TimeoutBehavior, TimingBehavior,
};

/// Standard behaviors.
pub mod behaviors {
    #![allow(clippy::wildcard_imports)]
    pub use mediant_std::behaviors::*;
}

/// Queue publishers.
pub mod queue {
    #![allow(clippy::wildcard_imports)]
    pub use mediant_std::queue::*;
}

/// Testing utilities.
pub mod testing {
    #![allow(clippy::wildcard_imports)]
    pub use mediant_std::testing::*;
}

/// Prelude module - common imports for Mediant.
///
/// # Usage
///
/// ```rust,ignore
/// use mediant::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Behaviors
        Behavior,
        // Errors
        BoxError,
        CircuitBreaker,
        CircuitBreakerConfig,
        DispatchResult,
        Envelope,
        // Core traits
        Event,
        EventHandler,
        Handler,
        Inject,
        LoggingBehavior,
        // Mediator
        Mediator,
        MediatorConfig,
        MediatorError,
        Next,
        Request,
        Retry,
        RetryConfig,
    };
}

#[cfg(feature = "macros")]
pub use mediant_macros::{Event, Request};
