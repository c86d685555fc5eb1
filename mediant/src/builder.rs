//! Builder for [`Mediator`].
//!
//! Everything a mediator dispatches to is declared here. [`MediatorBuilder::build`]
//! freezes the result; setup errors are collected along the way and reported
//! by `build`.

use crate::mediator::{Inner, Mediator};
use mediant_core::{
    Behavior, DynQueuePublisher, Event, EventHandler, Handler, MediatorError, QueuePublisher,
    Request,
};
use mediant_std::{
    CircuitBreaker, Container, EventBus, HandlerRegistry, Inject, LoggingBehavior,
    MediatorConfig, PipelineBuilder, Retry, TimingBehavior,
};
use std::sync::Arc;
use tokio::runtime::Handle;

type Injection =
    Box<dyn FnOnce(&Container, &mut HandlerRegistry) -> Result<(), MediatorError> + Send>;

/// Builder for constructing a [`Mediator`].
///
/// # Example
/// ```ignore
/// let mediator = Mediator::builder()
///     .provide(OrderRepository::connect(&url)?)
///     .with_config(MediatorConfig {
///         retry: Some(RetryConfig::default()),
///         ..Default::default()
///     })
///     .handler_injected::<CreateOrder, CreateOrderHandler>()
///     .build()?;
/// ```
#[derive(Default)]
pub struct MediatorBuilder {
    handlers: HandlerRegistry,
    pipeline: PipelineBuilder,
    bus: EventBus,
    container: Container,
    injections: Vec<Injection>,
    queue: Option<Arc<dyn DynQueuePublisher>>,
    runtime: Option<Handle>,
    errors: Vec<MediatorError>,
}

impl MediatorBuilder {
    /// Create a new empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a behavior. The first behavior added is the outermost.
    pub fn behavior<B: Behavior>(mut self, behavior: B) -> Self {
        self.pipeline.push(behavior);
        self
    }

    /// Append the standard behaviors enabled in `config`.
    ///
    /// They are added in the order logging, timing, circuit breaker, retry,
    /// after any behavior added before this call.
    pub fn with_config(mut self, config: MediatorConfig) -> Self {
        if config.logging {
            self.pipeline.push(LoggingBehavior);
        }
        if config.timing {
            self.pipeline.push(TimingBehavior);
        }
        if let Some(breaker) = config.circuit_breaker {
            self.pipeline.push(CircuitBreaker::new(breaker));
        }
        if let Some(retry) = config.retry {
            self.pipeline.push(Retry::new(retry));
        }
        self
    }

    /// Register the handler for request type `R`.
    ///
    /// A second handler for the same `R` makes [`build`](Self::build) fail
    /// with [`MediatorError::DuplicateHandler`].
    pub fn handler<R, H>(mut self, handler: H) -> Self
    where
        R: Request,
        H: Handler<R>,
    {
        if let Err(err) = self.handlers.register::<R, H>(handler) {
            self.errors.push(err);
        }
        self
    }

    /// Register a handler for `R` that is constructed from the provided
    /// dependencies.
    ///
    /// Construction happens in [`build`](Self::build), so dependencies may be
    /// provided before or after this call.
    pub fn handler_injected<R, H>(mut self) -> Self
    where
        R: Request,
        H: Handler<R> + Inject,
    {
        self.injections.push(Box::new(|container: &Container, handlers: &mut HandlerRegistry| {
            let handler = H::inject(container)?;
            handlers.register::<R, H>(handler)
        }));
        self
    }

    /// Provide a singleton dependency for injected handlers.
    ///
    /// Trait objects are provided as `Arc<dyn Trait>` values and resolved
    /// with [`Container::resolve_cloned`].
    pub fn provide<T: Send + Sync + 'static>(mut self, instance: T) -> Self {
        self.container.provide(instance);
        self
    }

    /// Provide an already shared singleton dependency.
    pub fn provide_arc<T: Send + Sync + 'static>(mut self, instance: Arc<T>) -> Self {
        self.container.provide_arc(instance);
        self
    }

    /// Subscribe `handler` to events named `name`.
    pub fn subscribe<E, H>(mut self, name: impl Into<String>, handler: H) -> Self
    where
        E: Event,
        H: EventHandler<E>,
    {
        self.bus.subscribe::<E, H>(name, handler);
        self
    }

    /// Set the publisher used by [`Mediator::publish_to_queue`].
    pub fn queue_publisher<P: QueuePublisher>(mut self, publisher: P) -> Self {
        self.queue = Some(Arc::new(publisher));
        self
    }

    /// Set the runtime that receives subscriber tasks when
    /// [`Mediator::publish`] is called from a thread outside any runtime.
    ///
    /// Defaults to the runtime `build` is called from, if any.
    pub fn runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Freeze the configuration into a [`Mediator`].
    ///
    /// Fails with the first setup error: a duplicate handler or a missing
    /// dependency of an injected handler.
    pub fn build(self) -> Result<Mediator, MediatorError> {
        let Self {
            mut handlers,
            pipeline,
            bus,
            container,
            injections,
            queue,
            runtime,
            mut errors,
        } = self;

        for inject in injections {
            if let Err(err) = inject(&container, &mut handlers) {
                errors.push(err);
            }
        }

        if let Some(err) = errors.into_iter().next() {
            tracing::error!(error = %err, "mediator setup failed");
            return Err(err);
        }

        let pipeline = pipeline.build();
        let bus = match runtime.or_else(|| Handle::try_current().ok()) {
            Some(runtime) => bus.with_runtime(runtime),
            None => bus,
        };
        tracing::debug!(
            handlers = handlers.len(),
            behaviors = pipeline.len(),
            subscriptions = bus.registry().len(),
            "mediator built"
        );

        Ok(Mediator::from_parts(Inner {
            handlers,
            pipeline,
            bus,
            queue,
        }))
    }
}

impl std::fmt::Debug for MediatorBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediatorBuilder")
            .field("handlers", &self.handlers)
            .field("behaviors", &self.pipeline.len())
            .field("injections", &self.injections.len())
            .field("container", &self.container)
            .field("runtime", &self.runtime.is_some())
            .field("errors", &self.errors.len())
            .finish_non_exhaustive()
    }
}
