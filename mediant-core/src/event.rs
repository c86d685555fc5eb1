//! Events and their subscribers.
//!
//! Unlike requests, events are routed by **name** and may reach any number of
//! subscribers. A subscriber failing never affects the publisher or the other
//! subscribers.

use crate::error::{BoxError, MediatorError};
use futures::future::BoxFuture;
use std::{any::Any, future::Future, marker::PhantomData};

/// An immutable, named notification.
///
/// # Example
///
/// ```rust,ignore
/// struct OrderShipped { id: String }
///
/// impl Event for OrderShipped {
///     fn name(&self) -> &str { "order.shipped" }
/// }
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a valid Event",
    label = "missing `Event` implementation",
    note = "Events must be `Send + Sync + 'static` and expose a `name`."
)]
pub trait Event: Send + Sync + 'static {
    /// The name subscribers register under.
    fn name(&self) -> &str;
}

/// A subscriber for events of type `E`.
pub trait EventHandler<E: Event>: Send + Sync + 'static {
    /// Consume one event.
    fn handle(&self, event: &E) -> impl Future<Output = Result<(), BoxError>> + Send;
}

// Blanket impl for closures
impl<F, E, Fut> EventHandler<E> for F
where
    E: Event + Clone,
    F: Fn(E) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), BoxError>> + Send,
{
    fn handle(&self, event: &E) -> impl Future<Output = Result<(), BoxError>> + Send {
        (self)(event.clone())
    }
}

/// Object-safe, type-erased subscriber.
pub trait DynEventHandler: Send + Sync + 'static {
    /// Type name of the event this subscriber expects.
    fn event_type(&self) -> &'static str;

    /// Consume an event whose concrete type has been erased.
    fn handle_dyn<'a>(
        &'a self,
        name: &'a str,
        event: &'a (dyn Any + Send + Sync),
    ) -> BoxFuture<'a, Result<(), BoxError>>;
}

/// Bridges a typed [`EventHandler`] into a [`DynEventHandler`].
pub struct EventHandlerAdapter<E, H> {
    handler: H,
    _event: PhantomData<fn(E)>,
}

impl<E, H> EventHandlerAdapter<E, H> {
    /// Wrap a typed subscriber.
    pub const fn new(handler: H) -> Self {
        Self {
            handler,
            _event: PhantomData,
        }
    }
}

impl<E, H> DynEventHandler for EventHandlerAdapter<E, H>
where
    E: Event,
    H: EventHandler<E>,
{
    fn event_type(&self) -> &'static str {
        std::any::type_name::<E>()
    }

    fn handle_dyn<'a>(
        &'a self,
        name: &'a str,
        event: &'a (dyn Any + Send + Sync),
    ) -> BoxFuture<'a, Result<(), BoxError>> {
        Box::pin(async move {
            let Some(event) = event.downcast_ref::<E>() else {
                return Err(Box::new(MediatorError::EventMismatch {
                    event: name.to_owned(),
                    expected: std::any::type_name::<E>(),
                }) as BoxError);
            };
            self.handler.handle(event).await
        })
    }
}
