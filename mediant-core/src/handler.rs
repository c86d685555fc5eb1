//! # Terminal Layer (Handler)
//!
//! A handler is the single endpoint for one request type. It sits at the end of
//! the behavior pipeline and is the only place where business logic runs.
//!
//! # Usage Patterns
//!
//! 1. **Struct implementation**: `impl Handler<CreateOrder> for OrderHandler`
//! 2. **Closure**: `|req: Ping| async move { Ok(req.0) }` (requires `Ping: Clone`)
//!
//! The typed [`Handler`] trait is erased into [`DynHandler`] by [`HandlerAdapter`]
//! so that handlers for different request types can live in one registry.

use crate::{
    error::{BoxError, MediatorError},
    request::{Envelope, Request, Response},
};
use futures::future::BoxFuture;
use std::{future::Future, marker::PhantomData};

/// The endpoint for one request type.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot handle requests of type `{R}`",
    label = "missing `Handler<{R}>` implementation",
    note = "Handlers must implement the `handle` method for the request type `{R}`."
)]
pub trait Handler<R: Request>: Send + Sync + 'static {
    /// Produce the response for `request`, or fail.
    fn handle(&self, request: &R) -> impl Future<Output = Result<R::Response, BoxError>> + Send;
}

// Blanket impl for closures
impl<F, R, Fut> Handler<R> for F
where
    R: Request + Clone,
    F: Fn(R) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R::Response, BoxError>> + Send,
{
    fn handle(&self, request: &R) -> impl Future<Output = Result<R::Response, BoxError>> + Send {
        (self)(request.clone())
    }
}

/// Object-safe, type-erased handler.
///
/// This is what the registry stores and what the pipeline calls as its
/// terminal step.
pub trait DynHandler: Send + Sync + 'static {
    /// Type name of the request this handler accepts.
    fn request_name(&self) -> &'static str;

    /// Handle a sealed request.
    ///
    /// Fails with [`MediatorError::HandlerNotFound`] when the envelope does not
    /// carry this handler's request type.
    fn call_dyn<'a>(&'a self, envelope: &'a Envelope)
    -> BoxFuture<'a, Result<Response, MediatorError>>;
}

/// Bridges a typed [`Handler`] into a [`DynHandler`].
pub struct HandlerAdapter<R, H> {
    handler: H,
    _request: PhantomData<fn(R)>,
}

impl<R, H> HandlerAdapter<R, H> {
    /// Wrap a typed handler.
    pub const fn new(handler: H) -> Self {
        Self {
            handler,
            _request: PhantomData,
        }
    }

    /// Get a reference to the inner handler.
    pub fn inner(&self) -> &H {
        &self.handler
    }
}

impl<R, H> DynHandler for HandlerAdapter<R, H>
where
    R: Request,
    H: Handler<R>,
{
    fn request_name(&self) -> &'static str {
        std::any::type_name::<R>()
    }

    fn call_dyn<'a>(
        &'a self,
        envelope: &'a Envelope,
    ) -> BoxFuture<'a, Result<Response, MediatorError>> {
        Box::pin(async move {
            let request =
                envelope
                    .downcast_ref::<R>()
                    .ok_or(MediatorError::HandlerNotFound {
                        request: envelope.type_name(),
                    })?;
            let response = self
                .handler
                .handle(request)
                .await
                .map_err(MediatorError::Handler)?;
            Ok::<Response, MediatorError>(Box::new(response))
        })
    }
}
