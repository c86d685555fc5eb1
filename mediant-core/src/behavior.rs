//! # Middleware Layer (Behavior)
//!
//! A behavior wraps the rest of the dispatch chain. It receives the sealed
//! request and a [`Next`] continuation, and decides whether, when and how
//! often to resume the chain.
//!
//! Behaviors compose outermost-first: for `[A, B]` around handler `H`, a send
//! observes `A-enter, B-enter, H, B-exit, A-exit`.
//!
//! # Static vs Dynamic Dispatch
//!
//! [`Behavior`] uses native `async fn` for implementors. Pipelines store
//! behaviors as [`DynBehavior`] trait objects, which every `Behavior`
//! implements automatically.

use crate::{
    error::MediatorError,
    handler::DynHandler,
    request::{Envelope, Response},
};
use futures::future::BoxFuture;
use std::{future::Future, sync::Arc};

/// Outcome of a dispatch step.
pub type DispatchResult = Result<Response, MediatorError>;

/// A cross-cutting step wrapped around every request.
///
/// Any state a behavior keeps is shared by every request flowing through that
/// instance and must be synchronised by the behavior itself.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a `Behavior`",
    label = "missing `Behavior` implementation",
    note = "Behaviors must implement `handle(&self, envelope, next)`."
)]
pub trait Behavior: Send + Sync + 'static {
    /// Run this step, resuming the chain through `next` as needed.
    fn handle(
        &self,
        envelope: &Envelope,
        next: Next<'_>,
    ) -> impl Future<Output = DispatchResult> + Send;
}

/// Dynamic object-safe version of [`Behavior`].
pub trait DynBehavior: Send + Sync + 'static {
    /// Run this step (dynamic dispatch version).
    fn handle_dyn<'a>(
        &'a self,
        envelope: &'a Envelope,
        next: Next<'a>,
    ) -> BoxFuture<'a, DispatchResult>;
}

impl<T: Behavior> DynBehavior for T {
    fn handle_dyn<'a>(
        &'a self,
        envelope: &'a Envelope,
        next: Next<'a>,
    ) -> BoxFuture<'a, DispatchResult> {
        Box::pin(self.handle(envelope, next))
    }
}

/// The remainder of a dispatch chain.
///
/// `Next` is `Copy`: a behavior may run it several times (retry) or not at all
/// (an open circuit breaker). Each run walks the remaining behaviors in order
/// and ends at the handler.
#[derive(Clone, Copy)]
pub struct Next<'a> {
    behaviors: &'a [Arc<dyn DynBehavior>],
    handler: &'a dyn DynHandler,
}

impl<'a> Next<'a> {
    /// Create a continuation over `behaviors` that ends at `handler`.
    pub fn new(behaviors: &'a [Arc<dyn DynBehavior>], handler: &'a dyn DynHandler) -> Self {
        Self { behaviors, handler }
    }

    /// Resume the chain.
    pub fn run(self, envelope: &'a Envelope) -> BoxFuture<'a, DispatchResult> {
        match self.behaviors.split_first() {
            Some((head, rest)) => head.handle_dyn(
                envelope,
                Next {
                    behaviors: rest,
                    handler: self.handler,
                },
            ),
            None => self.handler.call_dyn(envelope),
        }
    }

    /// Number of behaviors left before the handler.
    pub fn remaining(&self) -> usize {
        self.behaviors.len()
    }
}

impl std::fmt::Debug for Next<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Next")
            .field("remaining", &self.behaviors.len())
            .field("handler", &self.handler.request_name())
            .finish()
    }
}
