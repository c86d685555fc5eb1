//! Handler registry keyed by request type.
//!
//! Exactly one handler may be registered per request type. The registry is
//! filled during setup and only read afterwards, so a frozen registry can be
//! shared across tasks without locking.

use mediant_core::{
    DispatchResult, DynHandler, Envelope, Handler, HandlerAdapter, MediatorError, Request,
};
use std::{
    any::TypeId,
    collections::{HashMap, hash_map::Entry},
    sync::Arc,
};

/// Maps a request type to its single handler.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<TypeId, Arc<dyn DynHandler>>,
}

impl HandlerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the handler for request type `R`.
    ///
    /// Fails with [`MediatorError::DuplicateHandler`] if `R` already has one;
    /// the existing handler is kept.
    pub fn register<R, H>(&mut self, handler: H) -> Result<(), MediatorError>
    where
        R: Request,
        H: Handler<R>,
    {
        match self.handlers.entry(TypeId::of::<R>()) {
            Entry::Occupied(_) => Err(MediatorError::DuplicateHandler {
                request: std::any::type_name::<R>(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(HandlerAdapter::<R, H>::new(handler)));
                Ok(())
            }
        }
    }

    /// Find the handler for a request type.
    pub fn lookup(&self, type_id: TypeId) -> Option<&Arc<dyn DynHandler>> {
        self.handlers.get(&type_id)
    }

    /// Find the handler for the request sealed in `envelope`.
    pub fn lookup_envelope(
        &self,
        envelope: &Envelope,
    ) -> Result<&Arc<dyn DynHandler>, MediatorError> {
        self.lookup(envelope.type_id())
            .ok_or(MediatorError::HandlerNotFound {
                request: envelope.type_name(),
            })
    }

    /// Invoke the registered handler directly, bypassing any pipeline.
    pub async fn dispatch(&self, envelope: &Envelope) -> DispatchResult {
        let handler = self.lookup_envelope(envelope)?;
        handler.call_dyn(envelope).await
    }

    /// Check whether `R` has a handler.
    pub fn contains<R: Request>(&self) -> bool {
        self.handlers.contains_key(&TypeId::of::<R>())
    }

    /// Get the number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.handlers.values().map(|h| h.request_name()))
            .finish()
    }
}
