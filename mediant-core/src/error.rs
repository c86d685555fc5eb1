//! Error types for Mediant.
//!
//! - [`MediatorError`] - Every failure a `send`, setup, or queue publish can surface
//! - [`BoxError`] - Dynamic error returned by handlers, subscribers and publishers

use std::time::Duration;
use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error type for all Mediant operations.
#[derive(Error, Debug)]
pub enum MediatorError {
    /// No handler is registered for the request type, or the registered
    /// handler cannot accept the request it was given.
    #[error("no handler registered for request `{request}`")]
    HandlerNotFound {
        /// Type name of the request.
        request: &'static str,
    },

    /// A second handler was registered for the same request type.
    #[error("a handler is already registered for request `{request}`")]
    DuplicateHandler {
        /// Type name of the request.
        request: &'static str,
    },

    /// The circuit breaker is open and the reset timeout has not elapsed.
    #[error("circuit breaker is open")]
    CircuitOpen,

    /// The handler (or an inner behavior) failed.
    #[error(transparent)]
    Handler(BoxError),

    /// The downstream chain did not complete in time.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// A handler declared a dependency that was never provided.
    #[error("dependency `{dependency}` was not provided")]
    DependencyNotFound {
        /// Type name of the missing dependency.
        dependency: &'static str,
    },

    /// An optional collaborator was used without being configured.
    #[error("{0} not configured")]
    NotConfigured(&'static str),

    /// The event could not be serialized for the queue.
    #[error("failed to serialize event: {0}")]
    Serialization(#[source] BoxError),

    /// The queue publisher rejected the event.
    #[error("queue publish failed: {0}")]
    Publish(#[source] BoxError),

    /// A subscriber was registered under a name whose events have another type.
    #[error("event `{event}` is not a `{expected}`")]
    EventMismatch {
        /// Name the event was published under.
        event: String,
        /// Type name the subscriber expects.
        expected: &'static str,
    },

    /// The pipeline produced a response of a different type than the request declares.
    #[error("response for request `{request}` has an unexpected type")]
    ResponseMismatch {
        /// Type name of the request.
        request: &'static str,
    },
}

impl MediatorError {
    /// Wrap any handler error.
    pub fn handler<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        MediatorError::Handler(err.into())
    }

    /// Returns `true` if this is a [`MediatorError::CircuitOpen`].
    pub fn is_circuit_open(&self) -> bool {
        matches!(self, MediatorError::CircuitOpen)
    }

    /// Returns `true` if this is a [`MediatorError::HandlerNotFound`].
    pub fn is_handler_not_found(&self) -> bool {
        matches!(self, MediatorError::HandlerNotFound { .. })
    }

    /// Downcast the wrapped handler error to a concrete type.
    pub fn downcast_handler_ref<E>(&self) -> Option<&E>
    where
        E: std::error::Error + 'static,
    {
        match self {
            MediatorError::Handler(err) => err.downcast_ref::<E>(),
            _ => None,
        }
    }
}

impl From<BoxError> for MediatorError {
    fn from(err: BoxError) -> Self {
        MediatorError::Handler(err)
    }
}
