//! # mediant-core
//!
//! Core traits for the Mediant request mediator.
//!
//! This crate has minimal dependencies and is designed to be imported by
//! handler crates and extensions that don't need the full `mediant-std`
//! implementation.
//!
//! # Layers
//!
//! ## Requests ([`Request`], [`Envelope`])
//!
//! A request is routed by its type to exactly one handler. Inside the
//! pipeline it travels sealed in an [`Envelope`], so behaviors work for every
//! request type at once.
//!
//! ## Behaviors ([`Behavior`], [`Next`])
//!
//! Middleware around the handler call. A behavior receives the envelope and
//! the rest of the chain, and may run it once, several times, or never.
//!
//! ## Handlers ([`Handler`])
//!
//! The terminal point of a send, where business logic executes.
//!
//! ## Events ([`Event`], [`EventHandler`])
//!
//! Named, one-to-many notifications delivered fire-and-forget.
//!
//! ## Queue ([`QueuePublisher`])
//!
//! The seam towards an external broker.
//!
//! # Error Types
//!
//! - [`MediatorError`] - Top-level error type
//! - [`BoxError`] - Errors raised by user handlers and subscribers

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod behavior;
mod error;
mod event;
mod handler;
mod queue;
mod request;

// Re-exports
pub use behavior::{Behavior, DispatchResult, DynBehavior, Next};
pub use error::{BoxError, MediatorError};
pub use event::{DynEventHandler, Event, EventHandler, EventHandlerAdapter};
pub use handler::{DynHandler, Handler, HandlerAdapter};
pub use queue::{DynQueuePublisher, QueuePublisher};
pub use request::{Envelope, Request, Response};
