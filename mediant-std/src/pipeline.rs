//! Behavior pipeline.
//!
//! A [`Pipeline`] is an ordered, frozen list of behaviors. Running it against a
//! handler behaves like the right fold `b0(b1(…bn(handler)))`: the first
//! behavior registered is the outermost and runs first.
//!
//! Composition happens once, in [`PipelineBuilder::build`]. Each dispatch then
//! walks the frozen slice through [`Next`] instead of rebuilding a closure
//! chain per request.

use mediant_core::{Behavior, DispatchResult, DynBehavior, DynHandler, Envelope, Next};
use std::sync::Arc;

/// Builder for constructing a [`Pipeline`].
///
/// # Example
/// ```ignore
/// let pipeline = PipelineBuilder::new()
///     .behavior(LoggingBehavior)
///     .behavior(Retry::new(RetryConfig::default()))
///     .build();
/// ```
#[derive(Default)]
pub struct PipelineBuilder {
    behaviors: Vec<Arc<dyn DynBehavior>>,
}

impl PipelineBuilder {
    /// Create a new empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a behavior. Later behaviors sit closer to the handler.
    pub fn behavior<B: Behavior>(mut self, behavior: B) -> Self {
        self.push(behavior);
        self
    }

    /// Append a behavior (mutable version).
    pub fn push<B: Behavior>(&mut self, behavior: B) {
        self.behaviors.push(Arc::new(behavior));
    }

    /// Append an already shared behavior.
    pub fn push_shared(&mut self, behavior: Arc<dyn DynBehavior>) {
        self.behaviors.push(behavior);
    }

    /// Get the number of behaviors added so far.
    pub fn len(&self) -> usize {
        self.behaviors.len()
    }

    /// Check if no behavior was added.
    pub fn is_empty(&self) -> bool {
        self.behaviors.is_empty()
    }

    /// Freeze the behavior order.
    pub fn build(self) -> Pipeline {
        Pipeline {
            behaviors: self.behaviors.into(),
        }
    }
}

/// An immutable, ordered chain of behaviors.
///
/// Cheap to clone; clones share the same behavior instances and therefore the
/// same behavior state.
#[derive(Clone)]
pub struct Pipeline {
    behaviors: Arc<[Arc<dyn DynBehavior>]>,
}

impl Pipeline {
    /// A pipeline with no behaviors.
    pub fn empty() -> Self {
        PipelineBuilder::new().build()
    }

    /// Run the request through every behavior and finally `handler`.
    pub async fn run(&self, envelope: &Envelope, handler: &dyn DynHandler) -> DispatchResult {
        Next::new(&self.behaviors, handler).run(envelope).await
    }

    /// Get the number of behaviors.
    pub fn len(&self) -> usize {
        self.behaviors.len()
    }

    /// Check if the pipeline has no behaviors.
    pub fn is_empty(&self) -> bool {
        self.behaviors.is_empty()
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::empty()
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("behaviors", &self.behaviors.len())
            .finish()
    }
}
