//! Dependency resolver.
//!
//! A type-keyed store of shared singletons. It is consulted once, when a
//! handler is constructed during setup, and never during dispatch.
//!
//! Handlers take their dependencies through [`Inject`], an explicit
//! constructor that resolves what it needs from the container.
//!
//! # Example
//!
//! ```rust,ignore
//! struct OrderHandler {
//!     repo: Arc<OrderRepository>,
//! }
//!
//! impl Inject for OrderHandler {
//!     fn inject(container: &Container) -> Result<Self, MediatorError> {
//!         Ok(Self { repo: container.resolve()? })
//!     }
//! }
//! ```

use mediant_core::MediatorError;
use std::{
    any::{Any, TypeId},
    collections::HashMap,
    sync::Arc,
};

/// A type-keyed store of shared instances.
#[derive(Default, Clone)]
pub struct Container {
    dependencies: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl Container {
    /// Create an empty container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `instance` as the singleton for type `T`, replacing any previous one.
    pub fn provide<T: Send + Sync + 'static>(&mut self, instance: T) {
        self.provide_arc(Arc::new(instance));
    }

    /// Store an already shared singleton for type `T`.
    pub fn provide_arc<T: Send + Sync + 'static>(&mut self, instance: Arc<T>) {
        self.dependencies.insert(TypeId::of::<T>(), instance);
    }

    /// Resolve the singleton for type `T`.
    pub fn resolve<T: Send + Sync + 'static>(&self) -> Result<Arc<T>, MediatorError> {
        self.dependencies
            .get(&TypeId::of::<T>())
            .cloned()
            .and_then(|instance| instance.downcast::<T>().ok())
            .ok_or(MediatorError::DependencyNotFound {
                dependency: std::any::type_name::<T>(),
            })
    }

    /// Resolve a copy of the singleton for type `T`.
    ///
    /// Meant for handle types such as `Arc<dyn Trait>`, which are provided by
    /// value and resolved without the extra `Arc` layer.
    pub fn resolve_cloned<T: Clone + Send + Sync + 'static>(&self) -> Result<T, MediatorError> {
        self.resolve::<T>().map(|instance| T::clone(&instance))
    }

    /// Check whether a singleton for `T` was provided.
    pub fn contains<T: 'static>(&self) -> bool {
        self.dependencies.contains_key(&TypeId::of::<T>())
    }

    /// Get the number of provided singletons.
    pub fn len(&self) -> usize {
        self.dependencies.len()
    }

    /// Check if nothing was provided.
    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("dependencies", &self.dependencies.len())
            .finish()
    }
}

/// Constructor injection from a [`Container`].
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be built from a `Container`",
    label = "missing `Inject` implementation",
    note = "Implement `Inject::inject` to resolve this handler's dependencies."
)]
pub trait Inject: Sized {
    /// Build `Self`, resolving every dependency from `container`.
    fn inject(container: &Container) -> Result<Self, MediatorError>;
}
