//! Requests and the type-erased envelope that carries them through a pipeline.

use std::any::{Any, TypeId};

/// A value dispatched to exactly one handler.
///
/// Routing uses the request's type identity only, never its value. Commands and
/// queries are both plain requests; the distinction is a naming convention.
///
/// # Example
///
/// ```rust,ignore
/// struct CreateOrder { id: String }
///
/// impl Request for CreateOrder {
///     type Response = OrderCreated;
/// }
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a valid Request",
    label = "missing `Request` implementation",
    note = "Requests must be `Send + Sync + 'static` and declare a `Response` type."
)]
pub trait Request: Send + Sync + 'static {
    /// The value a successful handler produces for this request.
    type Response: Send + 'static;
}

/// A type-erased response travelling back up the pipeline.
pub type Response = Box<dyn Any + Send>;

/// A request with its concrete type erased.
///
/// Behaviors only ever see an `Envelope`, which lets one behavior instance sit
/// in front of every request type.
pub struct Envelope {
    type_id: TypeId,
    type_name: &'static str,
    payload: Box<dyn Any + Send + Sync>,
}

impl Envelope {
    /// Seal a request into an envelope.
    pub fn new<R: Request>(request: R) -> Self {
        Self {
            type_id: TypeId::of::<R>(),
            type_name: std::any::type_name::<R>(),
            payload: Box::new(request),
        }
    }

    /// Type identity of the sealed request.
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Fully qualified type name of the sealed request.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Borrow the request if it is of type `R`.
    pub fn downcast_ref<R: Request>(&self) -> Option<&R> {
        self.payload.downcast_ref::<R>()
    }

    /// Check whether the sealed request is of type `R`.
    pub fn is<R: Request>(&self) -> bool {
        self.type_id == TypeId::of::<R>()
    }
}

impl std::fmt::Debug for Envelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Envelope")
            .field("request", &self.type_name)
            .finish_non_exhaustive()
    }
}
