//! Standard behaviors.
//!
//! - [`CircuitBreaker`]: fail fast after repeated downstream failures
//! - [`Retry`]: re-run a failing downstream with a fixed delay
//! - [`LoggingBehavior`]: log each request and its outcome
//! - [`TimingBehavior`]: log how long each request took
//! - [`TimeoutBehavior`]: bound how long the rest of the chain may take

pub mod circuit_breaker;
pub mod logging;
pub mod retry;
pub mod timeout;
pub mod timing;

pub use circuit_breaker::{CircuitBreaker, CircuitState};
pub use logging::LoggingBehavior;
pub use retry::Retry;
pub use timeout::TimeoutBehavior;
pub use timing::TimingBehavior;
