//! Timeout behavior.
//!
//! Opt-in only: the mediator never bounds a handler call on its own, so a
//! hung handler hangs its caller unless this behavior is installed.

use mediant_core::{Behavior, DispatchResult, Envelope, MediatorError, Next};
use std::time::Duration;

/// A behavior that fails with [`MediatorError::Timeout`] when the rest of the
/// chain does not finish within `duration`.
///
/// The timed-out chain is dropped, which cancels the handler at its next
/// await point.
///
/// # Example
///
/// ```rust,ignore
/// let builder = Mediator::builder().behavior(TimeoutBehavior::secs(5));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TimeoutBehavior {
    duration: Duration,
}

impl TimeoutBehavior {
    /// Create a timeout behavior.
    pub const fn new(duration: Duration) -> Self {
        Self { duration }
    }

    /// Create a timeout behavior with the limit specified in seconds.
    pub const fn secs(seconds: u64) -> Self {
        Self::new(Duration::from_secs(seconds))
    }

    /// Create a timeout behavior with the limit specified in milliseconds.
    pub const fn millis(millis: u64) -> Self {
        Self::new(Duration::from_millis(millis))
    }

    /// Get the configured timeout duration.
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl Behavior for TimeoutBehavior {
    async fn handle(&self, envelope: &Envelope, next: Next<'_>) -> DispatchResult {
        match tokio::time::timeout(self.duration, next.run(envelope)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    request = envelope.type_name(),
                    timeout = ?self.duration,
                    "request timed out"
                );
                Err(MediatorError::Timeout(self.duration))
            }
        }
    }
}
