//! Timing behavior.

use mediant_core::{Behavior, DispatchResult, Envelope, Next};
use std::time::Duration;
use tokio::time::Instant;

/// A behavior that measures how long the rest of the chain takes.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimingBehavior;

fn millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

impl Behavior for TimingBehavior {
    async fn handle(&self, envelope: &Envelope, next: Next<'_>) -> DispatchResult {
        let started = Instant::now();
        let result = next.run(envelope).await;
        tracing::debug!(
            request = envelope.type_name(),
            elapsed_ms = millis(started.elapsed()),
            ok = result.is_ok(),
            "request timed"
        );
        result
    }
}
