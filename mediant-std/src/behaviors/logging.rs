//! Logging behavior for request observation.

use mediant_core::{Behavior, DispatchResult, Envelope, Next};
use tracing::Instrument;

/// A behavior that logs each request and its outcome.
///
/// The rest of the chain runs inside a `dispatch` span carrying the request
/// type, so events logged by inner behaviors and handlers are attributed to it.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingBehavior;

impl Behavior for LoggingBehavior {
    async fn handle(&self, envelope: &Envelope, next: Next<'_>) -> DispatchResult {
        let span = tracing::info_span!("dispatch", request = envelope.type_name());
        async move {
            tracing::info!("handling request");
            let result = next.run(envelope).await;
            match &result {
                Ok(_) => tracing::info!("request handled"),
                Err(err) => tracing::error!(error = %err, "request failed"),
            }
            result
        }
        .instrument(span)
        .await
    }
}
