//! Retry behavior.
//!
//! Runs the rest of the chain up to `max_retries + 1` times with a fixed pause
//! between attempts. Every error is retried; there is no backoff growth and no
//! jitter. The pause is an async sleep, so only the retrying request waits.

use crate::config::RetryConfig;
use mediant_core::{Behavior, DispatchResult, Envelope, Next};

/// A behavior that re-runs a failing downstream chain.
#[derive(Debug, Clone, Copy, Default)]
pub struct Retry {
    config: RetryConfig,
}

impl Retry {
    /// Create a retry behavior.
    pub const fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }
}

impl Behavior for Retry {
    async fn handle(&self, envelope: &Envelope, next: Next<'_>) -> DispatchResult {
        let mut attempt: u32 = 1;
        loop {
            match next.run(envelope).await {
                Ok(response) => return Ok(response),
                Err(err) if attempt <= self.config.max_retries => {
                    tracing::warn!(
                        request = envelope.type_name(),
                        attempt,
                        error = %err,
                        "attempt failed, retrying"
                    );
                    tokio::time::sleep(self.config.delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    if self.config.max_retries > 0 {
                        tracing::error!(
                            request = envelope.type_name(),
                            attempts = attempt,
                            error = %err,
                            "retries exhausted"
                        );
                    }
                    return Err(err);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        pipeline::PipelineBuilder,
        testing::{FlakyHandler, TestFailure},
    };
    use mediant_core::{HandlerAdapter, Request};
    use std::time::Duration;

    #[derive(Clone)]
    struct Fetch;
    impl Request for Fetch {
        type Response = &'static str;
    }

    fn retry(max_retries: u32, delay: Duration) -> Retry {
        Retry::new(RetryConfig::new(max_retries, delay))
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_after_failures() {
        let pipeline = PipelineBuilder::new()
            .behavior(retry(3, Duration::from_millis(500)))
            .build();
        let flaky = FlakyHandler::<Fetch>::new(2, |_| "ok");
        let handler = HandlerAdapter::<Fetch, _>::new(flaky.clone());

        let started = tokio::time::Instant::now();
        let response = pipeline.run(&Envelope::new(Fetch), &handler).await.unwrap();

        assert_eq!(*response.downcast::<&'static str>().unwrap(), "ok");
        assert_eq!(flaky.calls(), 3);
        assert!(started.elapsed() >= Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausts_attempts() {
        let pipeline = PipelineBuilder::new()
            .behavior(retry(3, Duration::from_millis(100)))
            .build();
        let flaky = FlakyHandler::<Fetch>::always_failing();
        let handler = HandlerAdapter::<Fetch, _>::new(flaky.clone());

        let err = pipeline.run(&Envelope::new(Fetch), &handler).await.unwrap_err();

        assert_eq!(flaky.calls(), 4);
        assert_eq!(
            err.downcast_handler_ref::<TestFailure>(),
            Some(&TestFailure { call: 4 })
        );
    }

    #[tokio::test]
    async fn test_zero_retries_calls_once() {
        let pipeline = PipelineBuilder::new()
            .behavior(retry(0, Duration::from_secs(60)))
            .build();
        let flaky = FlakyHandler::<Fetch>::always_failing();
        let handler = HandlerAdapter::<Fetch, _>::new(flaky.clone());

        assert!(pipeline.run(&Envelope::new(Fetch), &handler).await.is_err());
        assert_eq!(flaky.calls(), 1);
    }

    #[tokio::test]
    async fn test_first_success_is_not_repeated() {
        let pipeline = PipelineBuilder::new()
            .behavior(retry(3, Duration::from_secs(60)))
            .build();
        let flaky = FlakyHandler::<Fetch>::new(0, |_| "fast");
        let handler = HandlerAdapter::<Fetch, _>::new(flaky.clone());

        pipeline.run(&Envelope::new(Fetch), &handler).await.unwrap();
        assert_eq!(flaky.calls(), 1);
    }
}
