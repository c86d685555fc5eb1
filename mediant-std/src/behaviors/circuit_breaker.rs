//! Circuit breaker behavior.
//!
//! # States
//! - Closed: requests pass through
//! - Open: requests fail fast with [`MediatorError::CircuitOpen`]
//! - Half-Open: requests are let through as trial calls
//!
//! # State Transitions
//! ```text
//! Closed   → Open:     consecutive failures >= threshold
//! Open     → HalfOpen: reset timeout elapsed since the last failure (checked lazily on the next call)
//! HalfOpen → Closed:   trial call succeeds (failure count back to 0)
//! HalfOpen → Open:     trial call fails (failure count still >= threshold)
//! HalfOpen → Open:     trial call abandoned before completing (cool-down restarts)
//! ```
//!
//! One breaker guards every request that flows through it, whatever its type.
//! The lock covers admission and the outcome update but is released while the
//! downstream chain runs, so a handler may send nested requests through the
//! same breaker.

use crate::config::CircuitBreakerConfig;
use mediant_core::{Behavior, DispatchResult, Envelope, MediatorError, Next};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::time::Instant;

/// State of a [`CircuitBreaker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Requests pass through.
    Closed,
    /// Requests are rejected until the reset timeout elapses.
    Open,
    /// Requests are trial calls; the first outcome decides the next state.
    HalfOpen,
}

#[derive(Debug)]
struct BreakerState {
    state: CircuitState,
    failures: u32,
    last_failure: Option<Instant>,
}

/// A behavior that stops calling a failing downstream for a cool-down period.
///
/// Clones share the same state, so a clone kept outside the pipeline can be
/// used to observe the breaker.
#[derive(Clone)]
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    inner: Arc<Mutex<BreakerState>>,
}

impl CircuitBreaker {
    /// Create a closed breaker.
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            inner: Arc::new(Mutex::new(BreakerState {
                state: CircuitState::Closed,
                failures: 0,
                last_failure: None,
            })),
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    /// Current state.
    ///
    /// An open breaker whose timeout has elapsed still reports `Open` until a
    /// request arrives.
    pub fn state(&self) -> CircuitState {
        self.lock().state
    }

    /// Consecutive failures recorded so far.
    pub fn failure_count(&self) -> u32 {
        self.lock().failures
    }

    fn lock(&self) -> MutexGuard<'_, BreakerState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Decide whether a request arriving at `now` may run.
    ///
    /// Returns `true` when the request is the trial call that moved the circuit
    /// from open to half-open.
    fn admit(&self, envelope: &Envelope, now: Instant) -> Result<bool, MediatorError> {
        let mut guard = self.lock();
        if guard.state != CircuitState::Open {
            return Ok(false);
        }

        let cooled_down = guard
            .last_failure
            .is_none_or(|at| now.saturating_duration_since(at) >= self.config.reset_timeout);
        if !cooled_down {
            tracing::debug!(request = envelope.type_name(), "circuit open, rejecting");
            return Err(MediatorError::CircuitOpen);
        }
        guard.state = CircuitState::HalfOpen;
        tracing::info!(
            request = envelope.type_name(),
            "circuit half-open, letting a trial call through"
        );
        Ok(true)
    }

    fn record(&self, envelope: &Envelope, result: &DispatchResult, started: Instant) {
        let mut guard = self.lock();
        match result {
            Ok(_) => {
                if guard.state != CircuitState::Closed {
                    tracing::info!("circuit closed");
                }
                guard.failures = 0;
                guard.state = CircuitState::Closed;
            }
            Err(err) => {
                guard.failures = guard.failures.saturating_add(1);
                guard.last_failure = Some(started);
                if guard.failures >= self.config.threshold() {
                    if guard.state != CircuitState::Open {
                        tracing::warn!(
                            request = envelope.type_name(),
                            failures = guard.failures,
                            error = %err,
                            "circuit opened"
                        );
                    }
                    guard.state = CircuitState::Open;
                }
            }
        }
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(CircuitBreakerConfig::default())
    }
}

impl std::fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Reopens the circuit if a half-open trial call is dropped before its
/// outcome is recorded.
struct TrialGuard<'a> {
    breaker: &'a CircuitBreaker,
    armed: bool,
}

impl Drop for TrialGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut guard = self.breaker.lock();
        if guard.state == CircuitState::HalfOpen {
            guard.state = CircuitState::Open;
            guard.last_failure = Some(Instant::now());
            tracing::warn!("trial call abandoned, circuit reopened");
        }
    }
}

impl Behavior for CircuitBreaker {
    async fn handle(&self, envelope: &Envelope, next: Next<'_>) -> DispatchResult {
        let started = Instant::now();
        let is_trial = self.admit(envelope, started)?;

        let mut trial = TrialGuard {
            breaker: self,
            armed: is_trial,
        };
        let result = next.run(envelope).await;
        trial.armed = false;

        self.record(envelope, &result, started);
        result
    }
}
