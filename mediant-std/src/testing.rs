//! Testing utilities for Mediant.
//!
//! - [`OrderLog`]: A shared log for asserting the order things ran in
//! - [`RecordingBehavior`]: A behavior that logs when it enters and exits
//! - [`FlakyHandler`]: A handler that fails a fixed number of times, then succeeds
//! - [`RecordingEventHandler`]: A subscriber that records events and can be awaited
//! - [`FailingEventHandler`]: A subscriber that always fails

use mediant_core::{
    Behavior, BoxError, DispatchResult, Envelope, Event, EventHandler, Handler, Next, Request,
};
use std::{
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};
use thiserror::Error;
use tokio::sync::Notify;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The error produced by test doubles that are told to fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("intentional failure (call {call})")]
pub struct TestFailure {
    /// 1-based index of the failing call.
    pub call: usize,
}

// ============================================================================
// Order Log
// ============================================================================

/// A cloneable, shared list of labels.
#[derive(Debug, Clone, Default)]
pub struct OrderLog(Arc<Mutex<Vec<String>>>);

impl OrderLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a label.
    pub fn push(&self, entry: impl Into<String>) {
        lock(&self.0).push(entry.into());
    }

    /// Get a copy of every label so far.
    pub fn entries(&self) -> Vec<String> {
        lock(&self.0).clone()
    }

    /// Clear the log.
    pub fn clear(&self) {
        lock(&self.0).clear();
    }
}

// ============================================================================
// Recording Behavior
// ============================================================================

/// A behavior that writes `"{label}-enter"` and `"{label}-exit"` around the
/// rest of the chain.
///
/// # Example
///
/// ```rust,ignore
/// let log = OrderLog::new();
/// let pipeline = PipelineBuilder::new()
///     .behavior(RecordingBehavior::new("A", log.clone()))
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct RecordingBehavior {
    label: String,
    log: OrderLog,
}

impl RecordingBehavior {
    /// Create a recording behavior writing to `log`.
    pub fn new(label: impl Into<String>, log: OrderLog) -> Self {
        Self {
            label: label.into(),
            log,
        }
    }
}

impl Behavior for RecordingBehavior {
    async fn handle(&self, envelope: &Envelope, next: Next<'_>) -> DispatchResult {
        self.log.push(format!("{}-enter", self.label));
        let result = next.run(envelope).await;
        self.log.push(format!("{}-exit", self.label));
        result
    }
}

// ============================================================================
// Flaky Handler
// ============================================================================

type Respond<R> = Arc<dyn Fn(&R) -> <R as Request>::Response + Send + Sync>;

/// A handler that fails its first `failures` calls and then answers with
/// `respond`.
///
/// Clones share the call counter.
pub struct FlakyHandler<R: Request> {
    failures: usize,
    calls: Arc<AtomicUsize>,
    respond: Option<Respond<R>>,
}

impl<R: Request> FlakyHandler<R> {
    /// Fail `failures` times, then succeed with `respond(request)`.
    pub fn new<F>(failures: usize, respond: F) -> Self
    where
        F: Fn(&R) -> R::Response + Send + Sync + 'static,
    {
        Self {
            failures,
            calls: Arc::new(AtomicUsize::new(0)),
            respond: Some(Arc::new(respond)),
        }
    }

    /// Never succeed.
    pub fn always_failing() -> Self {
        Self {
            failures: usize::MAX,
            calls: Arc::new(AtomicUsize::new(0)),
            respond: None,
        }
    }

    /// Number of times the handler was invoked.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl<R: Request> Clone for FlakyHandler<R> {
    fn clone(&self) -> Self {
        Self {
            failures: self.failures,
            calls: self.calls.clone(),
            respond: self.respond.clone(),
        }
    }
}

impl<R: Request> Handler<R> for FlakyHandler<R> {
    async fn handle(&self, request: &R) -> Result<R::Response, BoxError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        match &self.respond {
            Some(respond) if call > self.failures => Ok(respond(request)),
            _ => Err(Box::new(TestFailure { call })),
        }
    }
}

// ============================================================================
// Recording Event Handler
// ============================================================================

/// A subscriber that records every event it receives.
///
/// # Example
///
/// ```rust,ignore
/// let recorder = RecordingEventHandler::<OrderShipped>::new();
/// bus.subscribe("order.shipped", recorder.clone());
///
/// bus.publish(OrderShipped { id: 1 });
/// assert!(recorder.wait_for(1, Duration::from_secs(1)).await);
/// ```
pub struct RecordingEventHandler<E> {
    events: Arc<Mutex<Vec<E>>>,
    notify: Arc<Notify>,
    delay: Option<Duration>,
}

impl<E: Clone> RecordingEventHandler<E> {
    /// Create a recording subscriber.
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
            notify: Arc::new(Notify::new()),
            delay: None,
        }
    }

    /// Sleep for `delay` before recording each event.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Get a clone of the recorded events.
    pub fn events(&self) -> Vec<E> {
        lock(&self.events).clone()
    }

    /// Get the number of recorded events.
    pub fn count(&self) -> usize {
        lock(&self.events).len()
    }

    /// Wait until at least `count` events were recorded.
    ///
    /// Returns `false` if `timeout` elapses first.
    pub async fn wait_for(&self, count: usize, timeout: Duration) -> bool {
        let wait = async {
            while self.count() < count {
                self.notify.notified().await;
            }
        };
        tokio::time::timeout(timeout, wait).await.is_ok()
    }
}

impl<E: Clone> Default for RecordingEventHandler<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for RecordingEventHandler<E> {
    fn clone(&self) -> Self {
        Self {
            events: self.events.clone(),
            notify: self.notify.clone(),
            delay: self.delay,
        }
    }
}

impl<E: Event + Clone> EventHandler<E> for RecordingEventHandler<E> {
    async fn handle(&self, event: &E) -> Result<(), BoxError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        lock(&self.events).push(event.clone());
        self.notify.notify_one();
        Ok(())
    }
}

// ============================================================================
// Failing Event Handler
// ============================================================================

/// A subscriber that fails on every event and counts its calls.
#[derive(Debug, Clone, Default)]
pub struct FailingEventHandler {
    calls: Arc<AtomicUsize>,
}

impl FailingEventHandler {
    /// Create a failing subscriber.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of events received.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl<E: Event> EventHandler<E> for FailingEventHandler {
    async fn handle(&self, _event: &E) -> Result<(), BoxError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        Err(Box::new(TestFailure { call }))
    }
}
