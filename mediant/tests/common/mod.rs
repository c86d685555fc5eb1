#![allow(dead_code)]

use mediant::{BoxError, Event, Handler, Request};
use serde::{Deserialize, Serialize};
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};
use thiserror::Error;

/// Install a fmt subscriber once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ============================================================================
// Test Requests
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
pub struct CreateOrderCommand {
    pub id: String,
}

impl CreateOrderCommand {
    pub fn new(id: &str) -> Self {
        Self { id: id.to_owned() }
    }
}

impl Request for CreateOrderCommand {
    type Response = OrderCreated;
}

#[derive(Clone, Debug)]
pub struct GetOrderQuery {
    pub id: String,
}

impl Request for GetOrderQuery {
    type Response = Option<u32>;
}

#[derive(Clone, Debug)]
pub struct Unrouted;

impl Request for Unrouted {
    type Response = ();
}

// ============================================================================
// Test Handlers
// ============================================================================

#[derive(Debug, Error)]
#[error("order service unavailable")]
pub struct ServiceDown;

/// Fails its first `failures` calls, then answers with `OrderCreated`.
///
/// Clones share the call counter.
#[derive(Clone, Default)]
pub struct OrderHandler {
    calls: Arc<AtomicUsize>,
    failures: usize,
}

impl OrderHandler {
    pub fn failing_first(failures: usize) -> Self {
        Self {
            failures,
            ..Self::default()
        }
    }

    pub fn always_failing() -> Self {
        Self::failing_first(usize::MAX)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Handler<CreateOrderCommand> for OrderHandler {
    async fn handle(&self, request: &CreateOrderCommand) -> Result<OrderCreated, BoxError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call <= self.failures {
            return Err(Box::new(ServiceDown));
        }
        Ok(OrderCreated {
            id: request.id.clone(),
        })
    }
}

// ============================================================================
// Test Events
// ============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderCreated {
    pub id: String,
}

impl Event for OrderCreated {
    fn name(&self) -> &str {
        "order.created"
    }
}
