//! Circuit breaker, retry and timeout behind a real mediator.

mod common;

use common::{CreateOrderCommand, GetOrderQuery, OrderCreated, OrderHandler, ServiceDown};
use mediant::{
    BoxError, CircuitBreaker, CircuitBreakerConfig, CircuitState, Handler, Mediator,
    MediatorConfig, MediatorError, Request, Retry, RetryConfig, TimeoutBehavior,
};
use std::{
    sync::{Arc, OnceLock},
    time::Duration,
};
use tokio::time::Instant;

fn breaker(threshold: u32, reset: Duration) -> CircuitBreaker {
    CircuitBreaker::new(CircuitBreakerConfig::new(threshold, reset))
}

fn retry(max_retries: u32, delay: Duration) -> Retry {
    Retry::new(RetryConfig::new(max_retries, delay))
}

#[tokio::test(start_paused = true)]
async fn test_retry_recovers_from_transient_failures() {
    let orders = OrderHandler::failing_first(2);
    let mediator = Mediator::builder()
        .behavior(retry(2, Duration::from_millis(500)))
        .handler::<CreateOrderCommand, _>(orders.clone())
        .build()
        .unwrap();

    let started = Instant::now();
    let created = mediator.send(CreateOrderCommand::new("1")).await.unwrap();

    assert_eq!(created, OrderCreated { id: "1".into() });
    assert_eq!(orders.calls(), 3);
    assert!(started.elapsed() >= Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn test_retry_returns_last_failure() {
    let orders = OrderHandler::always_failing();
    let mediator = Mediator::builder()
        .behavior(retry(3, Duration::from_millis(10)))
        .handler::<CreateOrderCommand, _>(orders.clone())
        .build()
        .unwrap();

    let err = mediator.send(CreateOrderCommand::new("1")).await.unwrap_err();

    assert!(err.downcast_handler_ref::<ServiceDown>().is_some());
    assert_eq!(orders.calls(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_breaker_opens_then_recovers() {
    let breaker = breaker(3, Duration::from_secs(30));
    let orders = OrderHandler::failing_first(3);
    let mediator = Mediator::builder()
        .behavior(breaker.clone())
        .handler::<CreateOrderCommand, _>(orders.clone())
        .build()
        .unwrap();

    for _ in 0..3 {
        let err = mediator.send(CreateOrderCommand::new("1")).await.unwrap_err();
        assert!(err.downcast_handler_ref::<ServiceDown>().is_some());
    }
    assert_eq!(breaker.state(), CircuitState::Open);

    let err = mediator.send(CreateOrderCommand::new("1")).await.unwrap_err();
    assert!(matches!(err, MediatorError::CircuitOpen));
    assert_eq!(orders.calls(), 3);

    tokio::time::advance(Duration::from_secs(30)).await;
    mediator.send(CreateOrderCommand::new("1")).await.unwrap();

    assert_eq!(orders.calls(), 4);
    assert_eq!(breaker.state(), CircuitState::Closed);
    assert_eq!(breaker.failure_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_breaker_rejects_fast_before_reset() {
    let orders = OrderHandler::always_failing();
    let mediator = Mediator::builder()
        .behavior(breaker(2, Duration::from_secs(60)))
        .handler::<CreateOrderCommand, _>(orders.clone())
        .build()
        .unwrap();

    for _ in 0..2 {
        let err = mediator.send(CreateOrderCommand::new("1")).await.unwrap_err();
        assert!(!err.is_circuit_open());
    }
    let err = mediator.send(CreateOrderCommand::new("1")).await.unwrap_err();

    assert!(err.is_circuit_open());
    assert_eq!(orders.calls(), 2);
}

#[tokio::test]
async fn test_missing_handler_is_not_counted_by_breaker() {
    let breaker = breaker(1, Duration::from_secs(60));
    let mediator = Mediator::builder()
        .behavior(breaker.clone())
        .behavior(retry(5, Duration::from_secs(60)))
        .build()
        .unwrap();

    let err = mediator.send(CreateOrderCommand::new("1")).await.unwrap_err();

    assert!(err.is_handler_not_found());
    assert_eq!(breaker.state(), CircuitState::Closed);
}

#[tokio::test(start_paused = true)]
async fn test_config_puts_retry_inside_breaker() {
    let orders = OrderHandler::always_failing();
    let config = MediatorConfig::from_json(
        r#"{
            "logging": true,
            "timing": true,
            "circuit_breaker": { "failure_threshold": 1, "reset_timeout_ms": 60000 },
            "retry": { "max_retries": 2, "delay_ms": 5 }
        }"#,
    )
    .unwrap();
    let mediator = Mediator::builder()
        .with_config(config)
        .handler::<CreateOrderCommand, _>(orders.clone())
        .build()
        .unwrap();
    assert_eq!(mediator.pipeline().len(), 4);

    let err = mediator.send(CreateOrderCommand::new("1")).await.unwrap_err();
    assert!(err.downcast_handler_ref::<ServiceDown>().is_some());
    assert_eq!(orders.calls(), 3);

    let err = mediator.send(CreateOrderCommand::new("1")).await.unwrap_err();
    assert!(err.is_circuit_open());
    assert_eq!(orders.calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_timeout_fails_slow_handler() {
    let mediator = Mediator::builder()
        .behavior(TimeoutBehavior::millis(100))
        .handler::<CreateOrderCommand, _>(|request: CreateOrderCommand| async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, BoxError>(OrderCreated { id: request.id })
        })
        .build()
        .unwrap();

    let err = mediator.send(CreateOrderCommand::new("1")).await.unwrap_err();

    assert!(matches!(err, MediatorError::Timeout(d) if d == Duration::from_millis(100)));
}

/// Retry(max=2) over a handler failing twice, then a breaker with threshold 2
/// over a handler that always fails.
#[tokio::test(start_paused = true)]
async fn test_order_scenario() {
    let plain = Mediator::builder()
        .handler::<CreateOrderCommand, _>(OrderHandler::default())
        .build()
        .unwrap();
    assert_eq!(
        plain.send(CreateOrderCommand::new("1")).await.unwrap(),
        OrderCreated { id: "1".into() }
    );

    let flaky = OrderHandler::failing_first(2);
    let retried = Mediator::builder()
        .behavior(Retry::new(RetryConfig {
            max_retries: 2,
            ..RetryConfig::default()
        }))
        .handler::<CreateOrderCommand, _>(flaky.clone())
        .build()
        .unwrap();
    assert_eq!(
        retried.send(CreateOrderCommand::new("1")).await.unwrap(),
        OrderCreated { id: "1".into() }
    );
    assert_eq!(flaky.calls(), 3);

    let broken = OrderHandler::always_failing();
    let guarded = Mediator::builder()
        .behavior(CircuitBreaker::new(CircuitBreakerConfig {
            failure_threshold: 2,
            ..CircuitBreakerConfig::default()
        }))
        .handler::<CreateOrderCommand, _>(broken.clone())
        .build()
        .unwrap();
    for _ in 0..2 {
        let err = guarded.send(CreateOrderCommand::new("1")).await.unwrap_err();
        assert!(err.downcast_handler_ref::<ServiceDown>().is_some());
    }
    let err = guarded.send(CreateOrderCommand::new("1")).await.unwrap_err();
    assert!(err.is_circuit_open());
    assert_eq!(broken.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_retry_delay_does_not_block_other_requests() {
    let orders = OrderHandler::always_failing();
    let mediator = Mediator::builder()
        .behavior(retry(3, Duration::from_secs(1)))
        .handler::<CreateOrderCommand, _>(orders.clone())
        .handler::<GetOrderQuery, _>(|_: GetOrderQuery| async { Ok::<_, BoxError>(Some(1u32)) })
        .build()
        .unwrap();

    let retrying = {
        let mediator = mediator.clone();
        tokio::spawn(async move { mediator.send(CreateOrderCommand::new("1")).await })
    };
    tokio::task::yield_now().await;
    assert_eq!(orders.calls(), 1);

    let started = Instant::now();
    let found = mediator.send(GetOrderQuery { id: "1".into() }).await.unwrap();

    assert_eq!(found, Some(1));
    assert!(started.elapsed() < Duration::from_secs(1));
    assert!(!retrying.is_finished());

    let err = retrying.await.unwrap().unwrap_err();
    assert!(err.downcast_handler_ref::<ServiceDown>().is_some());
    assert_eq!(orders.calls(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_failures_respect_threshold() {
    const THRESHOLD: u32 = 4;
    let breaker = breaker(THRESHOLD, Duration::from_secs(30));
    let orders = OrderHandler::always_failing();
    let mediator = Mediator::builder()
        .behavior(breaker.clone())
        .handler::<CreateOrderCommand, _>(orders.clone())
        .build()
        .unwrap();

    let sends: Vec<_> = (0..THRESHOLD)
        .map(|i| {
            let mediator = mediator.clone();
            tokio::spawn(async move { mediator.send(CreateOrderCommand::new(&i.to_string())).await })
        })
        .collect();
    for send in sends {
        let err = send.await.unwrap().unwrap_err();
        assert!(err.downcast_handler_ref::<ServiceDown>().is_some());
    }

    assert_eq!(orders.calls(), THRESHOLD as usize);
    assert_eq!(breaker.state(), CircuitState::Open);
    assert_eq!(breaker.failure_count(), THRESHOLD);

    let err = mediator.send(CreateOrderCommand::new("late")).await.unwrap_err();
    assert!(err.is_circuit_open());
    assert_eq!(orders.calls(), THRESHOLD as usize);
}

#[derive(Clone, Debug)]
struct PlaceOrder {
    id: String,
}

impl Request for PlaceOrder {
    type Response = OrderCreated;
}

/// Places an order by sending the underlying command through the same mediator.
struct PlaceOrderHandler {
    mediator: Arc<OnceLock<Mediator>>,
}

impl Handler<PlaceOrder> for PlaceOrderHandler {
    async fn handle(&self, request: &PlaceOrder) -> Result<OrderCreated, BoxError> {
        let mediator = self.mediator.get().ok_or("mediator not built")?;
        Ok(mediator.send(CreateOrderCommand::new(&request.id)).await?)
    }
}

#[tokio::test(start_paused = true)]
async fn test_nested_send_through_breaker() {
    let slot = Arc::new(OnceLock::new());
    let breaker = CircuitBreaker::default();
    let mediator = Mediator::builder()
        .behavior(breaker.clone())
        .handler::<PlaceOrder, _>(PlaceOrderHandler {
            mediator: slot.clone(),
        })
        .handler::<CreateOrderCommand, _>(OrderHandler::default())
        .build()
        .unwrap();
    assert!(slot.set(mediator.clone()).is_ok());

    let created = tokio::time::timeout(
        Duration::from_secs(2),
        mediator.send(PlaceOrder { id: "9".into() }),
    )
    .await
    .expect("nested send completes")
    .unwrap();

    assert_eq!(created, OrderCreated { id: "9".into() });
    assert_eq!(breaker.state(), CircuitState::Closed);
}
