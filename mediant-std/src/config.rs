//! Configuration for the standard behaviors.
//!
//! All structs deserialize with `serde` and fall back to defaults for missing
//! fields. Durations are written in milliseconds:
//!
//! ```json
//! {
//!   "logging": true,
//!   "circuit_breaker": { "failure_threshold": 3, "reset_timeout_ms": 10000 },
//!   "retry": { "max_retries": 2, "delay_ms": 250 }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Parameters of the retry behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Extra attempts after the first one.
    pub max_retries: u32,
    /// Fixed pause between attempts.
    #[serde(rename = "delay_ms", with = "duration_ms")]
    pub delay: Duration,
}

impl RetryConfig {
    /// Create a retry configuration.
    pub const fn new(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    /// Total number of attempts, the first one included.
    pub const fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(500))
    }
}

/// Parameters of the circuit breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures that open the circuit. Values below 1 act as 1.
    pub failure_threshold: u32,
    /// Cool-down before an open circuit lets a trial call through.
    #[serde(rename = "reset_timeout_ms", with = "duration_ms")]
    pub reset_timeout: Duration,
}

impl CircuitBreakerConfig {
    /// Create a breaker configuration.
    pub const fn new(failure_threshold: u32, reset_timeout: Duration) -> Self {
        Self {
            failure_threshold,
            reset_timeout,
        }
    }

    pub(crate) fn threshold(&self) -> u32 {
        self.failure_threshold.max(1)
    }
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self::new(5, Duration::from_secs(30))
    }
}

/// Which standard behaviors a mediator installs, and with what parameters.
///
/// Installed behaviors are ordered outermost first: logging, timing, circuit
/// breaker, retry. Retries therefore happen inside the breaker, which sees a
/// request as failed only once every attempt has failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediatorConfig {
    /// Install [`LoggingBehavior`](crate::behaviors::LoggingBehavior).
    pub logging: bool,
    /// Install [`TimingBehavior`](crate::behaviors::TimingBehavior).
    pub timing: bool,
    /// Install a [`CircuitBreaker`](crate::behaviors::CircuitBreaker).
    pub circuit_breaker: Option<CircuitBreakerConfig>,
    /// Install a [`Retry`](crate::behaviors::Retry).
    pub retry: Option<RetryConfig>,
}

impl MediatorConfig {
    /// Parse a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Read a configuration from any JSON source.
    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self, serde_json::Error> {
        serde_json::from_reader(reader)
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let millis = u64::try_from(value.as_millis()).unwrap_or(u64::MAX);
        serializer.serialize_u64(millis)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
