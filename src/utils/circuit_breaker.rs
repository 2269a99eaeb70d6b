use std::time::{Duration, Instant};

use tokio::sync::Mutex;

// ============================================================================
// Circuit Breaker
// ============================================================================
//
// Guards the broker producer: after enough consecutive publish failures the
// circuit opens and further publishes fail immediately instead of stacking up
// send timeouts. After a cool-down the circuit half-opens and a few probe
// calls decide whether it closes again.
//
// This is fail-fast protection, not a retry mechanism; a rejected or failed
// call is still surfaced to the caller.
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Clone)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures that open the circuit.
    pub failure_threshold: u32,
    /// Cool-down before a half-open probe is allowed.
    pub cooldown: Duration,
    /// Successful probes required to close again.
    pub success_threshold: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            cooldown: Duration::from_secs(30),
            success_threshold: 3,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CircuitBreakerError<E> {
    #[error("circuit is open, call rejected")]
    CircuitOpen,

    #[error("{0}")]
    Inner(E),
}

struct Tracker {
    state: CircuitState,
    failures: u32,
    probe_successes: u32,
    opened_at: Option<Instant>,
}

pub struct CircuitBreaker {
    tracker: Mutex<Tracker>,
    config: CircuitBreakerConfig,
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            tracker: Mutex::new(Tracker {
                state: CircuitState::Closed,
                failures: 0,
                probe_successes: 0,
                opened_at: None,
            }),
            config,
        }
    }

    /// Run `operation` if the circuit allows it, recording the outcome.
    pub async fn call<F, T, E>(&self, operation: F) -> Result<T, CircuitBreakerError<E>>
    where
        F: std::future::Future<Output = Result<T, E>>,
    {
        if !self.admit().await {
            return Err(CircuitBreakerError::CircuitOpen);
        }

        match operation.await {
            Ok(value) => {
                self.on_success().await;
                Ok(value)
            }
            Err(err) => {
                self.on_failure().await;
                Err(CircuitBreakerError::Inner(err))
            }
        }
    }

    pub async fn state(&self) -> CircuitState {
        self.tracker.lock().await.state
    }

    async fn admit(&self) -> bool {
        let mut tracker = self.tracker.lock().await;

        if tracker.state == CircuitState::Open {
            let cooled_down = tracker
                .opened_at
                .map(|t| t.elapsed() >= self.config.cooldown)
                .unwrap_or(true);
            if !cooled_down {
                return false;
            }
            tracing::info!("circuit breaker half-open, probing broker");
            tracker.state = CircuitState::HalfOpen;
            tracker.probe_successes = 0;
        }

        true
    }

    async fn on_success(&self) {
        let mut tracker = self.tracker.lock().await;

        match tracker.state {
            CircuitState::HalfOpen => {
                tracker.probe_successes += 1;
                if tracker.probe_successes >= self.config.success_threshold {
                    tracing::info!("circuit breaker closed after successful probes");
                    tracker.state = CircuitState::Closed;
                    tracker.failures = 0;
                    tracker.opened_at = None;
                }
            }
            _ => tracker.failures = 0,
        }
    }

    async fn on_failure(&self) {
        let mut tracker = self.tracker.lock().await;

        tracker.failures += 1;
        match tracker.state {
            CircuitState::Closed if tracker.failures >= self.config.failure_threshold => {
                tracing::warn!(failures = tracker.failures, "circuit breaker opened");
                tracker.state = CircuitState::Open;
                tracker.opened_at = Some(Instant::now());
            }
            CircuitState::HalfOpen => {
                tracing::warn!("probe failed, circuit breaker reopened");
                tracker.state = CircuitState::Open;
                tracker.opened_at = Some(Instant::now());
            }
            _ => {}
        }
    }
}
