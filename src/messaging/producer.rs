use anyhow::Result;
use rdkafka::{
    config::ClientConfig,
    producer::{FutureProducer, FutureRecord},
};

use crate::config::EVENTS_TOPIC;
use crate::models::UserEvent;
use crate::utils::{CircuitBreaker, CircuitBreakerConfig, CircuitBreakerError};

// ============================================================================
// Publisher - broker boundary for outbound events
// ============================================================================
//
// Owns the one producer connection for the process lifetime. Publish failures
// are surfaced to the caller (the submission handler answers 500); there is
// no internal retry, only the circuit breaker's fail-fast once the broker is
// persistently unreachable.
//
// ============================================================================

pub struct EventPublisher {
    producer: FutureProducer,
    circuit_breaker: CircuitBreaker,
}

impl EventPublisher {
    /// Create the producer. Failure here is fatal to process startup.
    pub fn new(brokers: &str) -> Result<Self> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", "5000")
            .create()?;

        Ok(Self {
            producer,
            circuit_breaker: CircuitBreaker::new(CircuitBreakerConfig::default()),
        })
    }

    /// Serialize the event as JSON and send it to the events topic, keyed by
    /// `event_id` so redeliveries of one event stay on one partition.
    pub async fn publish(&self, event: &UserEvent) -> Result<()> {
        let payload = serde_json::to_string(event)?;
        let key = event.event_id.clone();

        let result = self
            .circuit_breaker
            .call(async {
                let record = FutureRecord::to(EVENTS_TOPIC).key(&key).payload(&payload);

                self.producer
                    .send(
                        record,
                        rdkafka::util::Timeout::After(std::time::Duration::from_secs(5)),
                    )
                    .await
                    .map_err(|(e, _)| anyhow::anyhow!("Kafka send error: {}", e))?;

                Ok::<(), anyhow::Error>(())
            })
            .await;

        match result {
            Ok(()) => {
                tracing::info!(
                    event_id = %event.event_id,
                    event_type = %event.event_type,
                    topic = EVENTS_TOPIC,
                    "Published event"
                );
                Ok(())
            }
            Err(CircuitBreakerError::CircuitOpen) => {
                tracing::error!(
                    event_id = %event.event_id,
                    "Circuit breaker open, broker unavailable"
                );
                Err(anyhow::anyhow!("circuit breaker open for broker"))
            }
            Err(CircuitBreakerError::Inner(e)) => {
                tracing::error!(
                    error = %e,
                    event_id = %event.event_id,
                    "Failed to publish event"
                );
                Err(e)
            }
        }
    }
}
