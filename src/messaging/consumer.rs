use std::sync::Arc;
use std::time::Duration;

use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::message::Message;
use rdkafka::ClientConfig;
use thiserror::Error;

use crate::config::{CONSUMER_GROUP, EVENTS_TOPIC};
use crate::idempotency::is_duplicate;
use crate::metrics::Metrics;
use crate::models::UserEvent;
use crate::store::EventStore;

// ============================================================================
// Consumer Loop
// ============================================================================
//
// The single long-running consumer instance: connect, subscribe from the
// earliest retained offset (events published before this process started are
// still picked up), then receive forever. Each message is deserialized,
// checked against the store for a duplicate event_id, and appended only if
// novel. A malformed message is logged and skipped; it never stops the loop.
//
// Running exactly one instance is what serializes check-then-append; scaling
// to multiple consumers would need a compare-and-append primitive on the
// store instead.
//
// ============================================================================

#[derive(Debug, Error)]
pub enum ConsumeError {
    #[error("Kafka error: {0}")]
    Kafka(#[from] rdkafka::error::KafkaError),

    #[error("deserialization error: {0}")]
    Deserialize(#[from] serde_json::Error),
}

pub struct EventConsumer {
    consumer: StreamConsumer,
    store: Arc<EventStore>,
    metrics: Arc<Metrics>,
}

impl EventConsumer {
    /// Create the consumer and subscribe to the events topic. Failure here is
    /// fatal to process startup.
    pub fn new(
        brokers: &str,
        store: Arc<EventStore>,
        metrics: Arc<Metrics>,
    ) -> Result<Self, ConsumeError> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("group.id", CONSUMER_GROUP)
            .set("bootstrap.servers", brokers)
            .set("enable.auto.commit", "true")
            .set("session.timeout.ms", "30000")
            .set("enable.partition.eof", "false")
            .set("auto.offset.reset", "earliest")
            .create()?;

        consumer.subscribe(&[EVENTS_TOPIC])?;

        Ok(Self {
            consumer,
            store,
            metrics,
        })
    }

    /// Receive loop. Runs for the process lifetime.
    pub async fn run(&self) {
        tracing::info!(topic = EVENTS_TOPIC, group = CONSUMER_GROUP, "Consumer loop started");

        loop {
            match self.consumer.recv().await {
                Ok(msg) => {
                    let Some(payload) = msg.payload() else {
                        tracing::warn!("Received message with empty payload, skipping");
                        continue;
                    };

                    if let Err(e) = process_payload(&self.store, &self.metrics, payload).await {
                        // Per-message failure only; the loop keeps going
                        tracing::error!(error = %e, "Failed to process message, skipping");
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "Consumer receive error, backing off");
                    tokio::time::sleep(Duration::from_secs(5)).await;
                }
            }
        }
    }
}

/// Deserialize one message payload and apply it to the store, suppressing
/// duplicates. Returns whether the event was appended.
async fn process_payload(
    store: &EventStore,
    metrics: &Metrics,
    payload: &[u8],
) -> Result<bool, ConsumeError> {
    let event: UserEvent = match serde_json::from_slice(payload) {
        Ok(event) => event,
        Err(e) => {
            metrics.malformed_messages.inc();
            return Err(e.into());
        }
    };
    metrics.events_consumed.inc();

    tracing::debug!(event_id = %event.event_id, "Received event");

    // The store snapshot and the append below are only atomic as a pair
    // because this is the sole writer.
    let history = store.list().await;
    if is_duplicate(&event.event_id, &history) {
        tracing::warn!(event_id = %event.event_id, "Skipping duplicate event");
        metrics.duplicates_skipped.inc();
        return Ok(false);
    }

    tracing::info!(
        event_id = %event.event_id,
        user_id = %event.user_id,
        event_type = %event.event_type,
        "Processing event"
    );
    store.append(event).await;
    metrics.store_size.set(store.len().await as i64);

    Ok(true)
}
