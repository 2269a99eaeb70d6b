use prometheus::{IntCounter, IntCounterVec, IntGauge, Opts, Registry};

// ============================================================================
// Metrics - Prometheus counters for the pipeline
// ============================================================================
//
// Covers each stage: publishes (success/failure), consumed messages,
// duplicates suppressed, and malformed messages skipped. Scraped via the
// /metrics route on the main HTTP server.
//
// ============================================================================

pub struct Metrics {
    registry: Registry,

    pub events_published: IntCounterVec,
    pub publish_failures: IntCounter,
    pub events_consumed: IntCounter,
    pub duplicates_skipped: IntCounter,
    pub malformed_messages: IntCounter,
    pub store_size: IntGauge,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let events_published = IntCounterVec::new(
            Opts::new("events_published_total", "Events published to the broker"),
            &["event_type"],
        )?;
        registry.register(Box::new(events_published.clone()))?;

        let publish_failures = IntCounter::new(
            "publish_failures_total",
            "Publish attempts that failed or were rejected by the circuit breaker",
        )?;
        registry.register(Box::new(publish_failures.clone()))?;

        let events_consumed = IntCounter::new(
            "events_consumed_total",
            "Messages received and deserialized by the consumer loop",
        )?;
        registry.register(Box::new(events_consumed.clone()))?;

        let duplicates_skipped = IntCounter::new(
            "duplicates_skipped_total",
            "Redelivered events suppressed by the duplicate check",
        )?;
        registry.register(Box::new(duplicates_skipped.clone()))?;

        let malformed_messages = IntCounter::new(
            "malformed_messages_total",
            "Messages that failed to deserialize and were skipped",
        )?;
        registry.register(Box::new(malformed_messages.clone()))?;

        let store_size = IntGauge::new("event_store_size", "Events currently in the store")?;
        registry.register(Box::new(store_size.clone()))?;

        Ok(Self {
            registry,
            events_published,
            publish_failures,
            events_consumed,
            duplicates_skipped,
            malformed_messages,
            store_size,
        })
    }

    /// Registry for the /metrics exposition endpoint.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}
