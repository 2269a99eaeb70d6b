use std::env;

// ============================================================================
// Configuration
// ============================================================================

/// Topic every published event lands on.
pub const EVENTS_TOPIC: &str = "user-activity-events";

/// Consumer group for the single consumer loop instance.
pub const CONSUMER_GROUP: &str = "user-activity-consumer-group";

#[derive(Debug, Clone)]
pub struct Config {
    /// Comma-separated Kafka bootstrap servers.
    pub kafka_brokers: String,
    /// HTTP listening port.
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables, falling back to the
    /// documented defaults. A `.env` file is honored when present.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        Self {
            kafka_brokers: env::var("KAFKA_BROKERS").unwrap_or_else(|_| "kafka:29092".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single test because std::env is process-global and cargo runs tests
    // in parallel.
    #[test]
    fn test_env_loading() {
        env::remove_var("KAFKA_BROKERS");
        env::remove_var("PORT");

        let config = Config::from_env();
        assert_eq!(config.kafka_brokers, "kafka:29092");
        assert_eq!(config.port, 3000);

        env::set_var("KAFKA_BROKERS", "localhost:9092");
        env::set_var("PORT", "not-a-port");

        let config = Config::from_env();
        assert_eq!(config.kafka_brokers, "localhost:9092");
        assert_eq!(config.port, 3000);

        env::remove_var("KAFKA_BROKERS");
        env::remove_var("PORT");
    }
}
