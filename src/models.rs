use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

// ============================================================================
// Domain Model - User Activity Events
// ============================================================================
//
// A UserEvent is the unit of work flowing through the whole pipeline:
// submitted over HTTP, published to the broker as JSON, consumed back and
// stored. The wire form uses camelCase keys:
//
//   {eventId, userId, eventType, timestamp, payload}
//
// event_id is the idempotency key: it is assigned exactly once, at creation,
// and duplicate deliveries of the same event carry the same id.
//
// ============================================================================

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UserEvent {
    pub event_id: String,
    pub user_id: String,
    pub event_type: String,
    pub timestamp: DateTime<Utc>,
    pub payload: Value,
}

impl UserEvent {
    /// Construct a fresh event from caller-supplied fields.
    ///
    /// Assigns a new UUIDv4 `event_id` and the current UTC time. A missing
    /// payload becomes an empty JSON object. Required-field validation is the
    /// submission handler's responsibility, not the factory's.
    pub fn generate(user_id: &str, event_type: &str, payload: Option<Value>) -> Self {
        Self {
            event_id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            event_type: event_type.to_string(),
            timestamp: Utc::now(),
            payload: payload.unwrap_or_else(|| Value::Object(serde_json::Map::new())),
        }
    }
}
