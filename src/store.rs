use tokio::sync::RwLock;

use crate::models::UserEvent;

// ============================================================================
// Event Store - append-only, in-process
// ============================================================================
//
// Holds every accepted event for the lifetime of the process (volatile by
// design, no persistence across restarts). Append is unconditional: duplicate
// suppression is the consumer loop's job, not the store's. The store is
// shared as Arc<EventStore> between the HTTP handlers (readers) and the
// consumer task (sole writer); the single writer is what keeps the
// check-then-append sequence atomic without a compare-and-append primitive.
//
// ============================================================================

#[derive(Default)]
pub struct EventStore {
    events: RwLock<Vec<UserEvent>>,
}

impl EventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event. No dedup, no ordering beyond arrival order.
    pub async fn append(&self, event: UserEvent) {
        self.events.write().await.push(event);
    }

    /// Snapshot of all stored events in append order.
    pub async fn list(&self) -> Vec<UserEvent> {
        self.events.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_new_store_is_empty() {
        let store = EventStore::new();

        assert_eq!(store.len().await, 0);
        assert!(store.list().await.is_empty());
    }

    #[tokio::test]
    async fn test_list_preserves_append_order() {
        let store = EventStore::new();

        let first = UserEvent::generate("u1", "LOGIN", None);
        let second = UserEvent::generate("u2", "LOGOUT", None);
        store.append(first.clone()).await;
        store.append(second.clone()).await;

        let events = store.list().await;
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_id, first.event_id);
        assert_eq!(events[1].event_id, second.event_id);
    }

    #[tokio::test]
    async fn test_list_is_a_snapshot() {
        let store = EventStore::new();
        store.append(UserEvent::generate("u1", "LOGIN", None)).await;

        let snapshot = store.list().await;
        store.append(UserEvent::generate("u2", "LOGIN", None)).await;

        // The earlier snapshot is unaffected by later appends
        assert_eq!(snapshot.len(), 1);
        assert_eq!(store.len().await, 2);
    }
}
