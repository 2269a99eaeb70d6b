use crate::models::UserEvent;

// ============================================================================
// Duplicate Detector
// ============================================================================
//
// The broker gives at-least-once delivery, so the same event can arrive more
// than once. This predicate is the application-level guard that keeps
// redelivery from becoming a duplicate *effect* in the store.
//
// Identifier equality is exact string equality, no normalization. The scan is
// linear over the accepted history, which is fine at the in-memory scale this
// service targets; a set-backed index keyed by event_id is the drop-in
// replacement if lookup cost ever matters.
//
// ============================================================================

/// True iff some previously accepted event carries this `event_id`.
pub fn is_duplicate(event_id: &str, history: &[UserEvent]) -> bool {
    history.iter().any(|event| event.event_id == event_id)
}
