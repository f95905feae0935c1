//! Cursor tracking for incremental sync
//!
//! A [`CursorTracker`] derives the watermark for one sync invocation: it is
//! seeded with the host-persisted prior state, observes every yielded record,
//! and checkpoints the maximum cursor value seen.

use super::types::StreamState;
use serde_json::Value;
use std::cmp::Ordering;

/// Compare two cursor values.
///
/// Numbers compare numerically (unix-timestamp cursors), everything else by
/// canonical string form (ISO-8601 strings order correctly). Mixing a numeric
/// and a string cursor within one stream falls back to string comparison.
pub fn compare_cursors(a: &Value, b: &Value) -> Ordering {
    if let (Some(x), Some(y)) = (a.as_f64(), b.as_f64()) {
        return x.partial_cmp(&y).unwrap_or(Ordering::Equal);
    }
    canonical(a).cmp(&canonical(b))
}

fn canonical(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn max_cursor(a: Option<Value>, b: Option<&Value>) -> Option<Value> {
    match (a, b) {
        (Some(a), Some(b)) => {
            if compare_cursors(&a, b) == Ordering::Less {
                Some(b.clone())
            } else {
                Some(a)
            }
        }
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b.clone()),
        (None, None) => None,
    }
}

/// Tracks the watermark of a single stream during one sync invocation.
///
/// The effective start is `max(configured_start, seeded_cursor)`: resuming
/// never moves backward past an explicit configured start, and a later
/// persisted cursor always wins over static config. A sync that yields zero
/// records checkpoints the unchanged effective start.
#[derive(Debug, Clone)]
pub struct CursorTracker {
    /// Record field holding the cursor value
    cursor_field: String,
    /// Effective start watermark (config start, raised by seeding)
    floor: Option<Value>,
    /// Maximum cursor value observed among yielded records
    observed: Option<Value>,
}

impl CursorTracker {
    /// Create a tracker for a cursor field with an optional configured start
    pub fn new(cursor_field: impl Into<String>, configured_start: Option<Value>) -> Self {
        Self {
            cursor_field: cursor_field.into(),
            floor: configured_start.filter(|v| !v.is_null()),
            observed: None,
        }
    }

    /// The record field this tracker watches
    pub fn cursor_field(&self) -> &str {
        &self.cursor_field
    }

    /// Seed with the host-persisted prior state, called once before a sync
    pub fn seed(&mut self, prior: Option<&Value>) {
        if let Some(value) = prior.filter(|v| !v.is_null()) {
            self.floor = max_cursor(self.floor.take(), Some(value));
        }
    }

    /// The watermark the first page request filters from
    pub fn effective_start(&self) -> Option<&Value> {
        self.floor.as_ref()
    }

    /// Observe a yielded record, advancing the tracked maximum
    pub fn observe(&mut self, record: &Value) {
        let Some(value) = record.get(&self.cursor_field).filter(|v| !v.is_null()) else {
            return;
        };
        self.observed = max_cursor(self.observed.take(), Some(value));
    }

    /// Current checkpoint value: the maximum observed, never below the
    /// effective start; `None` only when neither exists.
    pub fn checkpoint(&self) -> Option<Value> {
        max_cursor(self.observed.clone(), self.floor.as_ref())
    }

    /// Checkpoint as persistable stream state
    pub fn state(&self) -> Option<StreamState> {
        self.checkpoint()
            .map(|cursor| StreamState::with_cursor(self.cursor_field.clone(), cursor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numeric_comparison_is_not_lexicographic() {
        // "9" > "10" as strings; as cursors 9 < 10 must hold
        assert_eq!(compare_cursors(&json!(9), &json!(10)), Ordering::Less);
        assert_eq!(
            compare_cursors(&json!(1650000100), &json!(1650000000)),
            Ordering::Greater
        );
    }

    #[test]
    fn test_string_comparison_orders_iso_timestamps() {
        assert_eq!(
            compare_cursors(
                &json!("2024-01-01T00:00:00.000Z"),
                &json!("2024-02-01T00:00:00.000Z")
            ),
            Ordering::Less
        );
    }

    #[test]
    fn test_observe_advances_maximum() {
        let mut tracker = CursorTracker::new("started_at", None);

        tracker.observe(&json!({"id": 1, "started_at": 1650000100}));
        tracker.observe(&json!({"id": 2, "started_at": 1650000000}));

        assert_eq!(tracker.checkpoint(), Some(json!(1650000100)));
    }

    #[test]
    fn test_observe_ignores_missing_cursor_field() {
        let mut tracker = CursorTracker::new("started_at", Some(json!(0)));

        tracker.observe(&json!({"id": 1}));
        tracker.observe(&json!({"id": 2, "started_at": null}));

        assert_eq!(tracker.checkpoint(), Some(json!(0)));
    }

    #[test]
    fn test_seed_prefers_later_of_config_and_state() {
        // Persisted state ahead of configured start
        let mut tracker = CursorTracker::new("started_at", Some(json!(100)));
        tracker.seed(Some(&json!(200)));
        assert_eq!(tracker.effective_start(), Some(&json!(200)));

        // Configured start ahead of stale state
        let mut tracker = CursorTracker::new("started_at", Some(json!(500)));
        tracker.seed(Some(&json!(200)));
        assert_eq!(tracker.effective_start(), Some(&json!(500)));
    }

    #[test]
    fn test_empty_sync_checkpoints_effective_start() {
        let mut tracker = CursorTracker::new("date", Some(json!("2024-01-01")));
        tracker.seed(Some(&json!("2024-03-01")));

        // No records observed
        assert_eq!(tracker.checkpoint(), Some(json!("2024-03-01")));

        let state = tracker.state().unwrap();
        assert_eq!(state.cursor, Some(json!("2024-03-01")));
        assert_eq!(state.cursor_field, Some("date".to_string()));
    }

    #[test]
    fn test_checkpoint_never_drops_below_floor() {
        let mut tracker = CursorTracker::new("started_at", Some(json!(1000)));
        tracker.observe(&json!({"started_at": 500}));

        assert_eq!(tracker.checkpoint(), Some(json!(1000)));
    }

    #[test]
    fn test_checkpoint_none_without_floor_or_records() {
        let tracker = CursorTracker::new("date", None);
        assert_eq!(tracker.checkpoint(), None);
        assert!(tracker.state().is_none());
    }

    #[test]
    fn test_seed_null_is_ignored() {
        let mut tracker = CursorTracker::new("date", Some(json!(42)));
        tracker.seed(Some(&Value::Null));
        assert_eq!(tracker.effective_start(), Some(&json!(42)));
    }
}
