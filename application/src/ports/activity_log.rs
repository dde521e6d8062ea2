//! Port for structured activity logging.
//!
//! Defines the [`ActivityLogger`] trait for recording lifecycle events
//! (run created, answer recorded, run completed, blueprint saved, mirror
//! failures) to a machine-readable log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostics, while this port captures the event history
//! as records (JSONL).

use serde_json::Value;

/// A structured activity event.
pub struct ActivityEvent {
    /// Event type identifier (e.g., "run_created", "answer_recorded").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl ActivityEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging activity events.
///
/// `log` is synchronous and infallible: a logging failure must not
/// disturb the survey flow.
pub trait ActivityLogger: Send + Sync {
    fn log(&self, event: ActivityEvent);
}

/// No-op implementation for tests and when the activity log is disabled.
pub struct NoActivityLog;

impl ActivityLogger for NoActivityLog {
    fn log(&self, _event: ActivityEvent) {}
}
