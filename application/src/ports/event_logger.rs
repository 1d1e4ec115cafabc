//! Port for structured phase event logging.
//!
//! Defines the [`PhaseEventLogger`] trait for recording phase events
//! (phase start, step results, approval decisions, final result) to a
//! structured log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures an audit
//! trail in a machine-readable format (JSONL).

use serde_json::Value;

/// A structured phase event for logging.
pub struct PhaseEvent {
    /// Event type identifier (e.g., "phase_started", "step_completed").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl PhaseEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging phase events to a structured log.
///
/// `log` is synchronous and infallible; write failures are ignored by
/// implementations.
pub trait PhaseEventLogger: Send + Sync {
    fn log(&self, event: PhaseEvent);
}

/// No-op implementation for tests and when event logging is disabled.
pub struct NoPhaseEventLogger;

impl PhaseEventLogger for NoPhaseEventLogger {
    fn log(&self, _event: PhaseEvent) {}
}
