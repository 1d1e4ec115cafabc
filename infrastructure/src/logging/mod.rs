//! Logging infrastructure: the structured phase event log.
//!
//! Provides [`JsonlPhaseLogger`], an append-only JSONL writer that implements
//! the [`PhaseEventLogger`](relay_application::PhaseEventLogger) port.

mod jsonl_logger;

pub use jsonl_logger::JsonlPhaseLogger;
