//! Infrastructure layer for relay
//!
//! This crate contains adapters that implement the ports defined in the
//! application layer: configuration file loading, the knowledge store, the
//! JSONL event log and the built-in agents.

pub mod agents;
pub mod config;
pub mod knowledge;
pub mod logging;

// Re-export commonly used types
pub use agents::{
    Architect, Documenter, DomainModeler, RequirementsAnalyst, TddCoach, standard_agents,
};
pub use config::{
    ConfigLoader, ConfigValidationError, FileApprovalConfig, FileConfig, FileExecutionConfig,
    FileGatesConfig, FileLoggingConfig, FileOutputConfig, FileOutputFormat, FilePhaseConfig,
};
pub use knowledge::InMemoryKnowledgeStore;
pub use logging::JsonlPhaseLogger;
