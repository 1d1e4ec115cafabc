//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure and presentation adapters
//! must implement.

pub mod event_logger;
pub mod human_approval;
pub mod knowledge_store;
pub mod progress;
