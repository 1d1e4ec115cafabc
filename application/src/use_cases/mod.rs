//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod gate_pipeline;
pub mod run_phase;
pub(crate) mod shared;
pub mod step_executor;
