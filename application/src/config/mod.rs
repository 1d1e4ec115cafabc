//! Application-level configuration.
//!
//! - [`ExecutionParams`]: approval and capability timeouts, confidence weights

pub mod execution_params;

pub use execution_params::{DEFAULT_APPROVAL_TIMEOUT, ExecutionParams};
