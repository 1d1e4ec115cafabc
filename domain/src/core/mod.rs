//! Core domain concepts shared across all subdomains.
//!
//! - [`error::ErrorKind`]: the orchestration error taxonomy
//! - [`id`]: identifier generation for requests, tasks and phase runs

pub mod error;
pub mod id;
