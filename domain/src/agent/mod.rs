//! Agent domain module
//!
//! An *agent* is the owner of one capability registry. This module holds the
//! agent-side records that the orchestration core reads and writes:
//!
//! - [`value_objects::AgentId`] / [`value_objects::TaskId`]: identifiers
//! - [`task::AgentTask`]: one unit of work and its status transitions
//! - [`compliance::ComplianceFlags`]: gate side effects recorded per agent
//!
//! The runtime that ties these together (`Agent`) lives in the application
//! layer because it drives the asynchronous gate pipeline.

pub mod compliance;
pub mod task;
pub mod value_objects;
