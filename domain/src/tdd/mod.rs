//! Test-driven development cycle.
//!
//! [`TddCycle`] enforces `RED → GREEN → REFACTOR → RED` and the two quality
//! gates (coverage > 90%, mutation score > 80%) that must pass before a cycle
//! may be marked complete. It is a synchronous validator owned by a single
//! agent; it has no concurrency of its own.

pub mod cycle;

pub use cycle::{QualityThresholds, TddCycle, TddError, TddPhase};
