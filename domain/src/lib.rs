//! Domain layer for relay
//!
//! This crate contains the core rules, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Capabilities and gates
//!
//! Agents expose named *capabilities*. Every invocation passes an ordered
//! series of gates (existence, timestamp, precondition, human approval,
//! parameter, execution, completion). The first failing gate decides the
//! response.
//!
//! ## Phases
//!
//! A *phase* is an ordered list of steps. Each step feeds on the accumulated
//! [`PhaseOutput`] and adds its own declared fields to it. A phase ends as
//! `completed`, `incomplete` or `error`, always with a full output.
//!
//! ## TDD cycle
//!
//! [`TddCycle`] enforces RED → GREEN → REFACTOR → RED and the coverage and
//! mutation score bars that close a cycle.

pub mod agent;
pub mod capability;
pub mod config;
pub mod core;
pub mod phase;
pub mod tdd;

// Re-export commonly used types
pub use agent::{
    compliance::ComplianceFlags,
    task::{AgentStatus, AgentTask, TaskPriority},
    value_objects::{AgentId, TaskId},
};
pub use capability::{
    Capability, CapabilityError, CapabilityRegistry, CapabilityRequest, CapabilityResponse,
    FieldMap, GateKind, GateOutcome, GatePolicy, Precondition, RegisteredCapability, RequestId,
    ResponseMetadata, ResponseStatus, UserStory,
};
pub use config::{ApprovalMode, ConfigIssue, ConfigIssueCode, OutputFormat, Severity};
pub use core::error::ErrorKind;
pub use phase::{
    ConfidenceWeights, PhaseConfigError, PhaseDefinition, PhaseOutput, PhaseRun, PhaseRunResult,
    PhaseStatus, ReviewPolicy, StepDefinition, StepDisposition, StepError, StepId, StepOutcome,
    StepResult,
};
pub use tdd::{QualityThresholds, TddCycle, TddError, TddPhase};
