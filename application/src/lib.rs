//! Application layer for relay
//!
//! This crate contains the agent runtime, use cases, port definitions and
//! execution configuration. It depends only on the domain layer.

pub mod agent;
pub mod config;
pub mod context;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use agent::{Agent, AgentPool, AgentState};
pub use config::{DEFAULT_APPROVAL_TIMEOUT, ExecutionParams};
pub use context::OrchestratorContext;
pub use ports::{
    event_logger::{NoPhaseEventLogger, PhaseEvent, PhaseEventLogger},
    human_approval::{
        ApprovalDecision, ApprovalReason, ApprovalRequest, AutoApproveApproval,
        AutoRejectApproval, HumanApprovalError, HumanApprovalPort, approval_for_mode,
    },
    knowledge_store::{KnowledgeStoreError, KnowledgeStorePort, NoKnowledgeStore},
    progress::{NoProgress, PhaseProgressNotifier},
};
pub use use_cases::gate_pipeline::GatePipeline;
pub use use_cases::run_phase::PhaseOrchestrator;
pub use use_cases::step_executor::StepExecutor;
