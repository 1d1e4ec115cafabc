//! Capability errors: registration and gate failures.

use crate::core::error::ErrorKind;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while registering or invoking a capability.
///
/// Gate failures are never raised out of the pipeline: they are carried on
/// the [`CapabilityResponse`](super::value_objects::CapabilityResponse) instead.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CapabilityError {
    #[error("Capability not found: {name}")]
    NotFound { name: String },

    #[error("Capability already registered: {name} (use replace to override)")]
    Duplicate { name: String },

    #[error("Incompatible capability '{name}': {reason}")]
    Incompatible { name: String, reason: String },

    #[error("Precondition failed for {operation}: {reason}")]
    PreconditionValidation { operation: String, reason: String },

    #[error("Human approval denied for {operation}: {reason}")]
    HumanApprovalDenied { operation: String, reason: String },

    #[error("Invalid parameters for {operation}: {reason}")]
    InvalidParameter { operation: String, reason: String },

    #[error("Capability execution failed for {operation}: {message}")]
    Execution { operation: String, message: String },

    #[error("Capability {operation} timed out after {after_ms} ms")]
    Timeout { operation: String, after_ms: u64 },
}

impl CapabilityError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CapabilityError::NotFound { .. } => ErrorKind::CapabilityNotFound,
            CapabilityError::Duplicate { .. } => ErrorKind::DuplicateCapability,
            CapabilityError::Incompatible { .. } => ErrorKind::IncompatibleCapability,
            CapabilityError::PreconditionValidation { .. } => ErrorKind::PreconditionValidation,
            CapabilityError::HumanApprovalDenied { .. } => ErrorKind::HumanApprovalDenied,
            CapabilityError::InvalidParameter { .. } => ErrorKind::InvalidParameter,
            CapabilityError::Execution { .. } => ErrorKind::CapabilityExecution,
            CapabilityError::Timeout { .. } => ErrorKind::Timeout,
        }
    }

    pub fn code(&self) -> &'static str {
        self.kind().code()
    }

    pub fn not_found(name: impl Into<String>) -> Self {
        CapabilityError::NotFound { name: name.into() }
    }

    pub fn execution(operation: impl Into<String>, message: impl Into<String>) -> Self {
        CapabilityError::Execution {
            operation: operation.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = CapabilityError::not_found("missing");
        assert!(err.to_string().contains("not found"));
        assert_eq!(err.kind(), ErrorKind::CapabilityNotFound);
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[test]
    fn test_serde_tagged() {
        let err = CapabilityError::Timeout {
            operation: "a.b".into(),
            after_ms: 50,
        };
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["kind"], "timeout");
        assert_eq!(json["after_ms"], 50);
    }
}
