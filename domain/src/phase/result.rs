//! Per-step results.

use super::confidence::clamp_confidence;
use super::step::StepId;
use crate::capability::value_objects::FieldMap;
use crate::core::error::ErrorKind;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by step execution before any capability is invoked.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StepError {
    #[error("Step '{step}' is missing required input field(s): {}", fields.join(", "))]
    MissingDependency { step: StepId, fields: Vec<String> },
}

impl StepError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StepError::MissingDependency { .. } => ErrorKind::MissingDependency,
        }
    }
}

/// How a step ended, from the orchestrator's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepOutcome {
    /// Succeeded with confidence at or above threshold
    Accepted,
    /// Succeeded but a human should look at it
    NeedsReview,
    Failed,
}

impl StepOutcome {
    pub fn as_str(&self) -> &str {
        match self {
            StepOutcome::Accepted => "accepted",
            StepOutcome::NeedsReview => "needs_review",
            StepOutcome::Failed => "failed",
        }
    }
}

/// Immutable record of one executed (or refused) step.
///
/// A result carrying validation errors is never successful, and a failed
/// result always asks for human review.
#[derive(Debug, Clone, Serialize)]
pub struct StepResult {
    step: StepId,
    success: bool,
    output: FieldMap,
    confidence: f64,
    human_review_required: bool,
    validation_errors: Vec<String>,
    error_kinds: Vec<ErrorKind>,
    #[serde(rename = "execution_time_ms", serialize_with = "serialize_millis")]
    execution_time: Duration,
}

fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

impl StepResult {
    /// A successful step.
    pub fn succeeded(
        step: StepId,
        output: FieldMap,
        confidence: f64,
        human_review_required: bool,
        execution_time: Duration,
    ) -> Self {
        Self {
            step,
            success: true,
            output,
            confidence: clamp_confidence(confidence),
            human_review_required,
            validation_errors: Vec::new(),
            error_kinds: Vec::new(),
            execution_time,
        }
    }

    /// A failed step: confidence 0, review required.
    pub fn failed(
        step: StepId,
        errors: Vec<(ErrorKind, String)>,
        output: FieldMap,
        execution_time: Duration,
    ) -> Self {
        let (error_kinds, validation_errors): (Vec<ErrorKind>, Vec<String>) =
            errors.into_iter().unzip();
        Self {
            step,
            success: false,
            output,
            confidence: 0.0,
            human_review_required: true,
            validation_errors,
            error_kinds,
            execution_time,
        }
    }

    pub fn missing_dependency(err: &StepError) -> Self {
        let StepError::MissingDependency { step, .. } = err;
        Self::failed(
            step.clone(),
            vec![(err.kind(), err.to_string())],
            FieldMap::new(),
            Duration::ZERO,
        )
    }

    pub fn step(&self) -> &StepId {
        &self.step
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn output(&self) -> &FieldMap {
        &self.output
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn human_review_required(&self) -> bool {
        self.human_review_required
    }

    pub fn validation_errors(&self) -> &[String] {
        &self.validation_errors
    }

    pub fn error_kinds(&self) -> &[ErrorKind] {
        &self.error_kinds
    }

    pub fn execution_time(&self) -> Duration {
        self.execution_time
    }

    pub fn outcome(&self) -> StepOutcome {
        match (self.success, self.human_review_required) {
            (false, _) => StepOutcome::Failed,
            (true, true) => StepOutcome::NeedsReview,
            (true, false) => StepOutcome::Accepted,
        }
    }
}
