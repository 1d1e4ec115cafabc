//! Phase run state and final result.
//!
//! [`PhaseRun`] holds the bookkeeping of one phase execution and is driven
//! by the orchestrator:
//!
//! ```text
//! start ──► record_step (success) ──► ... ──► finish ──► Completed | Incomplete
//!              │
//!              └─ (failure) ──► Error ──► finish ──► Error
//! ```

use super::confidence::mean_confidence;
use super::output::PhaseOutput;
use super::result::StepResult;
use super::step::StepId;
use crate::capability::value_objects::FieldMap;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseStatus {
    #[default]
    NotStarted,
    Running,
    /// Every step succeeded and all required outputs are populated
    Completed,
    /// Every step succeeded but required outputs are missing
    Incomplete,
    /// A step failed and the phase was aborted
    Error,
}

impl PhaseStatus {
    pub fn as_str(&self) -> &str {
        match self {
            PhaseStatus::NotStarted => "not_started",
            PhaseStatus::Running => "running",
            PhaseStatus::Completed => "completed",
            PhaseStatus::Incomplete => "incomplete",
            PhaseStatus::Error => "error",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PhaseStatus::Completed | PhaseStatus::Incomplete | PhaseStatus::Error
        )
    }
}

impl std::fmt::Display for PhaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the orchestrator should go on after a recorded step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepDisposition {
    Continue,
    Abort,
}

/// Mutable state of a phase while it runs.
#[derive(Debug, Clone)]
pub struct PhaseRun {
    status: PhaseStatus,
    output: PhaseOutput,
    step_results: Vec<StepResult>,
    failed_step: Option<StepId>,
    errors: Vec<String>,
    started_at: DateTime<Utc>,
}

impl PhaseRun {
    pub fn start(phase: impl Into<String>, seed: FieldMap) -> Self {
        Self {
            status: PhaseStatus::Running,
            output: PhaseOutput::new(phase, seed),
            step_results: Vec::new(),
            failed_step: None,
            errors: Vec::new(),
            started_at: Utc::now(),
        }
    }

    pub fn status(&self) -> PhaseStatus {
        self.status
    }

    pub fn output(&self) -> &PhaseOutput {
        &self.output
    }

    pub fn step_results(&self) -> &[StepResult] {
        &self.step_results
    }

    /// Record a finished step. A successful step merges its declared
    /// outputs; a failed one moves the run to `Error`.
    pub fn record_step(&mut self, result: StepResult, produces: &[String]) -> StepDisposition {
        self.output
            .record_validation(result.step().clone(), result.success());

        let disposition = if result.success() {
            self.output.merge(result.output(), produces);
            StepDisposition::Continue
        } else {
            self.status = PhaseStatus::Error;
            self.failed_step = Some(result.step().clone());
            self.errors.extend(
                result
                    .validation_errors()
                    .iter()
                    .map(|e| format!("{}: {}", result.step(), e)),
            );
            StepDisposition::Abort
        };
        self.step_results.push(result);
        disposition
    }

    pub fn record_approval(&mut self, step: StepId, approved: bool) {
        self.output.record_approval(step, approved);
    }

    /// Abort without a failed step result (e.g. cancellation between steps).
    pub fn abort(&mut self, reason: impl Into<String>) {
        self.status = PhaseStatus::Error;
        self.errors.push(reason.into());
    }

    /// Final validation pass and result assembly.
    pub fn finish(mut self, required_outputs: &[String], handoff_fields: &[String]) -> PhaseRunResult {
        let missing_outputs = self.output.missing(required_outputs);

        if self.status != PhaseStatus::Error {
            self.status = if missing_outputs.is_empty() {
                PhaseStatus::Completed
            } else {
                PhaseStatus::Incomplete
            };
        }

        let handoff = match self.status {
            PhaseStatus::Error => FieldMap::new(),
            _ => self.output.handoff(handoff_fields),
        };

        let scores: Vec<f64> = self.step_results.iter().map(StepResult::confidence).collect();
        self.output.finalize();

        PhaseRunResult {
            phase: self.output.phase().to_string(),
            status: self.status,
            overall_confidence: mean_confidence(&scores),
            output: self.output,
            step_results: self.step_results,
            failed_step: self.failed_step,
            errors: self.errors,
            missing_outputs,
            handoff,
            started_at: self.started_at,
            finished_at: Utc::now(),
        }
    }
}

/// Outcome of a phase execution. Always carries the full, inspectable output.
#[derive(Debug, Clone, Serialize)]
pub struct PhaseRunResult {
    pub phase: String,
    pub status: PhaseStatus,
    pub output: PhaseOutput,
    pub step_results: Vec<StepResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_step: Option<StepId>,
    pub errors: Vec<String>,
    pub missing_outputs: Vec<String>,
    /// Mean of step confidences, 0.0 when no step ran
    pub overall_confidence: f64,
    pub handoff: FieldMap,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl PhaseRunResult {
    pub fn is_completed(&self) -> bool {
        self.status == PhaseStatus::Completed
    }

    /// Steps whose results were flagged for human review.
    pub fn review_queue(&self) -> Vec<&StepId> {
        self.step_results
            .iter()
            .filter(|r| r.human_review_required())
            .map(StepResult::step)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ErrorKind;
    use serde_json::json;
    use std::time::Duration;

    fn ok(step: &str, field: &str, confidence: f64) -> StepResult {
        let mut out = FieldMap::new();
        out.insert(field.into(), json!(format!("{step} output")));
        StepResult::succeeded(step.into(), out, confidence, false, Duration::ZERO)
    }

    fn seed() -> FieldMap {
        let mut seed = FieldMap::new();
        seed.insert("project_name".into(), json!("relay"));
        seed
    }

    fn strings(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_completed_run() {
        let mut run = PhaseRun::start("p", seed());
        assert_eq!(run.status(), PhaseStatus::Running);

        for (step, field, c) in [("a", "x", 0.9), ("b", "y", 0.6), ("c", "z", 0.3)] {
            assert_eq!(
                run.record_step(ok(step, field, c), &strings(&[field])),
                StepDisposition::Continue
            );
        }

        let result = run.finish(&strings(&["x", "y", "z"]), &strings(&["project_name", "z"]));
        assert_eq!(result.status, PhaseStatus::Completed);
        assert_eq!(result.overall_confidence, 0.6);
        assert!(result.missing_outputs.is_empty());
        assert_eq!(result.handoff.len(), 2);
        assert!(result.output.is_finalized());
        assert_eq!(result.output.validation_results().len(), 3);
    }

    #[test]
    fn test_incomplete_run() {
        let mut run = PhaseRun::start("p", seed());
        run.record_step(ok("a", "x", 1.0), &strings(&["x"]));
        let result = run.finish(&strings(&["x", "y"]), &[]);
        assert_eq!(result.status, PhaseStatus::Incomplete);
        assert_eq!(result.missing_outputs, vec!["y"]);
        assert!(result.failed_step.is_none());
    }

    #[test]
    fn test_failed_step_aborts() {
        let mut run = PhaseRun::start("p", seed());
        run.record_step(ok("a", "x", 1.0), &strings(&["x"]));
        let failed = StepResult::failed(
            "b".into(),
            vec![(ErrorKind::CapabilityExecution, "boom".into())],
            FieldMap::new(),
            Duration::ZERO,
        );
        assert_eq!(run.record_step(failed, &[]), StepDisposition::Abort);

        let result = run.finish(&strings(&["x"]), &strings(&["x"]));
        assert_eq!(result.status, PhaseStatus::Error);
        assert_eq!(result.failed_step.as_ref().map(|s| s.as_str()), Some("b"));
        assert_eq!(result.errors, vec!["b: boom"]);
        assert!(result.handoff.is_empty());
        assert_eq!(result.output.validation_results().get("a"), Some(true));
        assert_eq!(result.output.validation_results().get("b"), Some(false));
        assert!((result.overall_confidence - 0.5).abs() < 1e-9);
        assert_eq!(result.review_queue().len(), 1);
    }

    #[test]
    fn test_no_steps_confidence_zero() {
        let result = PhaseRun::start("p", FieldMap::new()).finish(&[], &[]);
        assert_eq!(result.overall_confidence, 0.0);
        assert_eq!(result.status, PhaseStatus::Completed);
    }

    #[test]
    fn test_abort_marks_error() {
        let mut run = PhaseRun::start("p", FieldMap::new());
        run.abort("cancelled");
        let result = run.finish(&[], &[]);
        assert_eq!(result.status, PhaseStatus::Error);
        assert_eq!(result.errors, vec!["cancelled"]);
    }
}
