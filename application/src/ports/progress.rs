//! Progress notification port
//!
//! Defines the interface for reporting progress during phase execution.

use relay_domain::{PhaseRunResult, StepDefinition, StepResult};

/// Callback for progress updates during a phase run
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (progress bars, plain logs, etc.)
pub trait PhaseProgressNotifier: Send + Sync {
    /// Called once before the first step
    fn on_phase_start(&self, phase: &str, total_steps: usize);

    /// Called before a step is executed
    fn on_step_start(&self, step: &StepDefinition, index: usize);

    /// Called after a step result is recorded
    fn on_step_complete(&self, result: &StepResult);

    /// Called when a flagged step waits for a human decision
    fn on_approval_required(&self, _step: &StepDefinition, _confidence: f64) {}

    /// Called once with the final result
    fn on_phase_complete(&self, result: &PhaseRunResult);
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl PhaseProgressNotifier for NoProgress {
    fn on_phase_start(&self, _phase: &str, _total_steps: usize) {}
    fn on_step_start(&self, _step: &StepDefinition, _index: usize) {}
    fn on_step_complete(&self, _result: &StepResult) {}
    fn on_phase_complete(&self, _result: &PhaseRunResult) {}
}
