//! Progress reporting for phase execution

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use relay_application::PhaseProgressNotifier;
use relay_domain::{PhaseRunResult, StepDefinition, StepOutcome, StepResult};
use std::sync::Mutex;

/// Reports progress during a phase run with a progress bar
pub struct ProgressReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn phase_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Ok(guard) = self.bar.lock()
            && let Some(bar) = guard.as_ref()
        {
            f(bar);
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

fn outcome_marker(result: &StepResult) -> String {
    match result.outcome() {
        StepOutcome::Accepted => format!("{} {}", "v".green(), result.step()),
        StepOutcome::NeedsReview => format!("{} {} (review)", "?".yellow(), result.step()),
        StepOutcome::Failed => format!("{} {}", "x".red(), result.step()),
    }
}

impl PhaseProgressNotifier for ProgressReporter {
    fn on_phase_start(&self, phase: &str, total_steps: usize) {
        let bar = ProgressBar::new(total_steps as u64);
        bar.set_style(Self::phase_style());
        bar.set_prefix(format!("Phase: {}", phase));
        bar.set_message("Starting...");

        if let Ok(mut guard) = self.bar.lock() {
            *guard = Some(bar);
        }
    }

    fn on_step_start(&self, step: &StepDefinition, _index: usize) {
        self.with_bar(|bar| bar.set_message(format!("{} ...", step.id)));
    }

    fn on_step_complete(&self, result: &StepResult) {
        self.with_bar(|bar| {
            bar.set_message(outcome_marker(result));
            bar.inc(1);
        });
    }

    fn on_approval_required(&self, step: &StepDefinition, confidence: f64) {
        self.with_bar(|bar| {
            bar.println(format!(
                "{} {} needs review (confidence {:.2})",
                "?".yellow(),
                step.id,
                confidence
            ));
            bar.set_message(format!("{} awaiting review", step.id));
        });
    }

    fn on_phase_complete(&self, result: &PhaseRunResult) {
        if let Ok(mut guard) = self.bar.lock()
            && let Some(bar) = guard.take()
        {
            let status = if result.is_completed() {
                result.status.as_str().green()
            } else {
                result.status.as_str().yellow()
            };
            bar.finish_with_message(format!("{} {}", result.phase, status));
        }
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl PhaseProgressNotifier for SimpleProgress {
    fn on_phase_start(&self, phase: &str, total_steps: usize) {
        eprintln!(
            "{} {} ({} steps)",
            "->".cyan(),
            format!("Phase: {}", phase).bold(),
            total_steps
        );
    }

    fn on_step_start(&self, _step: &StepDefinition, _index: usize) {}

    fn on_step_complete(&self, result: &StepResult) {
        eprintln!("  {}", outcome_marker(result));
    }

    fn on_approval_required(&self, step: &StepDefinition, confidence: f64) {
        eprintln!(
            "  {} {} needs review (confidence {:.2})",
            "?".yellow(),
            step.id,
            confidence
        );
    }

    fn on_phase_complete(&self, _result: &PhaseRunResult) {
        eprintln!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_domain::{FieldMap, PhaseRun};
    use std::time::Duration;

    #[test]
    fn test_reporter_lifecycle() {
        let reporter = ProgressReporter::new();
        let step = StepDefinition::new("analysis", "analyst", "analyst", "run");

        reporter.on_phase_start("requirements", 1);
        reporter.on_step_start(&step, 0);
        let result = StepResult::succeeded("analysis".into(), FieldMap::new(), 0.9, false, Duration::ZERO);
        reporter.on_step_complete(&result);
        assert_eq!(
            reporter.bar.lock().unwrap().as_ref().map(ProgressBar::position),
            Some(1)
        );

        let mut run = PhaseRun::start("requirements", FieldMap::new());
        run.record_step(result, &[]);
        reporter.on_phase_complete(&run.finish(&[], &[]));
        assert!(reporter.bar.lock().unwrap().is_none());
    }

    #[test]
    fn test_outcome_marker() {
        colored::control::set_override(false);
        let result = StepResult::succeeded("s".into(), FieldMap::new(), 0.2, true, Duration::ZERO);
        assert_eq!(outcome_marker(&result), "? s (review)");
    }
}
