//! Console output formatter for phase results

use colored::Colorize;
use relay_domain::{OutputFormat, PhaseRunResult, PhaseStatus, StepOutcome, StepResult};

/// Formats phase results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    pub fn render(result: &PhaseRunResult, format: OutputFormat) -> String {
        match format {
            OutputFormat::Full => Self::format(result),
            OutputFormat::Summary => Self::format_summary(result),
            OutputFormat::Json => Self::format_json(result),
        }
    }

    /// Every step with its output
    pub fn format(result: &PhaseRunResult) -> String {
        let mut output = String::new();

        output.push_str(&Self::header(&format!("Phase: {}", result.phase)));
        output.push('\n');
        output.push_str(&Self::status_line(result));

        output.push_str(&Self::section_header("Steps"));
        for step in &result.step_results {
            output.push_str(&format!("\n{}\n", Self::step_title(step)));
            for error in step.validation_errors() {
                output.push_str(&format!("  {} {}\n", "error:".red(), error));
            }
            if step.success() && !step.output().is_empty() {
                let body = serde_json::to_string_pretty(step.output()).unwrap_or_default();
                output.push_str(&Self::indent(&body, "  "));
                output.push('\n');
            }
        }

        output.push_str(&Self::details(result));
        output.push_str(&Self::footer());
        output
    }

    /// Status, confidence and what needs attention
    pub fn format_summary(result: &PhaseRunResult) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "{}\n\n",
            format!("=== {} phase ===", result.phase).cyan().bold()
        ));
        output.push_str(&Self::status_line(result));
        output.push('\n');

        for step in &result.step_results {
            output.push_str(&format!("  {}\n", Self::step_title(step)));
        }

        output.push_str(&Self::details(result));
        output
    }

    /// Format as JSON
    pub fn format_json(result: &PhaseRunResult) -> String {
        serde_json::to_string_pretty(result).unwrap_or_else(|_| "{}".to_string())
    }

    fn status_line(result: &PhaseRunResult) -> String {
        let status = match result.status {
            PhaseStatus::Completed => result.status.as_str().green().bold(),
            PhaseStatus::Incomplete => result.status.as_str().yellow().bold(),
            _ => result.status.as_str().red().bold(),
        };
        format!(
            "{} {}   {} {:.2}   {} {}ms\n",
            "Status:".cyan().bold(),
            status,
            "Confidence:".cyan().bold(),
            result.overall_confidence,
            "Elapsed:".cyan().bold(),
            (result.finished_at - result.started_at).num_milliseconds()
        )
    }

    fn step_title(step: &StepResult) -> String {
        let marker = match step.outcome() {
            StepOutcome::Accepted => "v".green(),
            StepOutcome::NeedsReview => "?".yellow(),
            StepOutcome::Failed => "x".red(),
        };
        format!(
            "{} {} {} ({:.2}, {}ms)",
            marker,
            step.step().as_str().bold(),
            step.outcome().as_str().dimmed(),
            step.confidence(),
            step.execution_time().as_millis()
        )
    }

    /// Failure, missing outputs, review queue and approvals
    fn details(result: &PhaseRunResult) -> String {
        let mut output = String::new();

        if let Some(step) = &result.failed_step {
            output.push_str(&format!("\n{} {}\n", "Failed step:".red().bold(), step));
        }
        for error in &result.errors {
            output.push_str(&format!("  * {}\n", error));
        }

        if !result.missing_outputs.is_empty() {
            output.push_str(&format!(
                "\n{} {}\n",
                "Missing outputs:".yellow().bold(),
                result.missing_outputs.join(", ")
            ));
        }

        let queue = result.review_queue();
        if !queue.is_empty() {
            output.push_str(&format!("\n{}\n", "Flagged for review:".yellow().bold()));
            for step in queue {
                let decision = match result.output.human_approvals().get(step.as_str()) {
                    Some(true) => "approved".green(),
                    Some(false) => "denied".red(),
                    None => "not reviewed".dimmed(),
                };
                output.push_str(&format!("  * {} ({})\n", step, decision));
            }
        }

        if !result.handoff.is_empty() {
            let fields: Vec<&str> = result.handoff.keys().map(String::as_str).collect();
            output.push_str(&format!(
                "\n{} {}\n",
                "Hand-off:".cyan().bold(),
                fields.join(", ")
            ));
        }

        output
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
