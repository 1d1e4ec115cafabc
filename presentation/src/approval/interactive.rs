//! Interactive human approval for gated operations and flagged steps.
//!
//! When approval is required, the user sees:
//!
//! ```text
//! ═══════════════════════════════════════════════════════════════
//!   Approval Required: architect.design_architecture
//! ═══════════════════════════════════════════════════════════════
//!
//! Step architecture_design finished with confidence 0.62.
//!
//! Context:
//!   architecture: {"style":"layered", ...}
//!
//! Commands:
//!   /approve          - Accept and continue
//!   /reject [reason]  - Deny
//!
//! relay-approve>
//! ```
//!
//! | Command | Aliases |
//! |---------|---------|
//! | `/approve` | `approve`, `a`, `y`, `yes` |
//! | `/reject [reason]` | `reject`, `r`, `n`, `no` |
//!
//! Prompts go to stderr so JSON output on stdout stays clean. End of input
//! cancels the request, which the caller treats as a denial.
//!
//! Input lines come from one reader thread that lives as long as the
//! process. A prompt only awaits the next line from a channel, so a prompt
//! abandoned on approval timeout or cancellation leaves nothing blocked
//! behind it; a line typed afterwards answers the next prompt.

use async_trait::async_trait;
use colored::Colorize;
use relay_application::{
    ApprovalDecision, ApprovalReason, ApprovalRequest, HumanApprovalError, HumanApprovalPort,
};
use std::io::{self, BufRead, Write};
use tokio::sync::{Mutex, mpsc};

const CONTEXT_PREVIEW: usize = 100;

type InputLine = io::Result<String>;

/// Terminal-based [`HumanApprovalPort`].
pub struct InteractiveApproval {
    /// Held for a whole prompt so concurrent requests ask one at a time
    lines: Mutex<mpsc::UnboundedReceiver<InputLine>>,
}

impl InteractiveApproval {
    /// Answer prompts from the process's stdin.
    pub fn new() -> Self {
        Self::with_reader(io::BufReader::new(io::stdin()))
    }

    /// Answer prompts from `reader`, one command per line.
    pub fn with_reader<R: BufRead + Send + 'static>(reader: R) -> Self {
        Self {
            lines: Mutex::new(spawn_reader(reader)),
        }
    }

    fn display_prompt(request: &ApprovalRequest) {
        let rule = "═══════════════════════════════════════════════════════════════";
        eprintln!();
        eprintln!("{}", rule.yellow().bold());
        eprintln!(
            "{}",
            format!("  Approval Required: {}", request.operation)
                .yellow()
                .bold()
        );
        eprintln!("{}", rule.yellow().bold());
        eprintln!();

        match &request.reason {
            ApprovalReason::GatedOperation => {
                eprintln!("This operation requires sign-off before it runs.");
            }
            ApprovalReason::StepReview {
                step,
                confidence,
                validation_errors,
            } => {
                eprintln!(
                    "Step {} finished with confidence {:.2}.",
                    step.as_str().bold(),
                    confidence
                );
                for error in validation_errors {
                    eprintln!("  {} {}", "!".red(), error);
                }
            }
        }
        eprintln!();

        if !request.context.is_empty() {
            eprintln!("{}", "Context:".cyan().bold());
            for (key, value) in &request.context {
                eprintln!("  {}: {}", key, preview(&value.to_string()).dimmed());
            }
            eprintln!();
        }

        eprintln!("{}", "Commands:".cyan().bold());
        eprintln!("  {}          - Accept and continue", "/approve".green());
        eprintln!("  {}  - Deny", "/reject [reason]".red());
        eprintln!();
    }

    fn show_cursor() -> Result<(), HumanApprovalError> {
        eprint!("{} ", "relay-approve>".magenta().bold());
        io::stderr()
            .flush()
            .map_err(|e| HumanApprovalError::IoError(format!("Failed to flush stderr: {}", e)))
    }
}

impl Default for InteractiveApproval {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse one line of user input into a decision.
pub fn parse_decision(input: &str) -> Option<ApprovalDecision> {
    let input = input.trim();
    let (command, rest) = match input.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (input, ""),
    };
    match command.to_lowercase().as_str() {
        "/approve" | "approve" | "a" | "y" | "yes" => Some(ApprovalDecision::Approve),
        "/reject" | "reject" | "r" | "n" | "no" => Some(ApprovalDecision::Reject(
            (!rest.is_empty()).then(|| rest.to_string()),
        )),
        _ => None,
    }
}

/// Feed lines from `reader` into a channel until end of input or error.
///
/// A plain OS thread rather than a tokio blocking task: runtime shutdown
/// must not wait on a read that may never complete.
fn spawn_reader<R: BufRead + Send + 'static>(mut reader: R) -> mpsc::UnboundedReceiver<InputLine> {
    let (tx, rx) = mpsc::unbounded_channel();
    // If the thread cannot start, `tx` is dropped with the closure and every
    // prompt reports end of input.
    let _ = std::thread::Builder::new()
        .name("relay-approval-input".to_string())
        .spawn(move || {
            loop {
                let mut line = String::new();
                match reader.read_line(&mut line) {
                    Ok(0) => break,
                    Ok(_) => {
                        if tx.send(Ok(line.trim().to_string())).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        let _ = tx.send(Err(e));
                        break;
                    }
                }
            }
        });
    rx
}

fn preview(text: &str) -> String {
    if text.chars().count() <= CONTEXT_PREVIEW {
        return text.to_string();
    }
    let cut: String = text.chars().take(CONTEXT_PREVIEW).collect();
    format!("{}...", cut)
}

#[async_trait]
impl HumanApprovalPort for InteractiveApproval {
    async fn request_approval(
        &self,
        request: &ApprovalRequest,
    ) -> Result<ApprovalDecision, HumanApprovalError> {
        let mut lines = self.lines.lock().await;
        Self::display_prompt(request);
        loop {
            Self::show_cursor()?;
            let input = match lines.recv().await {
                None => return Err(HumanApprovalError::Cancelled),
                Some(Err(e)) => {
                    return Err(HumanApprovalError::IoError(format!(
                        "Failed to read input: {}",
                        e
                    )));
                }
                Some(Ok(input)) => input,
            };
            match parse_decision(&input) {
                Some(decision) => return Ok(decision),
                None if input.is_empty() => continue,
                None => eprintln!(
                    "{} Unknown command '{}'. Use /approve or /reject.",
                    "?".yellow(),
                    input
                ),
            }
        }
    }
}
