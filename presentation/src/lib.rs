//! Presentation layer for relay
//!
//! This crate contains CLI definitions, output formatters, progress
//! reporters and the interactive approval prompt.

pub mod approval;
pub mod cli;
pub mod config;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use approval::InteractiveApproval;
pub use cli::commands::{ApprovalArg, Cli, Command, OutputFormatArg, RunArgs};
pub use config::OutputConfig;
pub use output::console::ConsoleFormatter;
pub use progress::reporter::{ProgressReporter, SimpleProgress};
