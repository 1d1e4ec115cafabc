//! CLI command definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use relay_domain::{ApprovalMode, OutputFormat};
use std::path::PathBuf;

/// Output format for phase results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormatArg {
    /// Every step with its output, confidence and errors
    Full,
    /// Status, confidence and review queue
    Summary,
    /// The serialized phase result
    Json,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Full => OutputFormat::Full,
            OutputFormatArg::Summary => OutputFormat::Summary,
            OutputFormatArg::Json => OutputFormat::Json,
        }
    }
}

/// How human approval requests are answered
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ApprovalArg {
    /// Ask on the terminal
    Interactive,
    /// Approve everything (logged as a warning)
    #[value(alias = "auto_approve")]
    AutoApprove,
    /// Deny everything
    #[value(alias = "auto_reject")]
    AutoReject,
}

impl From<ApprovalArg> for ApprovalMode {
    fn from(arg: ApprovalArg) -> Self {
        match arg {
            ApprovalArg::Interactive => ApprovalMode::Interactive,
            ApprovalArg::AutoApprove => ApprovalMode::AutoApprove,
            ApprovalArg::AutoReject => ApprovalMode::AutoReject,
        }
    }
}

/// CLI arguments for relay
#[derive(Parser, Debug)]
#[command(name = "relay")]
#[command(author, version, about = "Gated multi-agent workflow orchestrator")]
#[command(long_about = r#"
Relay runs a phase of specialised agents over a shared output. Every
capability call passes through the same gates (existence, timestamp,
precondition, human approval, parameter, execution, completion), and every
step result carries a confidence score that may send it to human review.

The built-in requirements phase runs four steps:
  requirements_analysis -> domain_modeling -> architecture_design -> documentation

Configuration files are loaded from (in priority order):
1. --config <path>               Explicit config file
2. RELAY_* environment variables e.g. RELAY_APPROVAL__MODE=auto_reject
3. ./relay.toml                  Project-level config
4. ~/.config/relay/config.toml   Global config

Example:
  relay run --seed project.json
  relay run --seed project.toml --output full --handoff-out handoff.json
  relay run --seed project.json --approval auto-reject --steps requirements_analysis
  relay phases
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long, global = true)]
    pub show_config: bool,

    /// Write diagnostic logs to this file instead of stderr
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the requirements phase on a seed file
    Run(RunArgs),
    /// List the steps of the requirements phase
    Phases,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Seed fields as a JSON or TOML object (by file extension)
    #[arg(long, value_name = "FILE")]
    pub seed: PathBuf,

    /// Output format (default: config, then summary)
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormatArg>,

    /// Write the hand-off package to this file as JSON
    #[arg(long, value_name = "PATH")]
    pub handoff_out: Option<PathBuf>,

    /// Approval mode (default: config, then interactive)
    #[arg(long, value_enum, value_name = "MODE")]
    pub approval: Option<ApprovalArg>,

    /// Append phase events as JSONL to this file
    #[arg(long, value_name = "PATH")]
    pub events_file: Option<PathBuf>,

    /// Run only these steps, in this order (comma separated)
    #[arg(long, value_delimiter = ',', value_name = "STEP")]
    pub steps: Vec<String>,
}
