//! CLI entrypoint for relay
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use relay_application::{
    HumanApprovalPort, KnowledgeStorePort, NoProgress, OrchestratorContext, PhaseEventLogger,
    PhaseOrchestrator, PhaseProgressNotifier, approval_for_mode,
};
use relay_domain::{ApprovalMode, FieldMap, PhaseDefinition, PhaseStatus};
use relay_infrastructure::{
    ConfigLoader, FileConfig, InMemoryKnowledgeStore, JsonlPhaseLogger, standard_agents,
};
use relay_presentation::{
    Cli, Command, ConsoleFormatter, InteractiveApproval, OutputConfig, ProgressReporter, RunArgs,
};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Conventional exit status for termination by SIGINT.
const EXIT_INTERRUPTED: i32 = 130;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    if cli.show_config {
        for line in ConfigLoader::config_sources() {
            println!("{}", line);
        }
        return Ok(ExitCode::SUCCESS);
    }

    // Keep the guard alive so buffered log lines are flushed on exit
    let _log_guard = init_logging(&cli)?;

    let config = load_config(&cli)?;

    match &cli.command {
        Some(Command::Run(args)) => run(&cli, args, &config).await,
        Some(Command::Phases) | None => {
            print_phases(&config.to_phase_definition());
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Initialize logging based on verbosity level; `RUST_LOG` wins when set.
fn init_logging(cli: &Cli) -> Result<Option<WorkerGuard>> {
    let level = match (cli.quiet, cli.verbose) {
        (true, 0) => "error",
        (_, 0) => "warn",
        (_, 1) => "info",
        (_, 2) => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match &cli.log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let file_name = path
                .file_name()
                .with_context(|| format!("--log-file {} has no file name", path.display()))?;
            let appender = tracing_appender::rolling::never(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
            Ok(None)
        }
    }
}

fn load_config(cli: &Cli) -> Result<FileConfig> {
    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).context("Failed to load configuration")?
    };

    for issue in config.check()? {
        warn!("{}", issue.message);
    }
    Ok(config)
}

/// Seed fields from a `.toml` file, or JSON for any other extension.
fn load_seed(path: &Path) -> Result<FieldMap> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read seed file {}", path.display()))?;

    let value: serde_json::Value = match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => toml::from_str(&text)
            .with_context(|| format!("Invalid TOML in seed file {}", path.display()))?,
        _ => serde_json::from_str(&text)
            .with_context(|| format!("Invalid JSON in seed file {}", path.display()))?,
    };

    match value {
        serde_json::Value::Object(fields) => Ok(fields),
        _ => bail!("Seed file {} must contain an object", path.display()),
    }
}

async fn run(cli: &Cli, args: &RunArgs, config: &FileConfig) -> Result<ExitCode> {
    let seed = load_seed(&args.seed)?;
    let definition = config.to_phase_definition();

    let output = OutputConfig::default()
        .with_format(config.output.format)
        .with_format(args.output.map(Into::into))
        .with_color(config.output.color)
        .with_quiet(cli.quiet || !config.output.show_progress);
    if !output.color {
        colored::control::set_override(false);
    }

    // === Dependency Injection ===
    let mode = args
        .approval
        .map(ApprovalMode::from)
        .unwrap_or_else(|| config.approval_mode());
    // Only interactive mode reads stdin
    let interactive = (mode == ApprovalMode::Interactive)
        .then(|| Arc::new(InteractiveApproval::new()) as Arc<dyn HumanApprovalPort>);
    let approval = approval_for_mode(mode, interactive);

    let store = Arc::new(InMemoryKnowledgeStore::new());
    let cancellation = CancellationToken::new();
    let mut context = OrchestratorContext::new(approval)
        .with_policy(config.to_gate_policy())
        .with_params(config.to_execution_params())
        .with_knowledge_store(store.clone() as Arc<dyn KnowledgeStorePort>)
        .with_cancellation(cancellation.clone());

    let events_file = args
        .events_file
        .as_ref()
        .or(config.logging.events_file.as_ref());
    if let Some(path) = events_file {
        match JsonlPhaseLogger::open(path) {
            Some(logger) => {
                info!(path = %path.display(), "Logging phase events");
                context = context.with_event_logger(Arc::new(logger) as Arc<dyn PhaseEventLogger>);
            }
            None => warn!(path = %path.display(), "Running without phase event log"),
        }
    }

    // First Ctrl-C cancels the phase; a second one exits immediately.
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        warn!("Interrupted, cancelling phase (press Ctrl-C again to exit)");
        cancellation.cancel();
        if tokio::signal::ctrl_c().await.is_ok() {
            std::process::exit(EXIT_INTERRUPTED);
        }
    });

    let orchestrator = PhaseOrchestrator::new(standard_agents()?, context);
    let progress: Box<dyn PhaseProgressNotifier> = if output.show_progress {
        Box::new(ProgressReporter::new())
    } else {
        Box::new(NoProgress)
    };

    let result = if args.steps.is_empty() {
        orchestrator
            .execute_with_progress(&definition, seed, progress.as_ref())
            .await?
    } else {
        orchestrator
            .execute_steps(&definition, &args.steps, seed, progress.as_ref())
            .await?
    };

    println!("{}", ConsoleFormatter::render(&result, output.format));

    if let Some(path) = &args.handoff_out {
        let json = serde_json::to_string_pretty(&result.handoff)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write hand-off package to {}", path.display()))?;
        info!(path = %path.display(), fields = result.handoff.len(), "Hand-off written");
    }

    Ok(match result.status {
        PhaseStatus::Completed => ExitCode::SUCCESS,
        PhaseStatus::Incomplete => ExitCode::from(2),
        _ => ExitCode::FAILURE,
    })
}

fn print_phases(definition: &PhaseDefinition) {
    println!("Phase: {}", definition.name);
    for (i, step) in definition.steps.iter().enumerate() {
        let review = if definition.review.always_review.contains(&step.id) {
            " [always reviewed]"
        } else {
            ""
        };
        println!("  {}. {} -> {}{}", i + 1, step.id, step.operation_name(), review);
        if !step.requires.is_empty() {
            println!("       requires: {}", step.requires.join(", "));
        }
        if !step.accepts.is_empty() {
            println!("       accepts:  {}", step.accepts.join(", "));
        }
        println!("       produces: {}", step.produces.join(", "));
    }
    println!("Required outputs: {}", definition.required_outputs.join(", "));
    println!("Hand-off fields:  {}", definition.handoff_fields.join(", "));
}
