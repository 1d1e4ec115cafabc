//! Configuration file loading for relay
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `--config <path>` specified file
//! 2. `RELAY_`-prefixed environment variables
//! 3. Project root: `./relay.toml` or `./.relay.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/relay/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileApprovalConfig, FileApprovalEntry, FileConfig,
    FileExecutionConfig, FileGatesConfig, FileLoggingConfig, FileOutputConfig, FileOutputFormat,
    FilePhaseConfig, FilePreconditionEntry,
};
pub use loader::ConfigLoader;
