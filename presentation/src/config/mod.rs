//! Presentation-level configuration
//!
//! Resolved output settings: CLI flags win over the config file, which wins
//! over the defaults.

use relay_domain::OutputFormat;

/// Output configuration for the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Enable colored terminal output
    pub color: bool,
    /// Show progress indicators
    pub show_progress: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            color: true,
            show_progress: true,
        }
    }
}

impl OutputConfig {
    /// Use `format` when given, else keep the current one.
    pub fn with_format(mut self, format: Option<OutputFormat>) -> Self {
        if let Some(format) = format {
            self.format = format;
        }
        self
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// `--quiet` and JSON output both hide progress.
    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.show_progress = self.show_progress && !quiet && self.format != OutputFormat::Json;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_order() {
        let config = OutputConfig::default()
            .with_format(Some(OutputFormat::Full))
            .with_format(None);
        assert_eq!(config.format, OutputFormat::Full);
        assert!(config.clone().with_quiet(false).show_progress);
        assert!(!config.with_quiet(true).show_progress);
    }

    #[test]
    fn test_json_hides_progress() {
        let config = OutputConfig::default()
            .with_format(Some(OutputFormat::Json))
            .with_quiet(false);
        assert!(!config.show_progress);
    }
}
