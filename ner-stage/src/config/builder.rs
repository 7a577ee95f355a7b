//! Configuration builder.
//!
//! This module provides a builder pattern API for creating configurations.

use super::{Result, models::*, validation};
use std::path::Path;
use std::time::Duration;

/// Builder for creating NerConfig instances.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: NerConfig,
}

impl ConfigBuilder {
    /// Create a new configuration builder with default values.
    pub fn new() -> Self {
        Self {
            config: NerConfig::default(),
        }
    }

    /// Start from an existing configuration.
    pub fn from_config(config: NerConfig) -> Self {
        Self { config }
    }

    /// Tag each instruction separately instead of whole hypotheses.
    pub fn with_parse_per_instruction(mut self, enabled: bool) -> Self {
        self.config.parse_per_instruction = enabled;
        self
    }

    /// Tag up to `limit` hypotheses at the same time.
    pub fn with_max_concurrent_hypotheses(mut self, limit: usize) -> Self {
        self.config.max_concurrent_hypotheses = limit;
        self
    }

    /// Set the tagger program.
    pub fn with_program<P: AsRef<Path>>(mut self, program: P) -> Self {
        self.config.tagger.program = program.as_ref().to_path_buf();
        self
    }

    /// Replace the tagger arguments.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.tagger.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Run the tagger from this directory.
    pub fn with_working_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.config.tagger.working_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Choose how the input file is handed to the tagger.
    pub fn with_input_mode(mut self, mode: InputMode) -> Self {
        self.config.tagger.input_mode = mode;
        self
    }

    /// Read labels from this output column.
    pub fn with_label_column(mut self, column: usize) -> Self {
        self.config.tagger.label_column = column;
        self
    }

    /// Limit the run time of a single tagger invocation.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.tagger.timeout = timeout;
        self
    }

    /// Create input files in this directory.
    pub fn with_temp_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.config.tagger.temp_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Keep input files after each run.
    pub fn keep_temp_files(mut self, keep: bool) -> Self {
        self.config.tagger.keep_temp_files = keep;
        self
    }

    /// Set the log level.
    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.config.logging.level = level;
        self
    }

    /// Set the log format.
    pub fn with_log_format(mut self, format: LogFormat) -> Self {
        self.config.logging.format = format;
        self
    }

    /// Configure logging to a file.
    pub fn with_log_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config.logging.file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Configuration for local development.
    ///
    /// - Debug-level pretty logging
    /// - Input files are kept for inspection
    pub fn development() -> Self {
        Self::new()
            .with_log_level(LogLevel::Debug)
            .with_log_format(LogFormat::Pretty)
            .keep_temp_files(true)
    }

    /// Configuration for automated testing.
    ///
    /// - Warn-level compact logging
    /// - Short timeout so a stuck tagger fails the test quickly
    pub fn testing() -> Self {
        Self::new()
            .with_log_level(LogLevel::Warn)
            .with_log_format(LogFormat::Compact)
            .with_timeout(Duration::from_secs(10))
    }

    /// Build and validate the configuration.
    pub fn build(self) -> Result<NerConfig> {
        validation::validate_config(&self.config)?;
        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
