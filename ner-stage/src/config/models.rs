//! Configuration model definitions.
//!
//! This module contains the configuration structures for the stage, its
//! external tagger and logging.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NerConfig {
    /// Tag each instruction of a hypothesis as its own block.
    ///
    /// Only a case-insensitive `"true"` (or boolean `true`) enables this;
    /// any other value, including unparsable ones, means `false`.
    #[serde(
        alias = "PARSE_PER_INSTRUCTION",
        deserialize_with = "lenient_bool"
    )]
    pub parse_per_instruction: bool,

    /// Number of hypotheses tagged at the same time (1 = one after another)
    pub max_concurrent_hypotheses: usize,

    /// External tagger configuration
    pub tagger: TaggerConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Default for NerConfig {
    fn default() -> Self {
        Self {
            parse_per_instruction: false,
            max_concurrent_hypotheses: 1,
            tagger: TaggerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
        Other(serde::de::IgnoredAny),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(value) => value,
        Flag::Text(text) => text.trim().eq_ignore_ascii_case("true"),
        Flag::Other(_) => false,
    })
}

/// Configuration for the external tagger process.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TaggerConfig {
    /// Program to run
    pub program: PathBuf,

    /// Arguments passed before any input path
    pub args: Vec<String>,

    /// Working directory for the program (SENNA looks up its data here)
    pub working_dir: Option<PathBuf>,

    /// How the input file reaches the program
    pub input_mode: InputMode,

    /// Output column holding the label (column 0 is the word)
    pub label_column: usize,

    /// Maximum time a single run may take
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,

    /// Directory for input files (system temp dir if unset)
    pub temp_dir: Option<PathBuf>,

    /// Leave input files on disk after the run
    pub keep_temp_files: bool,
}

impl Default for TaggerConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("senna"),
            args: vec!["-usrtokens".to_string(), "-ner".to_string()],
            working_dir: None,
            input_mode: InputMode::Stdin,
            label_column: 1,
            timeout: Duration::from_secs(60),
            temp_dir: None,
            keep_temp_files: false,
        }
    }
}

/// How the tagger receives its input file.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    /// File contents are piped to stdin
    #[default]
    Stdin,

    /// File path is appended to the arguments
    Argument,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: LogLevel,

    /// Log format
    pub format: LogFormat,

    /// File to log to (if any)
    pub file: Option<PathBuf>,

    /// Whether to log to stdout
    pub stdout: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Default,
            file: None,
            stdout: true,
        }
    }
}

/// Log level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level
    Trace,

    /// Debug level
    Debug,

    /// Info level
    Info,

    /// Warn level
    Warn,

    /// Error level
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(format!("Invalid log level: {}", s)),
        }
    }
}

/// Log format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Default format
    Default,

    /// JSON format
    Json,

    /// Compact format
    Compact,

    /// Pretty format
    Pretty,
}
