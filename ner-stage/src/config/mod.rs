//! Configuration for the NER stage.
//!
//! Settings are passed to the stage explicitly. They can be assembled with
//! [`ConfigBuilder`] or loaded from files and environment variables with
//! [`ConfigLoader`].

mod builder;
mod loader;
mod models;
mod validation;

pub use builder::ConfigBuilder;
pub use loader::ConfigLoader;
pub use models::*;
pub use validation::validate_config;

/// Default configuration file names that the loader will look for
pub const DEFAULT_CONFIG_FILES: &[&str] = &[
    "ner.toml",
    "ner.yaml",
    "ner.yml",
    "ner.json",
    ".ner/config.toml",
    ".ner/config.yaml",
    ".ner/config.yml",
    ".ner/config.json",
];

/// Environment variable prefix; nested keys are separated by `__`
/// (e.g. `NER_TAGGER__PROGRAM`)
pub const ENV_PREFIX: &str = "NER_";

/// Configuration error type
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Error occurred during file loading
    #[error("Failed to load configuration file: {0}")]
    FileLoadError(String),

    /// Error occurred during validation
    #[error("Configuration validation error: {0}")]
    ValidationError(String),

    /// Error occurred during parsing
    #[error("Configuration parsing error: {0}")]
    ParseError(String),
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;
