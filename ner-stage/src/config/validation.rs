//! Configuration validation utilities.

use super::ConfigError;
use super::models::*;

/// Validate the entire configuration.
pub fn validate_config(config: &NerConfig) -> Result<(), ConfigError> {
    if config.max_concurrent_hypotheses == 0 {
        return Err(ConfigError::ValidationError(
            "max_concurrent_hypotheses must be at least 1".to_string(),
        ));
    }

    validate_tagger_config(&config.tagger)?;

    Ok(())
}

/// Validate tagger configuration.
fn validate_tagger_config(config: &TaggerConfig) -> Result<(), ConfigError> {
    if config.program.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "Tagger program cannot be empty".to_string(),
        ));
    }

    if config.timeout.is_zero() {
        return Err(ConfigError::ValidationError(
            "Tagger timeout must be greater than 0".to_string(),
        ));
    }

    // Column 0 is the word itself
    if config.label_column == 0 {
        return Err(ConfigError::ValidationError(
            "label_column must be at least 1".to_string(),
        ));
    }

    if let Some(dir) = &config.temp_dir
        && dir.as_os_str().is_empty()
    {
        return Err(ConfigError::ValidationError(
            "temp_dir cannot be empty when set".to_string(),
        ));
    }

    Ok(())
}
