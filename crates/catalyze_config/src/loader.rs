//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::{ProjectConfig, MAX_STORE_CAPACITY};
use std::path::Path;

/// Name of the configuration file at the project root.
pub const CONFIG_FILE: &str = "catalyze.toml";

/// Loads and validates `catalyze.toml` from a project directory.
///
/// Reads `<project_dir>/catalyze.toml`, parses it, and validates required fields.
pub fn load_config(project_dir: &Path) -> Result<ProjectConfig, ConfigError> {
    load_config_file(&project_dir.join(CONFIG_FILE))
}

/// Loads and validates a configuration file at an explicit path.
pub fn load_config_file(path: &Path) -> Result<ProjectConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Parses and validates a `catalyze.toml` configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<ProjectConfig, ConfigError> {
    let config: ProjectConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates that required fields are present and configuration values are consistent.
fn validate_config(config: &ProjectConfig) -> Result<(), ConfigError> {
    if config.project.name.is_empty() {
        return Err(ConfigError::MissingField("project.name".to_string()));
    }
    if config.project.files.is_empty() {
        return Err(ConfigError::MissingField("project.files".to_string()));
    }
    if let Some(bad) = config.project.files.iter().find(|f| f.is_empty()) {
        return Err(ConfigError::ValidationError(format!(
            "project.files contains an empty path ({bad:?})"
        )));
    }
    if config.cache.path.is_empty() {
        return Err(ConfigError::MissingField("cache.path".to_string()));
    }
    if config.store.capacity == 0 {
        return Err(ConfigError::ValidationError(
            "store.capacity must be at least 1".to_string(),
        ));
    }
    if config.store.capacity > MAX_STORE_CAPACITY {
        return Err(ConfigError::ValidationError(format!(
            "store.capacity must be at most {MAX_STORE_CAPACITY}"
        )));
    }
    if config.store.arena_bytes == 0 {
        return Err(ConfigError::ValidationError(
            "store.arena_bytes must be at least 1".to_string(),
        ));
    }
    Ok(())
}
