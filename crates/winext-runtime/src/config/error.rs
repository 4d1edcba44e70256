//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading a sandbox configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// File not found at the specified path.
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    /// The sources could not be merged or extracted.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Violations found by the dependency validator.
///
/// Checks run in declaration order and the first violation wins.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The sandbox document is empty.
    #[error("Sandbox configuration not found")]
    SandboxConfigNotFound,

    /// The sandbox has no (or an empty) `application` section.
    #[error("Application configuration not found in sandbox")]
    ApplicationConfigNotFound,

    /// `application.dependencies` is missing or empty.
    #[error("Plugin configuration not found in application dependencies")]
    PluginConfigNotFoundInApplications,

    /// The declared-plugin list is empty.
    #[error("No plugins declared")]
    DependenciesNotFound,

    /// A configured plugin was not declared.
    #[error("Module '{plugin}' is configured but not declared")]
    NotFoundModuleInDependencies {
        /// Hyphen-normalized identifier of the configured plugin.
        plugin: String,
    },
}

/// Result type for validation.
pub type ValidationResult<T> = Result<T, ValidationError>;
