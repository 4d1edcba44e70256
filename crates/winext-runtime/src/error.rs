//! Runtime error types.

use thiserror::Error;
use winext_core::{Category, ManagedError, ManagedErrorKind, PluginError};

use crate::config::ValidationError;

// =============================================================================
// Module loader
// =============================================================================

/// Why a lookup in the module registry failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupFailure {
    /// The identifier names no known category or model module.
    #[error("'{0}' is not a known module identifier")]
    UnknownIdentifier(String),

    /// The identifier is known but no implementation was provided.
    #[error("no implementation was provided for '{0}'")]
    NotProvided(String),
}

/// Errors raised by the module registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoaderError {
    /// The identifier could not be resolved.
    #[error("Module not found: {identifier}")]
    ModuleNotFound {
        identifier: String,
        #[source]
        source: LookupFailure,
    },
}

impl LoaderError {
    /// Returns the identifier that failed to resolve.
    pub fn identifier(&self) -> &str {
        match self {
            Self::ModuleNotFound { identifier, .. } => identifier,
        }
    }
}

/// Result type for module resolution.
pub type LoaderResult<T> = Result<T, LoaderError>;

// =============================================================================
// Composition
// =============================================================================

/// Errors that fail a composition call.
#[derive(Error, Debug)]
pub enum ComposeError {
    /// The sandbox or declared-plugin list is malformed.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A mandatory plugin was not declared or could not be resolved.
    ///
    /// `source` is `None` when the plugin was not declared at all.
    #[error("Please install {category} in your package")]
    RequiredModule {
        category: Category,
        #[source]
        source: Option<LoaderError>,
    },

    /// The logger or error manager failed to register.
    #[error("Failed to register {category}: {source}")]
    Register {
        category: Category,
        #[source]
        source: PluginError,
    },

    /// A failure re-raised through the error manager.
    #[error(transparent)]
    Managed(#[from] ManagedError),
}

/// Flat classification of every [`ComposeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    SandboxConfigNotFound,
    ApplicationConfigNotFound,
    PluginConfigNotFoundInApplications,
    DependenciesNotFound,
    NotFoundModuleInDependencies,
    RequiredModuleWinextLogger,
    RequiredModuleWinextErrorManager,
    RequiredModuleWinextKeyManager,
    ModuleNotFoundError,
    ConfigNotFound,
}

impl ComposeError {
    /// Maps this error onto the flat taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(err) => match err {
                ValidationError::SandboxConfigNotFound => ErrorKind::SandboxConfigNotFound,
                ValidationError::ApplicationConfigNotFound => ErrorKind::ApplicationConfigNotFound,
                ValidationError::PluginConfigNotFoundInApplications => {
                    ErrorKind::PluginConfigNotFoundInApplications
                }
                ValidationError::DependenciesNotFound => ErrorKind::DependenciesNotFound,
                ValidationError::NotFoundModuleInDependencies { .. } => {
                    ErrorKind::NotFoundModuleInDependencies
                }
            },
            Self::RequiredModule { category, .. } => required_module_kind(category.identifier()),
            Self::Register { .. } => ErrorKind::ConfigNotFound,
            Self::Managed(err) => match err.kind() {
                ManagedErrorKind::RequiredModule { module } => required_module_kind(module),
                ManagedErrorKind::ConfigNotFound => ErrorKind::ConfigNotFound,
            },
        }
    }
}

fn required_module_kind(identifier: &str) -> ErrorKind {
    match Category::from_identifier(identifier) {
        Some(Category::Logger) => ErrorKind::RequiredModuleWinextLogger,
        Some(Category::ErrorManager) => ErrorKind::RequiredModuleWinextErrorManager,
        Some(Category::KeyManager) => ErrorKind::RequiredModuleWinextKeyManager,
        _ => ErrorKind::ModuleNotFoundError,
    }
}

/// Result type for composition.
pub type ComposeResult<T> = Result<T, ComposeError>;

// =============================================================================
// Lifecycle
// =============================================================================

/// Errors raised while starting or stopping a composed application.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// A slot's start or stop operation failed.
    #[error("Lifecycle of '{slot}' failed: {source}")]
    Lifecycle {
        slot: &'static str,
        #[source]
        source: PluginError,
    },
}

/// Result type for lifecycle operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_module_kinds() {
        let err = ComposeError::RequiredModule {
            category: Category::Logger,
            source: None,
        };
        assert_eq!(err.kind(), ErrorKind::RequiredModuleWinextLogger);
        assert_eq!(err.to_string(), "Please install winext-logger in your package");

        let managed = ManagedError::required_module(
            Box::new(PluginError::custom("missing")),
            "winext-key-manager",
        );
        assert_eq!(
            ComposeError::from(managed).kind(),
            ErrorKind::RequiredModuleWinextKeyManager
        );

        let managed =
            ManagedError::required_module(Box::new(PluginError::custom("missing")), "winext-redis-store");
        assert_eq!(ComposeError::from(managed).kind(), ErrorKind::ModuleNotFoundError);
    }

    #[test]
    fn test_managed_config_kind() {
        let managed = ManagedError::config_not_found(Box::new(PluginError::custom("bad")));
        assert_eq!(ComposeError::from(managed).kind(), ErrorKind::ConfigNotFound);
    }

    #[test]
    fn test_register_failure_kind() {
        let err = ComposeError::Register {
            category: Category::Logger,
            source: PluginError::custom("bad level"),
        };
        assert_eq!(err.kind(), ErrorKind::ConfigNotFound);
        assert_eq!(err.to_string(), "Failed to register winext-logger: bad level");
    }

    #[test]
    fn test_loader_error_identifier() {
        let err = LoaderError::ModuleNotFound {
            identifier: "winext-foo".into(),
            source: LookupFailure::UnknownIdentifier("winext-foo".into()),
        };
        assert_eq!(err.identifier(), "winext-foo");

        let err = ComposeError::RequiredModule {
            category: Category::ErrorManager,
            source: Some(err),
        };
        assert_eq!(err.kind(), ErrorKind::RequiredModuleWinextErrorManager);
        assert!(std::error::Error::source(&err).is_some());
    }
}
