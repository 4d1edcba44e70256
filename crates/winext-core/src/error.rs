//! Error types shared between the container and plugin implementations.
//!
//! - [`PluginError`] is what a plugin returns when it rejects a bundle or
//!   fails a lifecycle transition.
//! - [`ManagedError`] is what an error-manager plugin produces when the
//!   container asks it to classify a failure.

use thiserror::Error;

/// Boxed, thread-safe error used as the cause of managed errors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

// =============================================================================
// Plugin Errors
// =============================================================================

/// Errors raised by plugin implementations.
#[derive(Debug, Error)]
pub enum PluginError {
    /// The plugin rejected the bundle it was given.
    #[error("plugin '{scope}' rejected its bundle: {reason}")]
    InvalidBundle {
        /// Logger scope of the rejecting plugin or sub-component.
        scope: String,
        /// Why the bundle was rejected.
        reason: String,
    },

    /// A required field was absent from the bundle.
    #[error("plugin '{scope}' requires '{field}' in its bundle")]
    MissingField { scope: String, field: &'static str },

    /// The plugin's config sub-tree could not be deserialized.
    #[error("invalid config for '{scope}': {source}")]
    Config {
        scope: String,
        #[source]
        source: serde_json::Error,
    },

    /// A lifecycle operation was called before `register`.
    #[error("plugin '{0}' is not registered")]
    NotRegistered(String),

    /// Start or stop failed.
    #[error("lifecycle operation '{operation}' failed for '{scope}': {reason}")]
    Lifecycle {
        scope: String,
        operation: &'static str,
        reason: String,
    },

    /// Any other failure.
    #[error("{0}")]
    Custom(String),
}

impl PluginError {
    /// Creates an invalid-bundle error.
    pub fn invalid_bundle(scope: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidBundle {
            scope: scope.into(),
            reason: reason.into(),
        }
    }

    /// Creates a lifecycle error.
    pub fn lifecycle(
        scope: impl Into<String>,
        operation: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        Self::Lifecycle {
            scope: scope.into(),
            operation,
            reason: reason.into(),
        }
    }

    /// Creates a custom error.
    pub fn custom(msg: impl Into<String>) -> Self {
        Self::Custom(msg.into())
    }
}

/// Result type for plugin operations.
pub type PluginResult<T> = Result<T, PluginError>;

// =============================================================================
// Managed Errors
// =============================================================================

/// Classification attached to a [`ManagedError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManagedErrorKind {
    /// A module the application depends on could not be resolved.
    RequiredModule {
        /// Identifier of the missing module.
        module: String,
    },
    /// Configuration for a plugin was missing or rejected.
    ConfigNotFound,
}

/// A failure re-raised through the error-manager plugin.
///
/// Carries the original failure as its [`source`](std::error::Error::source).
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ManagedError {
    kind: ManagedErrorKind,
    message: String,
    code: Option<String>,
    #[source]
    cause: BoxError,
}

impl ManagedError {
    /// Creates a managed error with an explicit message.
    pub fn new(kind: ManagedErrorKind, message: impl Into<String>, cause: BoxError) -> Self {
        Self {
            kind,
            message: message.into(),
            code: None,
            cause,
        }
    }

    /// Creates a required-module error using the conventional message.
    pub fn required_module(cause: BoxError, module: impl Into<String>) -> Self {
        let module = module.into();
        let message = format!("Please install {module} in your package");
        Self::new(ManagedErrorKind::RequiredModule { module }, message, cause)
    }

    /// Creates a config-not-found error that reuses the cause's message.
    pub fn config_not_found(cause: BoxError) -> Self {
        let message = cause.to_string();
        Self::new(ManagedErrorKind::ConfigNotFound, message, cause)
    }

    /// Attaches an application-specific error code.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Returns the classification.
    pub fn kind(&self) -> &ManagedErrorKind {
        &self.kind
    }

    /// Returns the error code, if the error manager assigned one.
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    /// Returns the original failure.
    pub fn cause(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        self.cause.as_ref()
    }
}
