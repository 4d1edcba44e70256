//! winext Runtime - composition driver for the winext plugin container.
//!
//! This crate provides:
//! - Sandbox configuration loading and validation (`config`)
//! - Module resolution against a caller-populated registry (`ModuleRegistry`)
//! - Per-stage bundle construction (`ContextPropagator`)
//! - The composition driver (`Container`, `compose`)
//! - The composed application and its lifecycle (`ApplicationHandle`)
//! - Logging configuration and built-in logger / error-manager plugins
//!
//! # Composing an application
//!
//! ```ignore
//! use std::sync::Arc;
//! use winext_runtime::builtin::{StandardErrorManager, TracingLogger};
//! use winext_runtime::{Container, DeclaredPlugins, ModelRefs, ModuleRegistry, load_config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let sandbox = load_config()?;
//!     let registry = ModuleRegistry::new()
//!         .with_logger(Arc::new(TracingLogger::new()))
//!         .with_error_manager(Arc::new(StandardErrorManager::new()))
//!         .with_server(Arc::new(MyServer::default()));
//!
//!     let declared: DeclaredPlugins =
//!         ["winext-logger", "winext-error-manager", "winext-runserver"].into_iter().collect();
//!
//!     let app = Container::new(registry).compose(&sandbox, &declared, &ModelRefs::default())?;
//!
//!     // Start stores and server, run until Ctrl+C, then stop in reverse.
//!     app.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Build order
//!
//! Plugins are wired in [`Category::BUILD_ORDER`](winext_core::Category::BUILD_ORDER):
//! logger, error manager, key manager, API gateway, service registry,
//! repository store (then its document, relational and graph sub-stores),
//! redis store, authorization (then its token generator), mapping store,
//! server. Undeclared categories are skipped.

pub mod application;
#[cfg(feature = "builtin")]
pub mod builtin;
pub mod config;
pub mod container;
pub mod error;
pub mod logging;
pub mod propagate;
pub mod registry;

// Re-exports
pub use application::{
    ApplicationBuilder, ApplicationHandle, RedisStoreHandle, RepoStoreHandle, ServerHandle,
};
pub use config::{
    ConfigError, ConfigLoader, ConfigResult, DeclaredPlugins, ModelRefs, Profile, SandboxConfig,
    ValidationError, load_config, load_config_from_file, validate_sandbox,
};
pub use container::{Container, compose};
pub use error::{
    ComposeError, ComposeResult, ErrorKind, LoaderError, LoaderResult, LookupFailure,
    RuntimeError, RuntimeResult,
};
pub use logging::{LoggingBuilder, SpanEvents};
pub use propagate::ContextPropagator;
pub use registry::{ModuleRegistry, PluginModule};

// Re-export tracing for use by plugin crates
pub use tracing;
pub use tracing_subscriber;

/// Prelude module for convenient imports.
///
/// Provides the commonly used logging macros:
/// - `trace!`, `debug!`, `info!`, `warn!`, `error!`
/// - `span`, `event`
/// - `instrument` attribute
/// - `Level` for span creation
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
