//! # winext
//!
//! A plugin-composition container: given a sandbox configuration and the
//! list of plugins available at runtime, it validates the configuration,
//! wires every declared infrastructure plugin in a fixed build order and
//! returns an application handle exposing each one.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐    ┌───────────┐    ┌──────────────────┐    ┌───────────────────┐
//! │ SandboxConfig│───▶│ Validator │───▶│ Composition      │───▶│ ApplicationHandle │
//! │ Declared list│    │           │    │ driver           │    │ logger, server, … │
//! └──────────────┘    └───────────┘    │  ├ ModuleRegistry│    └───────────────────┘
//!                                      │  └ Propagator    │
//!                                      └──────────────────┘
//! ```
//!
//! - **Categories**: the closed set of plugin kinds, each with a capability trait
//! - **Registry**: caller-populated implementations (real plugins or test doubles)
//! - **Propagator**: builds each plugin's bundle from what is already wired
//! - **Driver**: logger, error manager, then every declared category in order
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use winext::prelude::*;
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
//!     app.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `builtin`: `TracingLogger` and `StandardErrorManager` (default)
//! - `toml-config`: TOML sandbox files (default)
//! - `yaml-config`: YAML sandbox files
//! - `json-log`: JSON log output

pub use winext_core as core;
pub use winext_runtime as runtime;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use winext::prelude::*;
/// ```
pub mod prelude {
    // Composition - main entry point
    pub use winext_runtime::{
        ApplicationHandle, ComposeError, Container, ModuleRegistry, compose,
    };

    // Configuration
    pub use winext_runtime::{DeclaredPlugins, ModelRefs, SandboxConfig, load_config};

    // Plugin contracts
    pub use winext_core::{
        ApiGatewayPlugin, AuthorizationPlugin, Bundle, Category, ErrorManagerPlugin,
        KeyManagerPlugin, LoggerPlugin, MappingStorePlugin, PluginError, PluginResult,
        RedisStorePlugin, Registerable, RepoStorePlugin, ServerPlugin, ServiceRegistryPlugin,
        Startable, StoreBackend, async_trait,
    };

    // Built-in plugins
    #[cfg(feature = "builtin")]
    pub use winext_runtime::builtin::{StandardErrorManager, TracingLogger};
}
