//! # winext Core
//!
//! Contracts shared by the winext composition container and the plugins it
//! wires together.
//!
//! - **Categories**: the closed set of plugin kinds and their fixed build
//!   order ([`Category`])
//! - **Capabilities**: [`Registerable`], [`Startable`] and one trait per
//!   category ([`LoggerPlugin`], [`ErrorManagerPlugin`], [`RepoStorePlugin`], …)
//! - **Bundles**: the parameter object handed to `register` ([`Bundle`])
//! - **Context**: explicit per-composition request context ([`TraceContext`])
//! - **Errors**: [`PluginError`] for plugin failures, [`ManagedError`] for
//!   failures re-raised through the error manager
//!
//! ## Implementing a plugin
//!
//! ```rust,ignore
//! use winext_core::{Bundle, PluginResult, Registerable, MappingStorePlugin};
//!
//! struct Mappings;
//!
//! impl Registerable for Mappings {
//!     fn register(&self, bundle: &Bundle) -> PluginResult<()> {
//!         let logger = bundle.require_logger()?;
//!         logger.info("mapping store registered");
//!         Ok(())
//!     }
//! }
//!
//! impl MappingStorePlugin for Mappings {}
//! ```

pub mod bundle;
pub mod category;
pub mod context;
pub mod error;
pub mod plugin;

pub use bundle::{Bundle, UpstreamHandles};
pub use category::{Category, UnknownCategory, normalize_key};
pub use context::{TraceContext, generate_request_id};
pub use error::{BoxError, ManagedError, ManagedErrorKind, PluginError, PluginResult};
pub use plugin::{
    ApiGatewayPlugin, AuthorizationPlugin, ErrorManagerPlugin, KeyManagerPlugin, LoggerHandle,
    LoggerPlugin, MappingStorePlugin, RedisStorePlugin, Registerable, RepoStorePlugin,
    ScopedLogger, ServerPlugin, ServiceRegistryPlugin, Startable, StoreBackend, SubComponent,
    TracerHandle,
};

// Re-export for plugin implementations of `Startable`.
pub use async_trait::async_trait;
