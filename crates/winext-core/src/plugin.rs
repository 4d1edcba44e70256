//! Plugin capability traits.
//!
//! Each [`Category`](crate::Category) has a capability trait. All of them
//! extend [`Registerable`]; store-like categories add lifecycle operations
//! and nested sub-components.
//!
//! ```text
//! Registerable ─┬─ LoggerPlugin          get_logger / get_log_tracer
//!               ├─ ErrorManagerPlugin    required_module / config_not_found
//!               ├─ KeyManagerPlugin
//!               ├─ ApiGatewayPlugin
//!               ├─ ServiceRegistryPlugin
//!               ├─ RepoStorePlugin       startup / shutdown per StoreBackend
//!               ├─ RedisStorePlugin      + Startable
//!               ├─ AuthorizationPlugin   token_generator sub-component
//!               ├─ MappingStorePlugin
//!               └─ ServerPlugin          + Startable
//! ```

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::Level;

use crate::bundle::Bundle;
use crate::context::TraceContext;
use crate::error::{BoxError, ManagedError, PluginResult};

// =============================================================================
// Base capabilities
// =============================================================================

/// A module that accepts a parameter bundle.
///
/// `register` is side-effecting and is called exactly once per composition.
/// Returning `Err` fails the whole composition.
pub trait Registerable: Send + Sync {
    fn register(&self, bundle: &Bundle) -> PluginResult<()>;
}

/// A module with a start/stop lifecycle.
#[async_trait]
pub trait Startable: Send + Sync {
    async fn start(&self) -> PluginResult<()>;

    async fn stop(&self) -> PluginResult<()>;
}

/// A nested component owned by a parent plugin.
pub type SubComponent = Arc<dyn Registerable>;

// =============================================================================
// Logger
// =============================================================================

/// A logger bound to one scope (usually the consuming category's config key).
pub trait ScopedLogger: Send + Sync {
    /// Scope this logger writes under.
    fn scope(&self) -> &str;

    /// Request id, for tracer handles.
    fn request_id(&self) -> Option<&str> {
        None
    }

    fn log(&self, level: Level, message: &str);

    fn debug(&self, message: &str) {
        self.log(Level::DEBUG, message);
    }

    fn info(&self, message: &str) {
        self.log(Level::INFO, message);
    }

    fn warn(&self, message: &str) {
        self.log(Level::WARN, message);
    }

    fn error(&self, message: &str) {
        self.log(Level::ERROR, message);
    }
}

/// Handle returned by [`LoggerPlugin::get_logger`].
pub type LoggerHandle = Arc<dyn ScopedLogger>;

/// Handle returned by [`LoggerPlugin::get_log_tracer`].
pub type TracerHandle = Arc<dyn ScopedLogger>;

/// The logging plugin. Always wired first.
pub trait LoggerPlugin: Registerable {
    fn get_logger(&self, scope: &str) -> LoggerHandle;

    fn get_log_tracer(&self, scope: &str, trace: &TraceContext) -> TracerHandle;
}

// =============================================================================
// Error manager
// =============================================================================

/// The error-management plugin. Always wired second.
///
/// After it is registered the container reports every fatal condition
/// through it.
pub trait ErrorManagerPlugin: Registerable {
    fn required_module(&self, cause: BoxError, module: &str) -> ManagedError;

    fn config_not_found(&self, cause: BoxError) -> ManagedError;
}

// =============================================================================
// Optional categories
// =============================================================================

/// Provider of cryptographic key material.
pub trait KeyManagerPlugin: Registerable {}

/// API gateway plugin.
pub trait ApiGatewayPlugin: Registerable {}

/// Service registry plugin.
pub trait ServiceRegistryPlugin: Registerable {}

/// Routing-table and message-code store.
pub trait MappingStorePlugin: Registerable {}

/// Backend technologies managed by a [`RepoStorePlugin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreBackend {
    /// Document database (model key `mongo`).
    Document,
    /// Relational database (model key `sql`).
    Relational,
    /// Graph-query store (model key `graphql`).
    Graph,
}

impl StoreBackend {
    pub const ALL: [StoreBackend; 3] = [Self::Document, Self::Relational, Self::Graph];

    /// Logger scope used for this backend's sub-component.
    pub const fn scope(self) -> &'static str {
        match self {
            Self::Document => "data_store_trigger",
            Self::Relational => "data_sequelize_trigger",
            Self::Graph => "data_graphql_trigger",
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Document => "document",
            Self::Relational => "relational",
            Self::Graph => "graph",
        })
    }
}

/// Repository plugin composed of one sub-store per [`StoreBackend`].
///
/// The parent is registered before its sub-stores.
#[async_trait]
pub trait RepoStorePlugin: Registerable {
    /// Sub-component for `backend`.
    fn sub_store(&self, backend: StoreBackend) -> SubComponent;

    async fn startup(&self, backend: StoreBackend) -> PluginResult<()>;

    async fn shutdown(&self, backend: StoreBackend) -> PluginResult<()>;
}

/// Cache store plugin.
pub trait RedisStorePlugin: Registerable + Startable {}

/// Authorization plugin with a token-generator sub-component.
pub trait AuthorizationPlugin: Registerable {
    fn token_generator(&self) -> SubComponent;
}

/// The terminal server plugin. Its `start` is the only operation that is
/// expected to perform externally observable I/O.
pub trait ServerPlugin: Registerable + Startable {}
