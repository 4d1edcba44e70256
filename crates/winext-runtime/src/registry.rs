//! Module registry: resolves plugin identifiers to implementations.
//!
//! Instead of looking modules up by name at runtime, callers populate a
//! [`ModuleRegistry`] with one implementation per [`Category`] (real plugins
//! or test doubles) plus any model-descriptor modules. The composition
//! driver then resolves identifiers against it.
//!
//! ```rust,ignore
//! let registry = ModuleRegistry::new()
//!     .with_logger(Arc::new(TracingLogger::new()))
//!     .with_error_manager(Arc::new(StandardErrorManager::new()))
//!     .with_model("app-models-mongo", json!([{ "name": "User" }]));
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, trace};
use winext_core::{
    ApiGatewayPlugin, AuthorizationPlugin, Category, ErrorManagerPlugin, KeyManagerPlugin,
    LoggerPlugin, MappingStorePlugin, RedisStorePlugin, RepoStorePlugin, ServerPlugin,
    ServiceRegistryPlugin,
};

use crate::error::{LoaderError, LoaderResult, LookupFailure};

/// A resolved plugin module.
#[derive(Clone)]
pub enum PluginModule {
    Logger(Arc<dyn LoggerPlugin>),
    ErrorManager(Arc<dyn ErrorManagerPlugin>),
    KeyManager(Arc<dyn KeyManagerPlugin>),
    ApiGateway(Arc<dyn ApiGatewayPlugin>),
    ServiceRegistry(Arc<dyn ServiceRegistryPlugin>),
    RepoStore(Arc<dyn RepoStorePlugin>),
    RedisStore(Arc<dyn RedisStorePlugin>),
    Authorization(Arc<dyn AuthorizationPlugin>),
    MappingStore(Arc<dyn MappingStorePlugin>),
    Server(Arc<dyn ServerPlugin>),
}

impl PluginModule {
    /// Category this module implements.
    pub fn category(&self) -> Category {
        match self {
            Self::Logger(_) => Category::Logger,
            Self::ErrorManager(_) => Category::ErrorManager,
            Self::KeyManager(_) => Category::KeyManager,
            Self::ApiGateway(_) => Category::ApiGateway,
            Self::ServiceRegistry(_) => Category::ServiceRegistry,
            Self::RepoStore(_) => Category::RepoStore,
            Self::RedisStore(_) => Category::RedisStore,
            Self::Authorization(_) => Category::Authorization,
            Self::MappingStore(_) => Category::MappingStore,
            Self::Server(_) => Category::Server,
        }
    }
}

impl std::fmt::Debug for PluginModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("PluginModule").field(&self.category()).finish()
    }
}

/// Generates the typed builder and accessor for one category slot.
macro_rules! module_slot {
    ($field:ident, $with:ident, $trait_:ident, $variant:ident) => {
        #[doc = concat!("Provides the `", stringify!($field), "` implementation.")]
        pub fn $with(mut self, module: Arc<dyn $trait_>) -> Self {
            self.$field = Some(module);
            self
        }

        #[doc = concat!("Resolves the `", stringify!($field), "` implementation.")]
        pub fn $field(&self) -> LoaderResult<Arc<dyn $trait_>> {
            let category = Category::$variant;
            trace!(module = %category, "Resolving module");
            self.$field
                .clone()
                .ok_or_else(|| not_provided(category.identifier()))
        }
    };
}

/// Registry of plugin implementations and model-descriptor modules.
#[derive(Default, Clone)]
pub struct ModuleRegistry {
    logger: Option<Arc<dyn LoggerPlugin>>,
    error_manager: Option<Arc<dyn ErrorManagerPlugin>>,
    key_manager: Option<Arc<dyn KeyManagerPlugin>>,
    api_gateway: Option<Arc<dyn ApiGatewayPlugin>>,
    service_registry: Option<Arc<dyn ServiceRegistryPlugin>>,
    repo_store: Option<Arc<dyn RepoStorePlugin>>,
    redis_store: Option<Arc<dyn RedisStorePlugin>>,
    authorization: Option<Arc<dyn AuthorizationPlugin>>,
    mapping_store: Option<Arc<dyn MappingStorePlugin>>,
    server: Option<Arc<dyn ServerPlugin>>,
    /// Model module identifier → loaded descriptors.
    models: HashMap<String, Arc<Value>>,
}

impl ModuleRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    module_slot!(logger, with_logger, LoggerPlugin, Logger);
    module_slot!(error_manager, with_error_manager, ErrorManagerPlugin, ErrorManager);
    module_slot!(key_manager, with_key_manager, KeyManagerPlugin, KeyManager);
    module_slot!(api_gateway, with_api_gateway, ApiGatewayPlugin, ApiGateway);
    module_slot!(service_registry, with_service_registry, ServiceRegistryPlugin, ServiceRegistry);
    module_slot!(repo_store, with_repo_store, RepoStorePlugin, RepoStore);
    module_slot!(redis_store, with_redis_store, RedisStorePlugin, RedisStore);
    module_slot!(authorization, with_authorization, AuthorizationPlugin, Authorization);
    module_slot!(mapping_store, with_mapping_store, MappingStorePlugin, MappingStore);
    module_slot!(server, with_server, ServerPlugin, Server);

    /// Provides a module, replacing any earlier one of the same category.
    pub fn provide(&mut self, module: PluginModule) {
        debug!(module = %module.category(), "Module provided");
        match module {
            PluginModule::Logger(m) => self.logger = Some(m),
            PluginModule::ErrorManager(m) => self.error_manager = Some(m),
            PluginModule::KeyManager(m) => self.key_manager = Some(m),
            PluginModule::ApiGateway(m) => self.api_gateway = Some(m),
            PluginModule::ServiceRegistry(m) => self.service_registry = Some(m),
            PluginModule::RepoStore(m) => self.repo_store = Some(m),
            PluginModule::RedisStore(m) => self.redis_store = Some(m),
            PluginModule::Authorization(m) => self.authorization = Some(m),
            PluginModule::MappingStore(m) => self.mapping_store = Some(m),
            PluginModule::Server(m) => self.server = Some(m),
        }
    }

    /// Provides a model-descriptor module under `identifier`.
    pub fn with_model(mut self, identifier: impl Into<String>, descriptors: Value) -> Self {
        self.models.insert(identifier.into(), Arc::new(descriptors));
        self
    }

    /// Resolves a plugin identifier such as `winext-repo-store`.
    pub fn resolve(&self, identifier: &str) -> LoaderResult<PluginModule> {
        let category = Category::from_identifier(identifier).ok_or_else(|| {
            LoaderError::ModuleNotFound {
                identifier: identifier.to_string(),
                source: LookupFailure::UnknownIdentifier(identifier.to_string()),
            }
        })?;
        self.resolve_category(category)
    }

    /// Resolves the implementation for `category`.
    pub fn resolve_category(&self, category: Category) -> LoaderResult<PluginModule> {
        Ok(match category {
            Category::Logger => PluginModule::Logger(self.logger()?),
            Category::ErrorManager => PluginModule::ErrorManager(self.error_manager()?),
            Category::KeyManager => PluginModule::KeyManager(self.key_manager()?),
            Category::ApiGateway => PluginModule::ApiGateway(self.api_gateway()?),
            Category::ServiceRegistry => PluginModule::ServiceRegistry(self.service_registry()?),
            Category::RepoStore => PluginModule::RepoStore(self.repo_store()?),
            Category::RedisStore => PluginModule::RedisStore(self.redis_store()?),
            Category::Authorization => PluginModule::Authorization(self.authorization()?),
            Category::MappingStore => PluginModule::MappingStore(self.mapping_store()?),
            Category::Server => PluginModule::Server(self.server()?),
        })
    }

    /// Resolves a model-descriptor module.
    pub fn resolve_model(&self, identifier: &str) -> LoaderResult<Arc<Value>> {
        self.models.get(identifier).cloned().ok_or_else(|| LoaderError::ModuleNotFound {
            identifier: identifier.to_string(),
            source: LookupFailure::UnknownIdentifier(identifier.to_string()),
        })
    }

    /// Categories with an implementation, in build order.
    pub fn provided(&self) -> Vec<Category> {
        Category::BUILD_ORDER
            .into_iter()
            .filter(|c| self.resolve_category(*c).is_ok())
            .collect()
    }
}

fn not_provided(identifier: &str) -> LoaderError {
    LoaderError::ModuleNotFound {
        identifier: identifier.to_string(),
        source: LookupFailure::NotProvided(identifier.to_string()),
    }
}
