//! Bundle construction for each build stage.
//!
//! A [`ContextPropagator`] holds what composition has wired so far (the
//! logger and error manager) and turns it, together with the sandbox, into
//! the [`Bundle`] a plugin receives. Fields are only populated from sources
//! that already exist at that stage.

use std::sync::Arc;

use serde_json::Value;
use winext_core::{
    Bundle, Category, ErrorManagerPlugin, LoggerPlugin, StoreBackend, TraceContext,
    UpstreamHandles,
};

use crate::config::SandboxConfig;

/// Logger scope of the authorization plugin's token generator.
pub const TOKEN_GENERATOR_SCOPE: &str = "token_generator";

/// Builds per-stage bundles for one composition.
pub struct ContextPropagator<'a> {
    sandbox: &'a SandboxConfig,
    trace: TraceContext,
    logger: Option<Arc<dyn LoggerPlugin>>,
    error_manager: Option<Arc<dyn ErrorManagerPlugin>>,
}

impl<'a> ContextPropagator<'a> {
    pub fn new(sandbox: &'a SandboxConfig, trace: TraceContext) -> Self {
        Self {
            sandbox,
            trace,
            logger: None,
            error_manager: None,
        }
    }

    /// Makes the registered logger available to later bundles.
    pub fn set_logger(&mut self, logger: Arc<dyn LoggerPlugin>) {
        self.logger = Some(logger);
    }

    /// Makes the registered error manager available to later bundles.
    pub fn set_error_manager(&mut self, error_manager: Arc<dyn ErrorManagerPlugin>) {
        self.error_manager = Some(error_manager);
    }

    pub fn trace(&self) -> &TraceContext {
        &self.trace
    }

    /// Bundle for a top-level category.
    ///
    /// `wired` holds every optional plugin registered so far; only the
    /// handles `category` consumes are copied into the bundle.
    pub fn category_bundle(&self, category: Category, wired: &UpstreamHandles) -> Bundle {
        let config = self.sandbox.dependency(category).cloned();
        let bundle = self.base(category.config_key(), config);

        match category {
            Category::Logger
            | Category::KeyManager
            | Category::ServiceRegistry
            | Category::RepoStore
            | Category::RedisStore
            | Category::Authorization => bundle,
            Category::ErrorManager => {
                bundle.with_error_codes(self.sandbox.error_codes().cloned())
            }
            Category::ApiGateway => bundle.with_authorization_config(
                self.sandbox.dependency(Category::Authorization).cloned(),
            ),
            Category::MappingStore => bundle
                .with_router_mappings(
                    self.mapping_table("routerMappings", self.sandbox.router_mappings()),
                )
                .with_message_codes(
                    self.mapping_table("messageCodes", self.sandbox.message_codes()),
                )
                .with_upstream(UpstreamHandles {
                    repo_store: wired.repo_store.clone(),
                    redis_store: wired.redis_store.clone(),
                    authorization: wired.authorization.clone(),
                    ..Default::default()
                }),
            Category::Server => bundle.with_upstream(UpstreamHandles {
                key_manager: wired.key_manager.clone(),
                api_gateway: wired.api_gateway.clone(),
                service_registry: wired.service_registry.clone(),
                repo_store: wired.repo_store.clone(),
                redis_store: wired.redis_store.clone(),
                mapping_store: wired.mapping_store.clone(),
                authorization: None,
            }),
        }
    }

    /// Bundle for one repository sub-store.
    ///
    /// Sub-stores share the repository's config sub-tree and receive the
    /// model descriptors for their backend.
    pub fn sub_store_bundle(&self, backend: StoreBackend, descriptor: Arc<Value>) -> Bundle {
        let config = self.sandbox.dependency(Category::RepoStore).cloned();
        self.base(backend.scope(), config)
            .with_model_descriptor(descriptor)
    }

    /// Bundle for the authorization plugin's token generator.
    pub fn token_generator_bundle(&self) -> Bundle {
        let config = self.sandbox.dependency(Category::Authorization).cloned();
        self.base(TOKEN_GENERATOR_SCOPE, config)
    }

    fn base(&self, scope: &str, config: Option<Value>) -> Bundle {
        let mut bundle = Bundle::new(scope, self.trace.clone()).with_config(config);
        if let Some(logger) = &self.logger {
            bundle = bundle.with_logger(
                logger.get_logger(scope),
                logger.get_log_tracer(scope, &self.trace),
            );
        }
        if let Some(error_manager) = &self.error_manager {
            bundle = bundle.with_error_manager(error_manager.clone());
        }
        bundle
    }

    /// Mapping-store table, preferring its own config sub-tree.
    fn mapping_table(&self, key: &str, fallback: Option<&Value>) -> Option<Value> {
        self.sandbox
            .dependency(Category::MappingStore)
            .and_then(|config| config.get(key))
            .or(fallback)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use tracing::Level;
    use winext_core::{
        BoxError, LoggerHandle, ManagedError, PluginResult, Registerable, ScopedLogger,
        TracerHandle,
    };

    struct Scoped(String, Option<String>);

    impl ScopedLogger for Scoped {
        fn scope(&self) -> &str {
            &self.0
        }

        fn request_id(&self) -> Option<&str> {
            self.1.as_deref()
        }

        fn log(&self, _level: Level, _message: &str) {}
    }

    struct Logger;

    impl Registerable for Logger {
        fn register(&self, _bundle: &Bundle) -> PluginResult<()> {
            Ok(())
        }
    }

    impl LoggerPlugin for Logger {
        fn get_logger(&self, scope: &str) -> LoggerHandle {
            Arc::new(Scoped(scope.to_string(), None))
        }

        fn get_log_tracer(&self, scope: &str, trace: &TraceContext) -> TracerHandle {
            Arc::new(Scoped(scope.to_string(), Some(trace.request_id().to_string())))
        }
    }

    struct Errors;

    impl Registerable for Errors {
        fn register(&self, _bundle: &Bundle) -> PluginResult<()> {
            Ok(())
        }
    }

    impl ErrorManagerPlugin for Errors {
        fn required_module(&self, cause: BoxError, module: &str) -> ManagedError {
            ManagedError::required_module(cause, module)
        }

        fn config_not_found(&self, cause: BoxError) -> ManagedError {
            ManagedError::config_not_found(cause)
        }
    }

    fn sandbox() -> SandboxConfig {
        serde_json::from_value(json!({
            "application": {
                "dependencies": {
                    "winext_logger": { "level": "debug" },
                    "winext_repo_store": { "uri": "mongodb://localhost" },
                    "winext_authorization": { "secret": "s3cret" },
                    "winext_mapping_store": { "messageCodes": { "OK": 0 } }
                },
                "routerMappings": { "/ping": "ping" },
                "errorCodes": { "E1": "boom" }
            },
            "messageCodes": { "OK": 200 }
        }))
        .unwrap()
    }

    #[test]
    fn test_logger_bundle_has_no_handles() {
        let sb = sandbox();
        let propagator = ContextPropagator::new(&sb, TraceContext::with_request_id("req"));
        let bundle = propagator.category_bundle(Category::Logger, &UpstreamHandles::default());

        assert_eq!(bundle.scope(), "winext_logger");
        assert_eq!(bundle.config(), Some(&json!({ "level": "debug" })));
        assert!(bundle.logger_factory().is_none());
        assert!(bundle.error_manager().is_none());
    }

    #[test]
    fn test_bundles_carry_wired_logger_and_error_manager() {
        let sb = sandbox();
        let mut propagator = ContextPropagator::new(&sb, TraceContext::with_request_id("req"));
        propagator.set_logger(Arc::new(Logger));

        let em_bundle =
            propagator.category_bundle(Category::ErrorManager, &UpstreamHandles::default());
        assert_eq!(em_bundle.error_codes(), Some(&json!({ "E1": "boom" })));
        assert!(em_bundle.error_manager().is_none());

        propagator.set_error_manager(Arc::new(Errors));
        let bundle = propagator.category_bundle(Category::RedisStore, &UpstreamHandles::default());
        assert_eq!(bundle.logger_factory().unwrap().scope(), "winext_redis_store");
        assert_eq!(bundle.logger_tracer().unwrap().request_id(), Some("req"));
        assert!(bundle.error_manager().is_some());
        assert!(bundle.config().is_none());
    }

    #[test]
    fn test_mapping_store_tables() {
        let sb = sandbox();
        let propagator = ContextPropagator::new(&sb, TraceContext::default());
        let bundle =
            propagator.category_bundle(Category::MappingStore, &UpstreamHandles::default());

        assert_eq!(bundle.router_mappings(), Some(&json!({ "/ping": "ping" })));
        // Own sub-tree wins over the sandbox level.
        assert_eq!(bundle.message_codes(), Some(&json!({ "OK": 0 })));
    }

    #[test]
    fn test_api_gateway_gets_authorization_config() {
        let sb = sandbox();
        let propagator = ContextPropagator::new(&sb, TraceContext::default());
        let bundle = propagator.category_bundle(Category::ApiGateway, &UpstreamHandles::default());
        assert_eq!(
            bundle.authorization_config(),
            Some(&json!({ "secret": "s3cret" }))
        );
    }

    #[test]
    fn test_sub_component_bundles() {
        let sb = sandbox();
        let mut propagator = ContextPropagator::new(&sb, TraceContext::default());
        propagator.set_logger(Arc::new(Logger));

        let bundle = propagator.sub_store_bundle(StoreBackend::Relational, Arc::new(json!([])));
        assert_eq!(bundle.scope(), "data_sequelize_trigger");
        assert_eq!(bundle.config(), Some(&json!({ "uri": "mongodb://localhost" })));
        assert_eq!(bundle.model_descriptor().map(|d| &**d), Some(&json!([])));
        assert_eq!(
            bundle.logger_factory().unwrap().scope(),
            "data_sequelize_trigger"
        );

        let bundle = propagator.token_generator_bundle();
        assert_eq!(bundle.scope(), TOKEN_GENERATOR_SCOPE);
        assert_eq!(bundle.config(), Some(&json!({ "secret": "s3cret" })));
    }
}
