//! The parameter bundle handed to every `register` call.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::context::TraceContext;
use crate::error::{PluginError, PluginResult};
use crate::plugin::{
    ApiGatewayPlugin, AuthorizationPlugin, ErrorManagerPlugin, KeyManagerPlugin, LoggerHandle,
    MappingStorePlugin, RedisStorePlugin, RepoStorePlugin, ServiceRegistryPlugin, TracerHandle,
};

/// Upstream plugin handles a category may depend on.
///
/// Only handles that were wired before the consuming category are ever set.
#[derive(Clone, Default)]
pub struct UpstreamHandles {
    pub key_manager: Option<Arc<dyn KeyManagerPlugin>>,
    pub api_gateway: Option<Arc<dyn ApiGatewayPlugin>>,
    pub service_registry: Option<Arc<dyn ServiceRegistryPlugin>>,
    pub repo_store: Option<Arc<dyn RepoStorePlugin>>,
    pub redis_store: Option<Arc<dyn RedisStorePlugin>>,
    pub authorization: Option<Arc<dyn AuthorizationPlugin>>,
    pub mapping_store: Option<Arc<dyn MappingStorePlugin>>,
}

impl UpstreamHandles {
    /// Names of the populated handles, in build order.
    pub fn present(&self) -> Vec<&'static str> {
        [
            ("key_manager", self.key_manager.is_some()),
            ("api_gateway", self.api_gateway.is_some()),
            ("service_registry", self.service_registry.is_some()),
            ("repo_store", self.repo_store.is_some()),
            ("redis_store", self.redis_store.is_some()),
            ("authorization", self.authorization.is_some()),
            ("mapping_store", self.mapping_store.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, set)| set.then_some(name))
        .collect()
    }
}

/// Parameter bundle for one plugin or sub-component.
///
/// Every field except `scope` and `trace` is optional; the container only
/// fills a field from sources that are already wired.
#[derive(Clone)]
pub struct Bundle {
    scope: String,
    trace: TraceContext,
    config: Option<Value>,
    logger_factory: Option<LoggerHandle>,
    logger_tracer: Option<TracerHandle>,
    error_manager: Option<Arc<dyn ErrorManagerPlugin>>,
    model_descriptor: Option<Arc<Value>>,
    router_mappings: Option<Value>,
    message_codes: Option<Value>,
    error_codes: Option<Value>,
    authorization_config: Option<Value>,
    upstream: UpstreamHandles,
}

impl Bundle {
    /// Creates an empty bundle for `scope`.
    pub fn new(scope: impl Into<String>, trace: TraceContext) -> Self {
        Self {
            scope: scope.into(),
            trace,
            config: None,
            logger_factory: None,
            logger_tracer: None,
            error_manager: None,
            model_descriptor: None,
            router_mappings: None,
            message_codes: None,
            error_codes: None,
            authorization_config: None,
            upstream: UpstreamHandles::default(),
        }
    }

    pub fn with_config(mut self, config: Option<Value>) -> Self {
        self.config = config;
        self
    }

    pub fn with_logger(mut self, factory: LoggerHandle, tracer: TracerHandle) -> Self {
        self.logger_factory = Some(factory);
        self.logger_tracer = Some(tracer);
        self
    }

    pub fn with_error_manager(mut self, error_manager: Arc<dyn ErrorManagerPlugin>) -> Self {
        self.error_manager = Some(error_manager);
        self
    }

    pub fn with_model_descriptor(mut self, descriptor: Arc<Value>) -> Self {
        self.model_descriptor = Some(descriptor);
        self
    }

    pub fn with_router_mappings(mut self, mappings: Option<Value>) -> Self {
        self.router_mappings = mappings;
        self
    }

    pub fn with_message_codes(mut self, codes: Option<Value>) -> Self {
        self.message_codes = codes;
        self
    }

    pub fn with_error_codes(mut self, codes: Option<Value>) -> Self {
        self.error_codes = codes;
        self
    }

    pub fn with_authorization_config(mut self, config: Option<Value>) -> Self {
        self.authorization_config = config;
        self
    }

    pub fn with_upstream(mut self, upstream: UpstreamHandles) -> Self {
        self.upstream = upstream;
        self
    }

    /// Logger scope of the consuming plugin.
    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn trace(&self) -> &TraceContext {
        &self.trace
    }

    /// This category's config sub-tree.
    pub fn config(&self) -> Option<&Value> {
        self.config.as_ref()
    }

    pub fn logger_factory(&self) -> Option<&LoggerHandle> {
        self.logger_factory.as_ref()
    }

    pub fn logger_tracer(&self) -> Option<&TracerHandle> {
        self.logger_tracer.as_ref()
    }

    pub fn error_manager(&self) -> Option<&Arc<dyn ErrorManagerPlugin>> {
        self.error_manager.as_ref()
    }

    /// Model descriptors routed to this sub-component.
    pub fn model_descriptor(&self) -> Option<&Arc<Value>> {
        self.model_descriptor.as_ref()
    }

    pub fn router_mappings(&self) -> Option<&Value> {
        self.router_mappings.as_ref()
    }

    pub fn message_codes(&self) -> Option<&Value> {
        self.message_codes.as_ref()
    }

    pub fn error_codes(&self) -> Option<&Value> {
        self.error_codes.as_ref()
    }

    pub fn authorization_config(&self) -> Option<&Value> {
        self.authorization_config.as_ref()
    }

    pub fn upstream(&self) -> &UpstreamHandles {
        &self.upstream
    }

    /// Deserializes the config sub-tree into `T`.
    ///
    /// An absent sub-tree deserializes from an empty object, so structs whose
    /// fields all carry `#[serde(default)]` fall back to their defaults.
    pub fn config_as<T: DeserializeOwned>(&self) -> PluginResult<T> {
        let value = self
            .config
            .clone()
            .unwrap_or_else(|| Value::Object(Map::default()));
        serde_json::from_value(value).map_err(|source| PluginError::Config {
            scope: self.scope.clone(),
            source,
        })
    }

    /// Returns the logger factory or a [`PluginError::MissingField`].
    pub fn require_logger(&self) -> PluginResult<&LoggerHandle> {
        self.logger_factory.as_ref().ok_or(PluginError::MissingField {
            scope: self.scope.clone(),
            field: "logger_factory",
        })
    }

    /// Returns the error manager or a [`PluginError::MissingField`].
    pub fn require_error_manager(&self) -> PluginResult<&Arc<dyn ErrorManagerPlugin>> {
        self.error_manager.as_ref().ok_or(PluginError::MissingField {
            scope: self.scope.clone(),
            field: "error_manager",
        })
    }
}

impl fmt::Debug for Bundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bundle")
            .field("scope", &self.scope)
            .field("request_id", &self.trace.request_id())
            .field("config", &self.config)
            .field("logger_factory", &self.logger_factory.is_some())
            .field("logger_tracer", &self.logger_tracer.is_some())
            .field("error_manager", &self.error_manager.is_some())
            .field("model_descriptor", &self.model_descriptor)
            .field("router_mappings", &self.router_mappings.is_some())
            .field("message_codes", &self.message_codes.is_some())
            .field("error_codes", &self.error_codes.is_some())
            .field("authorization_config", &self.authorization_config.is_some())
            .field("upstream", &self.upstream.present())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, Default, PartialEq)]
    struct RedisConfig {
        #[serde(default)]
        host: String,
        #[serde(default)]
        port: u16,
    }

    #[test]
    fn test_config_as_typed() {
        let bundle = Bundle::new("winext_redis_store", TraceContext::with_request_id("r1"))
            .with_config(Some(json!({ "host": "localhost", "port": 6379 })));
        let cfg: RedisConfig = bundle.config_as().unwrap();
        assert_eq!(cfg.host, "localhost");
        assert_eq!(cfg.port, 6379);
    }

    #[test]
    fn test_config_as_rejects_wrong_shape() {
        let bundle = Bundle::new("winext_redis_store", TraceContext::generate())
            .with_config(Some(json!({ "port": "not-a-number" })));
        let err = bundle.config_as::<RedisConfig>().unwrap_err();
        assert!(matches!(err, PluginError::Config { .. }));
    }

    #[test]
    fn test_require_missing_fields() {
        let bundle = Bundle::new("winext_logger", TraceContext::generate());
        assert!(matches!(
            bundle.require_logger(),
            Err(PluginError::MissingField {
                field: "logger_factory",
                ..
            })
        ));
        assert!(bundle.require_error_manager().is_err());
        let cfg: RedisConfig = bundle.config_as().unwrap();
        assert_eq!(cfg, RedisConfig::default());
        assert!(bundle.upstream().present().is_empty());
    }
}
