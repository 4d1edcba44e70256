//! Recording test doubles shared by the integration tests.
//!
//! Every double appends to a shared [`Journal`]: `register:<scope>` for each
//! `register` call, `start:<name>` / `stop:<name>` for lifecycle calls and
//! `io:<name>` for operations that would touch the outside world.

#![allow(dead_code)]

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::{Value, json};
use tracing::Level;
use winext_core::{
    ApiGatewayPlugin, AuthorizationPlugin, BoxError, Bundle, Category, ErrorManagerPlugin,
    KeyManagerPlugin, LoggerHandle, LoggerPlugin, ManagedError, MappingStorePlugin, PluginError,
    PluginResult, RedisStorePlugin, Registerable, RepoStorePlugin, ScopedLogger, ServerPlugin,
    ServiceRegistryPlugin, Startable, StoreBackend, SubComponent, TraceContext, TracerHandle,
    async_trait,
};
use winext_runtime::{DeclaredPlugins, ModuleRegistry, SandboxConfig};

// =============================================================================
// Journal
// =============================================================================

#[derive(Default)]
pub struct Journal {
    events: Mutex<Vec<String>>,
    bundles: Mutex<Vec<Bundle>>,
}

impl Journal {
    pub fn record(&self, event: impl Into<String>) {
        self.events.lock().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().clone()
    }

    /// Events starting with `prefix`.
    pub fn events_with(&self, prefix: &str) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.starts_with(prefix))
            .cloned()
            .collect()
    }

    pub fn keep(&self, bundle: &Bundle) {
        self.record(format!("register:{}", bundle.scope()));
        self.bundles.lock().push(bundle.clone());
    }

    pub fn bundles(&self) -> Vec<Bundle> {
        self.bundles.lock().clone()
    }

    /// Last bundle registered under `scope`.
    pub fn bundle(&self, scope: &str) -> Option<Bundle> {
        self.bundles
            .lock()
            .iter()
            .rev()
            .find(|b| b.scope() == scope)
            .cloned()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
        self.bundles.lock().clear();
    }
}

// =============================================================================
// Doubles
// =============================================================================

/// Generic recording plugin usable for any non-mandatory category.
pub struct Recorder {
    name: &'static str,
    journal: Arc<Journal>,
    fail_register: bool,
    fail_start: bool,
}

impl Recorder {
    pub fn new(name: &'static str, journal: &Arc<Journal>) -> Arc<Self> {
        Arc::new(Self {
            name,
            journal: journal.clone(),
            fail_register: false,
            fail_start: false,
        })
    }

    pub fn failing(name: &'static str, journal: &Arc<Journal>) -> Arc<Self> {
        Arc::new(Self {
            name,
            journal: journal.clone(),
            fail_register: true,
            fail_start: false,
        })
    }

    /// Registers normally but fails every `start`.
    pub fn failing_start(name: &'static str, journal: &Arc<Journal>) -> Arc<Self> {
        Arc::new(Self {
            name,
            journal: journal.clone(),
            fail_register: false,
            fail_start: true,
        })
    }
}

impl Registerable for Recorder {
    fn register(&self, bundle: &Bundle) -> PluginResult<()> {
        self.journal.keep(bundle);
        if self.fail_register {
            return Err(PluginError::invalid_bundle(bundle.scope(), "rejected"));
        }
        Ok(())
    }
}

#[async_trait]
impl Startable for Recorder {
    async fn start(&self) -> PluginResult<()> {
        self.journal.record(format!("start:{}", self.name));
        if self.fail_start {
            return Err(PluginError::lifecycle(self.name, "start", "port in use"));
        }
        if self.name == "server" {
            self.journal.record(format!("io:{}", self.name));
        }
        Ok(())
    }

    async fn stop(&self) -> PluginResult<()> {
        self.journal.record(format!("stop:{}", self.name));
        Ok(())
    }
}

impl KeyManagerPlugin for Recorder {}
impl ApiGatewayPlugin for Recorder {}
impl ServiceRegistryPlugin for Recorder {}
impl MappingStorePlugin for Recorder {}
impl RedisStorePlugin for Recorder {}
impl ServerPlugin for Recorder {}

pub struct RecordingScope {
    scope: String,
    request_id: Option<String>,
    journal: Arc<Journal>,
}

impl ScopedLogger for RecordingScope {
    fn scope(&self) -> &str {
        &self.scope
    }

    fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    fn log(&self, level: Level, message: &str) {
        self.journal
            .record(format!("log:{}:{level}:{message}", self.scope));
    }
}

pub struct RecordingLogger {
    journal: Arc<Journal>,
}

impl Registerable for RecordingLogger {
    fn register(&self, bundle: &Bundle) -> PluginResult<()> {
        self.journal.keep(bundle);
        Ok(())
    }
}

impl LoggerPlugin for RecordingLogger {
    fn get_logger(&self, scope: &str) -> LoggerHandle {
        Arc::new(RecordingScope {
            scope: scope.to_string(),
            request_id: None,
            journal: self.journal.clone(),
        })
    }

    fn get_log_tracer(&self, scope: &str, trace: &TraceContext) -> TracerHandle {
        Arc::new(RecordingScope {
            scope: scope.to_string(),
            request_id: Some(trace.request_id().to_string()),
            journal: self.journal.clone(),
        })
    }
}

pub struct RecordingErrorManager {
    journal: Arc<Journal>,
}

impl Registerable for RecordingErrorManager {
    fn register(&self, bundle: &Bundle) -> PluginResult<()> {
        self.journal.keep(bundle);
        Ok(())
    }
}

impl ErrorManagerPlugin for RecordingErrorManager {
    fn required_module(&self, cause: BoxError, module: &str) -> ManagedError {
        self.journal.record(format!("managed:required_module:{module}"));
        ManagedError::required_module(cause, module)
    }

    fn config_not_found(&self, cause: BoxError) -> ManagedError {
        self.journal.record("managed:config_not_found");
        ManagedError::config_not_found(cause)
    }
}

pub struct RecordingRepoStore {
    journal: Arc<Journal>,
    document: Arc<Recorder>,
    relational: Arc<Recorder>,
    graph: Arc<Recorder>,
}

impl Registerable for RecordingRepoStore {
    fn register(&self, bundle: &Bundle) -> PluginResult<()> {
        self.journal.keep(bundle);
        Ok(())
    }
}

#[async_trait]
impl RepoStorePlugin for RecordingRepoStore {
    fn sub_store(&self, backend: StoreBackend) -> SubComponent {
        match backend {
            StoreBackend::Document => self.document.clone(),
            StoreBackend::Relational => self.relational.clone(),
            StoreBackend::Graph => self.graph.clone(),
        }
    }

    async fn startup(&self, backend: StoreBackend) -> PluginResult<()> {
        self.journal.record(format!("start:repo:{backend}"));
        Ok(())
    }

    async fn shutdown(&self, backend: StoreBackend) -> PluginResult<()> {
        self.journal.record(format!("stop:repo:{backend}"));
        Ok(())
    }
}

pub struct RecordingAuthorization {
    journal: Arc<Journal>,
    token_generator: Arc<Recorder>,
}

impl Registerable for RecordingAuthorization {
    fn register(&self, bundle: &Bundle) -> PluginResult<()> {
        self.journal.keep(bundle);
        Ok(())
    }
}

impl AuthorizationPlugin for RecordingAuthorization {
    fn token_generator(&self) -> SubComponent {
        self.token_generator.clone()
    }
}

// =============================================================================
// Fixtures
// =============================================================================

/// Registry with only the logger and error manager.
pub fn minimal_registry(journal: &Arc<Journal>) -> ModuleRegistry {
    ModuleRegistry::new()
        .with_logger(Arc::new(RecordingLogger {
            journal: journal.clone(),
        }))
        .with_error_manager(Arc::new(RecordingErrorManager {
            journal: journal.clone(),
        }))
}

/// Registry with a recording double for every category.
pub fn full_registry(journal: &Arc<Journal>) -> ModuleRegistry {
    minimal_registry(journal)
        .with_key_manager(Recorder::new("key_manager", journal))
        .with_api_gateway(Recorder::new("api_gateway", journal))
        .with_service_registry(Recorder::new("service_registry", journal))
        .with_repo_store(Arc::new(RecordingRepoStore {
            journal: journal.clone(),
            document: Recorder::new("document", journal),
            relational: Recorder::new("relational", journal),
            graph: Recorder::new("graph", journal),
        }))
        .with_redis_store(Recorder::new("redis", journal))
        .with_authorization(Arc::new(RecordingAuthorization {
            journal: journal.clone(),
            token_generator: Recorder::new("token_generator", journal),
        }))
        .with_mapping_store(Recorder::new("mapping_store", journal))
        .with_server(Recorder::new("server", journal))
}

pub fn sandbox(value: Value) -> SandboxConfig {
    serde_json::from_value(value).unwrap()
}

/// Sandbox configuring every category.
pub fn full_sandbox() -> SandboxConfig {
    sandbox(json!({
        "application": {
            "dependencies": {
                "winext_logger": { "level": "debug" },
                "winext_error_manager": {},
                "winext_key_manager": { "keys": "/etc/keys" },
                "winext_api_gateway": { "prefix": "/api" },
                "winext_service_registry": {},
                "winext_repo_store": { "uri": "mongodb://localhost/app" },
                "winext_redis_store": { "host": "localhost" },
                "winext_authorization": { "secret": "s3cret" },
                "winext_mapping_store": {},
                "winext_runserver": { "port": 8080 }
            },
            "routerMappings": { "/ping": "ping" },
            "errorCodes": { "RequiredModuleError": "E1001" }
        },
        "messageCodes": { "OK": 200 }
    }))
}

pub fn declared(ids: &[&str]) -> DeclaredPlugins {
    ids.iter().copied().collect()
}

/// Every category identifier.
pub fn declared_all() -> DeclaredPlugins {
    Category::BUILD_ORDER.iter().map(|c| c.identifier()).collect()
}
