//! The composed application.
//!
//! An [`ApplicationHandle`] has one named slot per category. The logger and
//! error manager are always present; every other slot is filled only if its
//! plugin was declared. Store plugins are narrowed to their lifecycle
//! operations.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use tokio::signal;
use tracing::{error, info, warn};
use winext_core::{
    ApiGatewayPlugin, AuthorizationPlugin, Category, ErrorManagerPlugin, KeyManagerPlugin,
    LoggerPlugin, MappingStorePlugin, PluginError, RedisStorePlugin, RepoStorePlugin,
    ServerPlugin, ServiceRegistryPlugin, StoreBackend, SubComponent,
};

use crate::error::{RuntimeError, RuntimeResult};

fn lifecycle_error(category: Category) -> impl FnOnce(PluginError) -> RuntimeError {
    move |source| RuntimeError::Lifecycle {
        slot: category.slot_name(),
        source,
    }
}

// =============================================================================
// Narrowed store handles
// =============================================================================

/// Repository store, exposing start/stop per backend and its sub-stores.
#[derive(Clone)]
pub struct RepoStoreHandle {
    inner: Arc<dyn RepoStorePlugin>,
}

impl RepoStoreHandle {
    pub fn new(inner: Arc<dyn RepoStorePlugin>) -> Self {
        Self { inner }
    }

    pub async fn start(&self, backend: StoreBackend) -> RuntimeResult<()> {
        info!(backend = %backend, "Starting repository backend");
        self.inner
            .startup(backend)
            .await
            .map_err(lifecycle_error(Category::RepoStore))
    }

    pub async fn stop(&self, backend: StoreBackend) -> RuntimeResult<()> {
        info!(backend = %backend, "Stopping repository backend");
        self.inner
            .shutdown(backend)
            .await
            .map_err(lifecycle_error(Category::RepoStore))
    }

    /// Starts every backend in [`StoreBackend::ALL`] order.
    pub async fn start_all(&self) -> RuntimeResult<()> {
        for backend in StoreBackend::ALL {
            self.start(backend).await?;
        }
        Ok(())
    }

    /// Stops every backend in reverse order.
    pub async fn stop_all(&self) -> RuntimeResult<()> {
        for backend in StoreBackend::ALL.into_iter().rev() {
            self.stop(backend).await?;
        }
        Ok(())
    }

    pub fn sub_store(&self, backend: StoreBackend) -> SubComponent {
        self.inner.sub_store(backend)
    }
}

/// Cache store, exposing start/stop.
#[derive(Clone)]
pub struct RedisStoreHandle {
    inner: Arc<dyn RedisStorePlugin>,
}

impl RedisStoreHandle {
    pub fn new(inner: Arc<dyn RedisStorePlugin>) -> Self {
        Self { inner }
    }

    pub async fn start(&self) -> RuntimeResult<()> {
        info!("Starting redis store");
        self.inner
            .start()
            .await
            .map_err(lifecycle_error(Category::RedisStore))
    }

    pub async fn stop(&self) -> RuntimeResult<()> {
        info!("Stopping redis store");
        self.inner
            .stop()
            .await
            .map_err(lifecycle_error(Category::RedisStore))
    }
}

/// Server, exposing start/stop.
#[derive(Clone)]
pub struct ServerHandle {
    inner: Arc<dyn ServerPlugin>,
}

impl ServerHandle {
    pub fn new(inner: Arc<dyn ServerPlugin>) -> Self {
        Self { inner }
    }

    pub async fn start(&self) -> RuntimeResult<()> {
        info!("Starting server");
        self.inner
            .start()
            .await
            .map_err(lifecycle_error(Category::Server))
    }

    pub async fn stop(&self) -> RuntimeResult<()> {
        info!("Stopping server");
        self.inner
            .stop()
            .await
            .map_err(lifecycle_error(Category::Server))
    }
}

// =============================================================================
// Application handle
// =============================================================================

/// The result of a successful composition. Immutable once built.
#[derive(Clone)]
pub struct ApplicationHandle {
    logger: Arc<dyn LoggerPlugin>,
    error_manager: Arc<dyn ErrorManagerPlugin>,
    key_manager: Option<Arc<dyn KeyManagerPlugin>>,
    api_gateway: Option<Arc<dyn ApiGatewayPlugin>>,
    service_registry: Option<Arc<dyn ServiceRegistryPlugin>>,
    repo_store: Option<RepoStoreHandle>,
    redis_store: Option<RedisStoreHandle>,
    authorization: Option<Arc<dyn AuthorizationPlugin>>,
    mapping_store: Option<Arc<dyn MappingStorePlugin>>,
    server: Option<ServerHandle>,
}

impl ApplicationHandle {
    pub fn logger(&self) -> &Arc<dyn LoggerPlugin> {
        &self.logger
    }

    pub fn error_manager(&self) -> &Arc<dyn ErrorManagerPlugin> {
        &self.error_manager
    }

    pub fn key_manager(&self) -> Option<&Arc<dyn KeyManagerPlugin>> {
        self.key_manager.as_ref()
    }

    pub fn api_gateway(&self) -> Option<&Arc<dyn ApiGatewayPlugin>> {
        self.api_gateway.as_ref()
    }

    pub fn service_registry(&self) -> Option<&Arc<dyn ServiceRegistryPlugin>> {
        self.service_registry.as_ref()
    }

    pub fn repo_store(&self) -> Option<&RepoStoreHandle> {
        self.repo_store.as_ref()
    }

    pub fn redis_store(&self) -> Option<&RedisStoreHandle> {
        self.redis_store.as_ref()
    }

    pub fn authorization(&self) -> Option<&Arc<dyn AuthorizationPlugin>> {
        self.authorization.as_ref()
    }

    pub fn mapping_store(&self) -> Option<&Arc<dyn MappingStorePlugin>> {
        self.mapping_store.as_ref()
    }

    pub fn server(&self) -> Option<&ServerHandle> {
        self.server.as_ref()
    }

    /// Returns `true` if the slot for `category` is populated.
    pub fn has_slot(&self, category: Category) -> bool {
        match category {
            Category::Logger | Category::ErrorManager => true,
            Category::KeyManager => self.key_manager.is_some(),
            Category::ApiGateway => self.api_gateway.is_some(),
            Category::ServiceRegistry => self.service_registry.is_some(),
            Category::RepoStore => self.repo_store.is_some(),
            Category::RedisStore => self.redis_store.is_some(),
            Category::Authorization => self.authorization.is_some(),
            Category::MappingStore => self.mapping_store.is_some(),
            Category::Server => self.server.is_some(),
        }
    }

    /// Populated slots, in build order.
    pub fn populated_slots(&self) -> Vec<Category> {
        Category::BUILD_ORDER
            .into_iter()
            .filter(|c| self.has_slot(*c))
            .collect()
    }

    /// Starts the stores and then the server.
    ///
    /// If any start fails, the slots already started are stopped in reverse
    /// order before the error is returned.
    pub async fn start(&self) -> RuntimeResult<()> {
        let mut started = Vec::new();
        if let Err(err) = self.start_slots(&mut started).await {
            error!(error = %err, "Start failed, stopping started slots");
            self.unwind(started).await;
            return Err(err);
        }
        info!(slots = ?self.populated_slots(), "Application started");
        Ok(())
    }

    async fn start_slots(&self, started: &mut Vec<Started>) -> RuntimeResult<()> {
        if let Some(repo) = &self.repo_store {
            for backend in StoreBackend::ALL {
                repo.start(backend).await?;
                started.push(Started::Repo(backend));
            }
        }
        if let Some(redis) = &self.redis_store {
            redis.start().await?;
            started.push(Started::Redis);
        }
        if let Some(server) = &self.server {
            server.start().await?;
        }
        Ok(())
    }

    async fn unwind(&self, started: Vec<Started>) {
        for slot in started.into_iter().rev() {
            let result = match (slot, &self.repo_store, &self.redis_store) {
                (Started::Repo(backend), Some(repo), _) => repo.stop(backend).await,
                (Started::Redis, _, Some(redis)) => redis.stop().await,
                _ => Ok(()),
            };
            if let Err(err) = result {
                error!(error = %err, "Stop failed while unwinding start");
            }
        }
    }

    /// Stops the server and then the stores, in reverse start order.
    ///
    /// Every stop is attempted; the first failure is returned.
    pub async fn stop(&self) -> RuntimeResult<()> {
        let mut first_error = None;

        if let Some(server) = &self.server {
            record(&mut first_error, server.stop().await);
        }
        if let Some(redis) = &self.redis_store {
            record(&mut first_error, redis.stop().await);
        }
        if let Some(repo) = &self.repo_store {
            for backend in StoreBackend::ALL.into_iter().rev() {
                record(&mut first_error, repo.stop(backend).await);
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => {
                info!("Application stopped");
                Ok(())
            }
        }
    }

    /// Starts the application and runs until Ctrl+C or SIGTERM.
    pub async fn run(&self) -> RuntimeResult<()> {
        self.run_until(wait_for_shutdown()).await
    }

    /// Starts the application and runs until `shutdown` completes.
    pub async fn run_until<F>(&self, shutdown: F) -> RuntimeResult<()>
    where
        F: Future<Output = ()>,
    {
        self.start().await?;
        shutdown.await;
        self.stop().await
    }
}

/// A slot started by [`ApplicationHandle::start`].
#[derive(Debug, Clone, Copy)]
enum Started {
    Repo(StoreBackend),
    Redis,
}

fn record(first_error: &mut Option<RuntimeError>, result: RuntimeResult<()>) {
    if let Err(err) = result {
        error!(error = %err, "Stop failed");
        first_error.get_or_insert(err);
    }
}

impl fmt::Debug for ApplicationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApplicationHandle")
            .field("slots", &self.populated_slots())
            .finish()
    }
}

/// Waits for Ctrl+C or, on unix, SIGTERM.
async fn wait_for_shutdown() {
    #[cfg(unix)]
    {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = signal::ctrl_c() => {
                        info!("Received Ctrl+C, shutting down");
                    }
                    _ = sigterm.recv() => {
                        info!("Received SIGTERM, shutting down");
                    }
                }
                return;
            }
            Err(e) => warn!(error = %e, "Failed to register SIGTERM handler"),
        }
    }

    match signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, shutting down"),
        Err(e) => error!(error = %e, "Failed to listen for Ctrl+C, shutting down"),
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Assembles an [`ApplicationHandle`] slot by slot.
pub struct ApplicationBuilder {
    handle: ApplicationHandle,
}

impl ApplicationBuilder {
    pub fn new(logger: Arc<dyn LoggerPlugin>, error_manager: Arc<dyn ErrorManagerPlugin>) -> Self {
        Self {
            handle: ApplicationHandle {
                logger,
                error_manager,
                key_manager: None,
                api_gateway: None,
                service_registry: None,
                repo_store: None,
                redis_store: None,
                authorization: None,
                mapping_store: None,
                server: None,
            },
        }
    }

    pub fn key_manager(mut self, plugin: Arc<dyn KeyManagerPlugin>) -> Self {
        self.handle.key_manager = Some(plugin);
        self
    }

    pub fn api_gateway(mut self, plugin: Arc<dyn ApiGatewayPlugin>) -> Self {
        self.handle.api_gateway = Some(plugin);
        self
    }

    pub fn service_registry(mut self, plugin: Arc<dyn ServiceRegistryPlugin>) -> Self {
        self.handle.service_registry = Some(plugin);
        self
    }

    pub fn repo_store(mut self, plugin: Arc<dyn RepoStorePlugin>) -> Self {
        self.handle.repo_store = Some(RepoStoreHandle::new(plugin));
        self
    }

    pub fn redis_store(mut self, plugin: Arc<dyn RedisStorePlugin>) -> Self {
        self.handle.redis_store = Some(RedisStoreHandle::new(plugin));
        self
    }

    pub fn authorization(mut self, plugin: Arc<dyn AuthorizationPlugin>) -> Self {
        self.handle.authorization = Some(plugin);
        self
    }

    pub fn mapping_store(mut self, plugin: Arc<dyn MappingStorePlugin>) -> Self {
        self.handle.mapping_store = Some(plugin);
        self
    }

    pub fn server(mut self, plugin: Arc<dyn ServerPlugin>) -> Self {
        self.handle.server = Some(ServerHandle::new(plugin));
        self
    }

    pub fn build(self) -> ApplicationHandle {
        self.handle
    }
}
