//! The composition driver.
//!
//! [`Container::compose`] validates a sandbox against the declared plugin
//! list, wires the logger and error manager, then walks the remaining
//! categories in [`Category::BUILD_ORDER`], registering each declared plugin
//! with a bundle built from what is already wired.
//!
//! Composition is synchronous. A failure at any stage fails the whole call;
//! registrations already performed are not rolled back.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, info_span, trace};
use winext_core::{
    Bundle, Category, ErrorManagerPlugin, Registerable, StoreBackend, TraceContext,
    UpstreamHandles,
};

use crate::application::{ApplicationBuilder, ApplicationHandle};
use crate::config::{
    DeclaredPlugins, ModelRefs, SandboxConfig, validate_declared, validate_dependency_keys,
    validate_shape,
};
use crate::error::{ComposeError, ComposeResult, LoaderError, LoaderResult};
use crate::propagate::ContextPropagator;
use crate::registry::{ModuleRegistry, PluginModule};

/// Composes applications from a [`ModuleRegistry`].
#[derive(Clone, Default)]
pub struct Container {
    registry: ModuleRegistry,
}

impl Container {
    pub fn new(registry: ModuleRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    /// Composes an application under a freshly generated request id.
    pub fn compose(
        &self,
        sandbox: &SandboxConfig,
        declared: &DeclaredPlugins,
        models: &ModelRefs,
    ) -> ComposeResult<ApplicationHandle> {
        self.compose_with_trace(sandbox, declared, models, TraceContext::generate())
    }

    /// Composes an application, propagating `trace` into every bundle.
    pub fn compose_with_trace(
        &self,
        sandbox: &SandboxConfig,
        declared: &DeclaredPlugins,
        models: &ModelRefs,
        trace: TraceContext,
    ) -> ComposeResult<ApplicationHandle> {
        let span = info_span!("compose", request_id = %trace.request_id());
        let _enter = span.enter();

        // ── 1. Validate, checking the mandatory plugins before the keys ──
        validate_shape(sandbox)?;
        validate_declared(declared)?;
        let logger = self.require(Category::Logger, declared, ModuleRegistry::logger)?;
        let error_manager =
            self.require(Category::ErrorManager, declared, ModuleRegistry::error_manager)?;
        validate_dependency_keys(sandbox, declared)?;

        // ── 2. Wire the logger, then the error manager ───────────────────
        let mut propagator = ContextPropagator::new(sandbox, trace);
        let mut wired = UpstreamHandles::default();

        let bundle = propagator.category_bundle(Category::Logger, &wired);
        logger
            .register(&bundle)
            .map_err(|source| ComposeError::Register {
                category: Category::Logger,
                source,
            })?;
        propagator.set_logger(logger.clone());
        info!(plugin = %Category::Logger, "Plugin registered");

        let bundle = propagator.category_bundle(Category::ErrorManager, &wired);
        error_manager
            .register(&bundle)
            .map_err(|source| ComposeError::Register {
                category: Category::ErrorManager,
                source,
            })?;
        propagator.set_error_manager(error_manager.clone());
        info!(plugin = %Category::ErrorManager, "Plugin registered");

        // From here on, failures are re-raised through the error manager.
        let managed = Managed(&*error_manager);

        // ── 3. Resolve model descriptors ─────────────────────────────────
        let descriptors = self.resolve_models(models, &managed)?;

        // ── 4. Walk the remaining build order ────────────────────────────
        let mut app = ApplicationBuilder::new(logger, error_manager.clone());

        for category in Category::BUILD_ORDER {
            if category.is_mandatory() {
                continue;
            }
            if !declared.declares(category) {
                trace!(plugin = %category, "Plugin not declared, skipping");
                continue;
            }

            let module = managed.resolve(category, self.registry.resolve_category(category))?;
            let bundle = propagator.category_bundle(category, &wired);
            debug!(
                plugin = %category,
                configured = bundle.config().is_some(),
                upstream = ?bundle.upstream().present(),
                "Registering plugin"
            );

            match module {
                PluginModule::Logger(_) | PluginModule::ErrorManager(_) => {}
                PluginModule::KeyManager(plugin) => {
                    managed.register(&*plugin, &bundle)?;
                    wired.key_manager = Some(plugin.clone());
                    app = app.key_manager(plugin);
                }
                PluginModule::ApiGateway(plugin) => {
                    managed.register(&*plugin, &bundle)?;
                    wired.api_gateway = Some(plugin.clone());
                    app = app.api_gateway(plugin);
                }
                PluginModule::ServiceRegistry(plugin) => {
                    managed.register(&*plugin, &bundle)?;
                    wired.service_registry = Some(plugin.clone());
                    app = app.service_registry(plugin);
                }
                PluginModule::RepoStore(plugin) => {
                    // Parent before its sub-stores.
                    managed.register(&*plugin, &bundle)?;
                    for backend in StoreBackend::ALL {
                        let descriptor = descriptors
                            .get(&backend)
                            .cloned()
                            .unwrap_or_else(empty_descriptors);
                        let sub_bundle = propagator.sub_store_bundle(backend, descriptor);
                        managed.register(&*plugin.sub_store(backend), &sub_bundle)?;
                        debug!(backend = %backend, "Sub-store registered");
                    }
                    wired.repo_store = Some(plugin.clone());
                    app = app.repo_store(plugin);
                }
                PluginModule::RedisStore(plugin) => {
                    managed.register(&*plugin, &bundle)?;
                    wired.redis_store = Some(plugin.clone());
                    app = app.redis_store(plugin);
                }
                PluginModule::Authorization(plugin) => {
                    managed.register(&*plugin, &bundle)?;
                    let token_bundle = propagator.token_generator_bundle();
                    managed.register(&*plugin.token_generator(), &token_bundle)?;
                    wired.authorization = Some(plugin.clone());
                    app = app.authorization(plugin);
                }
                PluginModule::MappingStore(plugin) => {
                    managed.register(&*plugin, &bundle)?;
                    wired.mapping_store = Some(plugin.clone());
                    app = app.mapping_store(plugin);
                }
                PluginModule::Server(plugin) => {
                    managed.register(&*plugin, &bundle)?;
                    app = app.server(plugin);
                }
            }

            info!(plugin = %category, "Plugin registered");
        }

        let app = app.build();
        info!(slots = ?app.populated_slots(), "Application composed");
        Ok(app)
    }

    /// Resolves a mandatory plugin, which must be declared and provided.
    fn require<T>(
        &self,
        category: Category,
        declared: &DeclaredPlugins,
        resolve: impl FnOnce(&ModuleRegistry) -> LoaderResult<T>,
    ) -> ComposeResult<T> {
        if !declared.declares(category) {
            return Err(ComposeError::RequiredModule {
                category,
                source: None,
            });
        }
        resolve(&self.registry).map_err(|source| ComposeError::RequiredModule {
            category,
            source: Some(source),
        })
    }

    fn resolve_models(
        &self,
        models: &ModelRefs,
        managed: &Managed<'_>,
    ) -> ComposeResult<HashMap<StoreBackend, Arc<Value>>> {
        let mut descriptors = HashMap::new();
        for backend in StoreBackend::ALL {
            let Some(identifier) = models.get(backend) else {
                continue;
            };
            let descriptor = self
                .registry
                .resolve_model(identifier)
                .map_err(|err| managed.required_module(err, identifier))?;
            debug!(backend = %backend, module = %identifier, "Model descriptors resolved");
            descriptors.insert(backend, descriptor);
        }
        Ok(descriptors)
    }
}

fn empty_descriptors() -> Arc<Value> {
    Arc::new(Value::Array(Vec::new()))
}

/// Routes failures through the registered error manager.
struct Managed<'a>(&'a dyn ErrorManagerPlugin);

impl Managed<'_> {
    fn required_module(&self, err: LoaderError, module: &str) -> ComposeError {
        ComposeError::Managed(self.0.required_module(Box::new(err), module))
    }

    fn resolve<T>(&self, category: Category, result: LoaderResult<T>) -> ComposeResult<T> {
        result.map_err(|err| self.required_module(err, category.identifier()))
    }

    fn register<P>(&self, plugin: &P, bundle: &Bundle) -> ComposeResult<()>
    where
        P: Registerable + ?Sized,
    {
        plugin
            .register(bundle)
            .map_err(|err| ComposeError::Managed(self.0.config_not_found(Box::new(err))))
    }
}

/// Composes an application from `registry`.
pub fn compose(
    registry: &ModuleRegistry,
    sandbox: &SandboxConfig,
    declared: &DeclaredPlugins,
    models: &ModelRefs,
) -> ComposeResult<ApplicationHandle> {
    Container::new(registry.clone()).compose(sandbox, declared, models)
}
