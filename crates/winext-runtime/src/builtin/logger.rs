//! Built-in logger plugin.
//!
//! On `register` the plugin reads its `winext_logger` config sub-tree as a
//! [`LoggingConfig`] and installs the global subscriber. Configure it in the
//! sandbox:
//!
//! ```toml
//! [application.dependencies.winext_logger]
//! level = "debug"
//! format = "pretty"
//!
//! [application.dependencies.winext_logger.filters]
//! winext_runtime = "trace"
//! ```

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::Level;
use winext_core::{
    Bundle, LoggerHandle, LoggerPlugin, PluginResult, Registerable, ScopedLogger, TraceContext,
    TracerHandle,
};

use crate::config::LoggingConfig;
use crate::logging;

/// Logger plugin that forwards to `tracing`.
#[derive(Default)]
pub struct TracingLogger {
    config: RwLock<Option<LoggingConfig>>,
}

impl TracingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Config applied by the last `register`, if any.
    pub fn config(&self) -> Option<LoggingConfig> {
        self.config.read().clone()
    }
}

impl Registerable for TracingLogger {
    fn register(&self, bundle: &Bundle) -> PluginResult<()> {
        let config: LoggingConfig = bundle.config_as()?;
        let installed = logging::init_from_config(&config);
        tracing::debug!(
            level = %config.level,
            installed,
            "Logger registered"
        );
        *self.config.write() = Some(config);
        Ok(())
    }
}

impl LoggerPlugin for TracingLogger {
    fn get_logger(&self, scope: &str) -> LoggerHandle {
        Arc::new(TracingScope {
            scope: scope.to_string(),
            request_id: None,
        })
    }

    fn get_log_tracer(&self, scope: &str, trace: &TraceContext) -> TracerHandle {
        Arc::new(TracingScope {
            scope: scope.to_string(),
            request_id: Some(trace.request_id().to_string()),
        })
    }
}

/// Handle that tags every event with its scope and optional request id.
#[derive(Debug, Clone)]
pub struct TracingScope {
    scope: String,
    request_id: Option<String>,
}

impl ScopedLogger for TracingScope {
    fn scope(&self) -> &str {
        &self.scope
    }

    fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    fn log(&self, level: Level, message: &str) {
        let scope = self.scope.as_str();
        let request_id = self.request_id.as_deref();

        if level == Level::ERROR {
            tracing::error!(scope, request_id, "{message}");
        } else if level == Level::WARN {
            tracing::warn!(scope, request_id, "{message}");
        } else if level == Level::INFO {
            tracing::info!(scope, request_id, "{message}");
        } else if level == Level::DEBUG {
            tracing::debug!(scope, request_id, "{message}");
        } else {
            tracing::trace!(scope, request_id, "{message}");
        }
    }
}
