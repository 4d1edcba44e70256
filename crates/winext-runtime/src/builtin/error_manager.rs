//! Built-in error-manager plugin.
//!
//! Codes come from the sandbox's `application.errorCodes` table and are
//! attached to the [`ManagedError`]s this plugin produces:
//!
//! ```json
//! {
//!   "application": {
//!     "errorCodes": {
//!       "RequiredModuleError": "E1001",
//!       "ConfigNotFound": "E1002"
//!     }
//!   }
//! }
//! ```

use std::collections::HashMap;

use parking_lot::RwLock;
use serde_json::Value;
use winext_core::{
    BoxError, Bundle, ErrorManagerPlugin, ManagedError, PluginError, PluginResult, Registerable,
};

/// Error-code key for missing modules.
pub const REQUIRED_MODULE_CODE: &str = "RequiredModuleError";

/// Error-code key for configuration failures.
pub const CONFIG_NOT_FOUND_CODE: &str = "ConfigNotFound";

/// Error manager producing [`ManagedError`]s with optional codes.
#[derive(Default)]
pub struct StandardErrorManager {
    codes: RwLock<HashMap<String, String>>,
}

impl StandardErrorManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Code registered under `key`.
    pub fn code(&self, key: &str) -> Option<String> {
        self.codes.read().get(key).cloned()
    }

    fn attach_code(&self, error: ManagedError, key: &str) -> ManagedError {
        match self.code(key) {
            Some(code) => error.with_code(code),
            None => error,
        }
    }
}

impl Registerable for StandardErrorManager {
    fn register(&self, bundle: &Bundle) -> PluginResult<()> {
        let codes = match bundle.error_codes() {
            None => HashMap::new(),
            Some(Value::Object(table)) => table
                .iter()
                .map(|(key, code)| {
                    let code = match code {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    (key.clone(), code)
                })
                .collect(),
            Some(_) => {
                return Err(PluginError::invalid_bundle(
                    bundle.scope(),
                    "errorCodes must be an object",
                ));
            }
        };

        if let Some(logger) = bundle.logger_factory() {
            logger.debug(&format!("Loaded {} error codes", codes.len()));
        }

        *self.codes.write() = codes;
        Ok(())
    }
}

impl ErrorManagerPlugin for StandardErrorManager {
    fn required_module(&self, cause: BoxError, module: &str) -> ManagedError {
        self.attach_code(
            ManagedError::required_module(cause, module),
            REQUIRED_MODULE_CODE,
        )
    }

    fn config_not_found(&self, cause: BoxError) -> ManagedError {
        self.attach_code(ManagedError::config_not_found(cause), CONFIG_NOT_FOUND_CODE)
    }
}
