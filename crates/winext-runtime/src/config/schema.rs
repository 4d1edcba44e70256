//! Configuration schema definitions.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use winext_core::{Category, StoreBackend};

// =============================================================================
// Sandbox
// =============================================================================

/// Root sandbox configuration.
///
/// Unknown keys are kept in `extra` so emptiness checks see the whole
/// document, not just the fields the container reads. A key that is present
/// with a `null` value still counts as present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SandboxConfig {
    /// Application section. `application: null` reads as an empty section.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub application: Option<ApplicationConfig>,

    /// Routing table shared with the mapping store.
    #[serde(
        default,
        deserialize_with = "present",
        rename = "routerMappings",
        alias = "router_mappings",
        skip_serializing_if = "Option::is_none"
    )]
    pub router_mappings: Option<Value>,

    /// Message-code table shared with the mapping store.
    #[serde(
        default,
        deserialize_with = "present",
        rename = "messageCodes",
        alias = "message_codes",
        skip_serializing_if = "Option::is_none"
    )]
    pub message_codes: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SandboxConfig {
    /// Returns `true` when the document has no keys at all.
    ///
    /// `{"routerMappings": null}` is not empty.
    pub fn is_empty(&self) -> bool {
        self.application.is_none()
            && self.router_mappings.is_none()
            && self.message_codes.is_none()
            && self.extra.is_empty()
    }

    /// The `application.dependencies` mapping, if present.
    pub fn dependencies(&self) -> Option<&Map<String, Value>> {
        self.application
            .as_ref()
            .and_then(|app| app.dependencies.as_ref())
    }

    /// Config sub-tree for `category`.
    pub fn dependency(&self, category: Category) -> Option<&Value> {
        self.dependencies()
            .and_then(|deps| deps.get(category.config_key()))
    }

    /// Routing table, preferring the application section.
    pub fn router_mappings(&self) -> Option<&Value> {
        self.application
            .as_ref()
            .and_then(|app| non_null(&app.router_mappings))
            .or(non_null(&self.router_mappings))
    }

    /// Message-code table, preferring the application section.
    pub fn message_codes(&self) -> Option<&Value> {
        self.application
            .as_ref()
            .and_then(|app| non_null(&app.message_codes))
            .or(non_null(&self.message_codes))
    }

    /// Error-code table for the error manager.
    pub fn error_codes(&self) -> Option<&Value> {
        self.application
            .as_ref()
            .and_then(|app| non_null(&app.error_codes))
    }
}

/// Deserializes a present key as `Some`, mapping `null` to the default.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Some(Option::<T>::deserialize(deserializer)?.unwrap_or_default()))
}

fn non_null(value: &Option<Value>) -> Option<&Value> {
    value.as_ref().filter(|v| !v.is_null())
}

/// The `application` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Category config key → that plugin's config sub-tree.
    ///
    /// `dependencies: null` reads as `Some` of an empty map.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub dependencies: Option<Map<String, Value>>,

    #[serde(
        default,
        deserialize_with = "present",
        rename = "routerMappings",
        alias = "router_mappings",
        skip_serializing_if = "Option::is_none"
    )]
    pub router_mappings: Option<Value>,

    #[serde(
        default,
        deserialize_with = "present",
        rename = "messageCodes",
        alias = "message_codes",
        skip_serializing_if = "Option::is_none"
    )]
    pub message_codes: Option<Value>,

    #[serde(
        default,
        deserialize_with = "present",
        rename = "errorCodes",
        alias = "error_codes",
        skip_serializing_if = "Option::is_none"
    )]
    pub error_codes: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ApplicationConfig {
    /// Returns `true` when the section has no keys at all.
    pub fn is_empty(&self) -> bool {
        self.dependencies.is_none()
            && self.router_mappings.is_none()
            && self.message_codes.is_none()
            && self.error_codes.is_none()
            && self.extra.is_empty()
    }
}

// =============================================================================
// Declared plugins and model references
// =============================================================================

/// Ordered, de-duplicated set of plugin identifiers available at runtime.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct DeclaredPlugins(Vec<String>);

impl DeclaredPlugins {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `identifier` unless it is already present.
    pub fn insert(&mut self, identifier: impl Into<String>) -> bool {
        let identifier = identifier.into();
        if self.contains(&identifier) {
            return false;
        }
        self.0.push(identifier);
        true
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.0.iter().any(|id| id == identifier)
    }

    /// Returns `true` if the category's identifier was declared.
    pub fn declares(&self, category: Category) -> bool {
        self.contains(category.identifier())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for DeclaredPlugins {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut declared = Self::new();
        for id in iter {
            declared.insert(id);
        }
        declared
    }
}

impl From<Vec<String>> for DeclaredPlugins {
    fn from(ids: Vec<String>) -> Self {
        ids.into_iter().collect()
    }
}

impl From<DeclaredPlugins> for Vec<String> {
    fn from(declared: DeclaredPlugins) -> Self {
        declared.0
    }
}

/// Identifiers of the model-descriptor modules, by persistence technology.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelRefs {
    #[serde(default)]
    pub mongo: Option<String>,
    #[serde(default)]
    pub sql: Option<String>,
    #[serde(default)]
    pub graphql: Option<String>,
}

impl ModelRefs {
    /// Model module identifier for `backend`.
    pub fn get(&self, backend: StoreBackend) -> Option<&str> {
        match backend {
            StoreBackend::Document => self.mongo.as_deref(),
            StoreBackend::Relational => self.sql.as_deref(),
            StoreBackend::Graph => self.graphql.as_deref(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.mongo.is_none() && self.sql.is_none() && self.graphql.is_none()
    }
}

// =============================================================================
// Logging
// =============================================================================

/// Logging configuration, read from the logger plugin's config sub-tree.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub level: LogLevel,

    #[serde(default)]
    pub format: LogFormat,

    #[serde(default)]
    pub output: LogOutput,

    #[serde(default)]
    pub span_events: SpanEventConfig,

    /// Include thread ids.
    #[serde(default)]
    pub thread_ids: bool,

    /// Include file and line.
    #[serde(default)]
    pub file_location: bool,

    /// Log file path when `output = "file"`.
    #[serde(default)]
    pub file_path: Option<PathBuf>,

    /// Per-target level overrides (`target → level`).
    #[serde(default)]
    pub filters: HashMap<String, LogLevel>,
}

/// Log verbosity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Full,
    Pretty,
    /// Requires the `json-log` feature; falls back to compact otherwise.
    Json,
}

/// Output destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stdout,
    Stderr,
    File,
}

/// Which span lifecycle events to log.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpanEventConfig {
    #[serde(default)]
    pub new: bool,
    #[serde(default)]
    pub enter: bool,
    #[serde(default)]
    pub exit: bool,
    #[serde(default)]
    pub close: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sandbox_from_json() {
        let sandbox: SandboxConfig = serde_json::from_value(json!({
            "application": {
                "dependencies": {
                    "winext_logger": { "level": "debug" },
                    "winext_mapping_store": {}
                },
                "routerMappings": { "/ping": "ping" },
                "errorCodes": { "RequiredModule": "E001" }
            },
            "messageCodes": { "OK": 200 }
        }))
        .unwrap();

        assert!(!sandbox.is_empty());
        assert_eq!(
            sandbox.dependency(Category::Logger),
            Some(&json!({ "level": "debug" }))
        );
        assert!(sandbox.dependency(Category::RepoStore).is_none());
        assert_eq!(sandbox.router_mappings(), Some(&json!({ "/ping": "ping" })));
        assert_eq!(sandbox.message_codes(), Some(&json!({ "OK": 200 })));
        assert_eq!(sandbox.error_codes(), Some(&json!({ "RequiredModule": "E001" })));
    }

    #[test]
    fn test_emptiness_counts_unknown_keys() {
        let sandbox: SandboxConfig = serde_json::from_value(json!({})).unwrap();
        assert!(sandbox.is_empty());

        let sandbox: SandboxConfig = serde_json::from_value(json!({ "name": "demo" })).unwrap();
        assert!(!sandbox.is_empty());
        assert!(sandbox.application.is_none());

        let app: ApplicationConfig = serde_json::from_value(json!({})).unwrap();
        assert!(app.is_empty());
    }

    #[test]
    fn test_null_valued_keys_are_present() {
        let sandbox: SandboxConfig =
            serde_json::from_value(json!({ "routerMappings": null })).unwrap();
        assert!(!sandbox.is_empty());
        assert_eq!(sandbox.router_mappings(), None);

        let sandbox: SandboxConfig =
            serde_json::from_value(json!({ "application": null })).unwrap();
        assert!(!sandbox.is_empty());
        assert!(sandbox.application.as_ref().is_some_and(ApplicationConfig::is_empty));

        let sandbox: SandboxConfig =
            serde_json::from_value(json!({ "application": { "dependencies": null } })).unwrap();
        let app = sandbox.application.as_ref().unwrap();
        assert!(!app.is_empty());
        assert_eq!(sandbox.dependencies(), Some(&Map::new()));
    }

    #[test]
    fn test_null_application_table_falls_back_to_top_level() {
        let sandbox: SandboxConfig = serde_json::from_value(json!({
            "application": { "dependencies": { "winext_logger": {} }, "messageCodes": null },
            "messageCodes": { "OK": 200 }
        }))
        .unwrap();
        assert_eq!(sandbox.message_codes(), Some(&json!({ "OK": 200 })));
        assert_eq!(sandbox.error_codes(), None);
    }

    #[test]
    fn test_declared_plugins_dedup() {
        let declared: DeclaredPlugins = ["winext-logger", "winext-logger", "winext-error-manager"]
            .into_iter()
            .collect();
        assert_eq!(declared.len(), 2);
        assert!(declared.declares(Category::ErrorManager));
        assert!(!declared.declares(Category::Server));
    }

    #[test]
    fn test_logging_config_defaults() {
        let cfg: LoggingConfig = serde_json::from_value(json!({})).unwrap();
        assert_eq!(cfg.level, LogLevel::Info);
        assert_eq!(cfg.format, LogFormat::Compact);
        assert_eq!(cfg.output, LogOutput::Stdout);
    }
}
