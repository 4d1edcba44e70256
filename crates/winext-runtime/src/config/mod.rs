//! Sandbox configuration.
//!
//! Loading (figment layers over JSON/TOML/YAML files and `WINEXT_`
//! environment variables), the typed schema, and the pure dependency
//! validation rules the container runs before wiring anything.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult, ValidationError, ValidationResult};
pub use loader::{ConfigLoader, Profile, load_config, load_config_from_file};
pub use schema::{
    ApplicationConfig, DeclaredPlugins, LogFormat, LogLevel, LogOutput, LoggingConfig, ModelRefs,
    SandboxConfig, SpanEventConfig,
};
pub use validation::{
    validate_declared, validate_dependency_keys, validate_sandbox, validate_shape,
};
