//! Built-in plugins shipped with the runtime.
//!
//! Enabled by the `builtin` feature flag (on by default). They cover the two
//! mandatory categories so a container can be composed without any external
//! plugin crates.
//!
//! | Plugin | Category | Description |
//! |--------|----------|-------------|
//! | [`TracingLogger`] | `winext-logger` | Scoped loggers backed by `tracing` |
//! | [`StandardErrorManager`] | `winext-error-manager` | [`ManagedError`](winext_core::ManagedError)s with configurable codes |
//!
//! ```rust,ignore
//! use winext_runtime::builtin::{StandardErrorManager, TracingLogger};
//!
//! let registry = ModuleRegistry::new()
//!     .with_logger(Arc::new(TracingLogger::new()))
//!     .with_error_manager(Arc::new(StandardErrorManager::new()));
//! ```

pub mod error_manager;
pub mod logger;

pub use error_manager::StandardErrorManager;
pub use logger::TracingLogger;
