//! Sandbox configuration loader using figment.
//!
//! This module provides a layered configuration loading system that supports:
//!
//! - **Multiple sources**: JSON/TOML/YAML files, environment variables, programmatic defaults
//! - **Layered configuration**: Later sources override earlier ones
//! - **Profile support**: Development vs production sandboxes
//!
//! # Feature Flags
//!
//! JSON files are always supported.
//!
//! - `toml-config`: enables TOML files (`sandbox.toml`, `winext.toml`)
//! - `yaml-config`: enables YAML files (`sandbox.yaml`, `sandbox.yml`, …)
//!
//! # Configuration Priority (lowest to highest)
//!
//! 1. Built-in defaults (an empty sandbox)
//! 2. Profile-specific file (`sandbox.{profile}.json`, …)
//! 3. Main file (`sandbox.json`, …)
//! 4. Environment variables (`WINEXT_*`)
//! 5. Programmatic overrides
//!
//! # Environment Variable Mapping
//!
//! Environment variables use the `WINEXT_` prefix with `__` as separator:
//!
//! - `WINEXT_APPLICATION__DEPENDENCIES__WINEXT_LOGGER__LEVEL=debug`
//!   → `application.dependencies.winext_logger.level = "debug"`
//!
//! # Example
//!
//! ```rust,ignore
//! use winext_runtime::config::ConfigLoader;
//!
//! let sandbox = ConfigLoader::new()
//!     .file("./config/sandbox.json")
//!     .profile("production")
//!     .load()?;
//! ```

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized};
#[cfg(feature = "toml-config")]
use figment::providers::Toml;
#[cfg(feature = "yaml-config")]
use figment::providers::Yaml;
use tracing::{debug, info, trace, warn};

use super::error::{ConfigError, ConfigResult};
use super::schema::SandboxConfig;

/// Configuration profile for environment-specific settings.
#[derive(Debug, Clone, Default)]
pub enum Profile {
    /// Development profile (default).
    #[default]
    Development,
    /// Production profile.
    Production,
    /// Custom profile name.
    Custom(String),
}

impl Profile {
    /// Returns the profile name as a string.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Custom(name) => name,
        }
    }

    /// Parses a profile name, accepting short forms.
    pub fn parse(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "development" | "dev" => Self::Development,
            other => Self::Custom(other.to_string()),
        }
    }

    /// Reads `WINEXT_PROFILE`, defaulting to Development.
    pub fn from_env() -> Self {
        std::env::var("WINEXT_PROFILE")
            .map(|p| Self::parse(&p))
            .unwrap_or_default()
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Sandbox loader with figment-based multi-source support.
pub struct ConfigLoader {
    /// User-supplied overrides.
    figment: Figment,
    profile: Profile,
    search_paths: Vec<PathBuf>,
    load_env: bool,
    /// Specific file to load (overrides search).
    config_file: Option<PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Creates a new loader with defaults.
    pub fn new() -> Self {
        Self {
            figment: Figment::new(),
            profile: Profile::from_env(),
            search_paths: Vec::new(),
            load_env: true,
            config_file: None,
        }
    }

    /// Sets the configuration profile.
    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Profile::parse(&profile.into());
        self
    }

    /// Adds a search path for configuration files.
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.search_paths.push(path.as_ref().to_path_buf());
        self
    }

    /// Adds the current directory to the search paths.
    pub fn with_current_dir(self) -> Self {
        if let Ok(cwd) = std::env::current_dir() {
            self.search_path(cwd)
        } else {
            self
        }
    }

    /// Adds `<user config dir>/winext` to the search paths.
    pub fn with_user_config_dir(self) -> Self {
        if let Some(config_dir) = dirs::config_dir() {
            self.search_path(config_dir.join("winext"))
        } else {
            self
        }
    }

    /// Sets a specific configuration file to load.
    pub fn file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Enables loading environment variables (default: true).
    pub fn with_env(mut self) -> Self {
        self.load_env = true;
        self
    }

    /// Disables loading environment variables.
    pub fn without_env(mut self) -> Self {
        self.load_env = false;
        self
    }

    /// Merges a sandbox programmatically, on top of every other source.
    pub fn merge(mut self, sandbox: SandboxConfig) -> Self {
        self.figment = self.figment.merge(Serialized::defaults(sandbox));
        self
    }

    /// Loads and returns the sandbox configuration.
    pub fn load(self) -> ConfigResult<SandboxConfig> {
        let profile = self.profile.clone();
        let figment = self.build_figment()?;

        let sandbox: SandboxConfig = figment.extract().map_err(|e| {
            ConfigError::ParseError(format!("Failed to extract sandbox configuration: {e}"))
        })?;

        debug!(
            profile = %profile,
            dependencies = sandbox.dependencies().map_or(0, |d| d.len()),
            "Sandbox configuration loaded"
        );

        Ok(sandbox)
    }

    fn build_figment(mut self) -> ConfigResult<Figment> {
        let mut figment = Figment::from(Serialized::defaults(SandboxConfig::default()));

        if let Some(path) = self.config_file.take() {
            if path.exists() {
                info!(path = %path.display(), "Loading sandbox file");
                figment = Self::merge_config_file(figment, &path)?;
            } else {
                return Err(ConfigError::FileNotFound(path));
            }
        } else {
            figment = self.load_config_files(figment);
        }

        if self.load_env {
            trace!("Loading environment variables with WINEXT_ prefix");
            figment = figment.merge(Env::prefixed("WINEXT_").ignore(&["PROFILE"]).split("__"));
        }

        // Programmatic overrides win over every other source.
        let user_figment = std::mem::take(&mut self.figment);
        figment = figment.merge(user_figment);

        Ok(figment)
    }

    /// Merges a single file, dispatching on its extension.
    fn merge_config_file(figment: Figment, path: &Path) -> ConfigResult<Figment> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        match ext {
            "json" => Ok(figment.merge(Json::file(path))),
            #[cfg(feature = "toml-config")]
            "toml" => Ok(figment.merge(Toml::file(path))),
            #[cfg(feature = "yaml-config")]
            "yaml" | "yml" => Ok(figment.merge(Yaml::file(path))),
            _ => Err(ConfigError::ParseError(format!(
                "Unsupported or disabled configuration file format: .{ext}"
            ))),
        }
    }

    fn resolve_search_paths(&self) -> Vec<PathBuf> {
        if self.search_paths.is_empty() {
            let mut paths = Vec::new();
            if let Ok(cwd) = std::env::current_dir() {
                paths.push(cwd);
            }
            if let Some(config_dir) = dirs::config_dir() {
                paths.push(config_dir.join("winext"));
            }
            paths
        } else {
            self.search_paths.clone()
        }
    }

    /// Searches one file format.
    ///
    /// Iterates `search_paths × base_names`, merging a profile-specific
    /// variant first and then the base file. Stops at the first base file
    /// found.
    fn load_format_files<F>(
        &self,
        mut figment: Figment,
        search_paths: &[PathBuf],
        base_names: &[&str],
        merge_fn: F,
    ) -> (Figment, bool)
    where
        F: Fn(Figment, &Path) -> Figment,
    {
        for search_path in search_paths {
            for base_name in base_names {
                let Some((stem, ext)) = base_name.rsplit_once('.') else {
                    continue;
                };

                // e.g. sandbox.production.json
                let profile_path =
                    search_path.join(format!("{}.{}.{}", stem, self.profile.as_str(), ext));
                if profile_path.exists() {
                    debug!(path = %profile_path.display(), "Loading profile-specific sandbox");
                    figment = merge_fn(figment, &profile_path);
                }

                let base_path = search_path.join(base_name);
                if base_path.exists() {
                    info!(path = %base_path.display(), "Loading sandbox file");
                    figment = merge_fn(figment, &base_path);
                    return (figment, true);
                }
            }
        }
        (figment, false)
    }

    #[allow(unused_mut)]
    fn load_config_files(&self, figment: Figment) -> Figment {
        let search_paths = self.resolve_search_paths();

        let (mut figment, mut found) = self.load_format_files(
            figment,
            &search_paths,
            &["sandbox.json", "winext.json"],
            |fig, path| fig.merge(Json::file(path)),
        );

        #[cfg(feature = "toml-config")]
        {
            let (f, ok) = self.load_format_files(
                figment,
                &search_paths,
                &["sandbox.toml", "winext.toml"],
                |fig, path| fig.merge(Toml::file(path)),
            );
            figment = f;
            found |= ok;
        }

        #[cfg(feature = "yaml-config")]
        {
            let (f, ok) = self.load_format_files(
                figment,
                &search_paths,
                &["sandbox.yaml", "sandbox.yml", "winext.yaml", "winext.yml"],
                |fig, path| fig.merge(Yaml::file(path)),
            );
            figment = f;
            found |= ok;
        }

        if !found {
            warn!("No sandbox file found, using defaults");
        }
        figment
    }
}

/// Loads the sandbox from the default search locations.
pub fn load_config() -> ConfigResult<SandboxConfig> {
    ConfigLoader::new().load()
}

/// Loads the sandbox from a specific file, with environment overrides.
pub fn load_config_from_file<P: AsRef<Path>>(path: P) -> ConfigResult<SandboxConfig> {
    ConfigLoader::new().file(path).load()
}
