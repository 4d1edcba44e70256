//! Dependency validation.
//!
//! Cross-checks a sandbox's configured plugins against the identifiers the
//! caller declared as available. Every check is pure, and the first
//! violation short-circuits the rest.

use serde_json::Map;
use winext_core::normalize_key;

use super::error::{ValidationError, ValidationResult};
use super::schema::{DeclaredPlugins, SandboxConfig};

/// Runs every validation rule in order.
pub fn validate_sandbox(sandbox: &SandboxConfig, declared: &DeclaredPlugins) -> ValidationResult<()> {
    validate_shape(sandbox)?;
    validate_declared(declared)?;
    validate_dependency_keys(sandbox, declared)?;
    Ok(())
}

/// Checks the sandbox document itself (rules 1–3).
pub fn validate_shape(sandbox: &SandboxConfig) -> ValidationResult<()> {
    if sandbox.is_empty() {
        return Err(ValidationError::SandboxConfigNotFound);
    }

    let application = match &sandbox.application {
        Some(app) if !app.is_empty() => app,
        _ => return Err(ValidationError::ApplicationConfigNotFound),
    };

    if application.dependencies.as_ref().is_none_or(Map::is_empty) {
        return Err(ValidationError::PluginConfigNotFoundInApplications);
    }

    Ok(())
}

/// Checks that at least one plugin was declared (rule 4).
pub fn validate_declared(declared: &DeclaredPlugins) -> ValidationResult<()> {
    if declared.is_empty() {
        return Err(ValidationError::DependenciesNotFound);
    }
    Ok(())
}

/// Checks that every configured plugin was declared (rule 5).
///
/// Keys are compared after replacing every `_` with `-`.
pub fn validate_dependency_keys(
    sandbox: &SandboxConfig,
    declared: &DeclaredPlugins,
) -> ValidationResult<()> {
    let Some(dependencies) = sandbox.dependencies() else {
        return Err(ValidationError::PluginConfigNotFoundInApplications);
    };

    for key in dependencies.keys() {
        let plugin = normalize_key(key);
        if !declared.contains(&plugin) {
            return Err(ValidationError::NotFoundModuleInDependencies { plugin });
        }
    }

    Ok(())
}
