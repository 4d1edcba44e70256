//! Plugin categories and the fixed build order.
//!
//! Every infrastructure plugin belongs to exactly one [`Category`]. A category
//! has two spellings:
//!
//! - its **identifier** (hyphen-joined, e.g. `winext-repo-store`), used in the
//!   declared-plugin list and for module resolution;
//! - its **config key** (underscore-joined, e.g. `winext_repo_store`), used to
//!   look up its configuration sub-tree under `application.dependencies`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A named kind of infrastructure plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Logger,
    ErrorManager,
    KeyManager,
    ApiGateway,
    ServiceRegistry,
    RepoStore,
    RedisStore,
    Authorization,
    MappingStore,
    Server,
}

impl Category {
    /// Categories in the order the container wires them.
    ///
    /// Later categories may read handles produced by earlier ones, never the
    /// other way around.
    pub const BUILD_ORDER: [Category; 10] = [
        Category::Logger,
        Category::ErrorManager,
        Category::KeyManager,
        Category::ApiGateway,
        Category::ServiceRegistry,
        Category::RepoStore,
        Category::RedisStore,
        Category::Authorization,
        Category::MappingStore,
        Category::Server,
    ];

    /// Categories that must be declared and resolvable for every composition.
    pub const MANDATORY: [Category; 2] = [Category::Logger, Category::ErrorManager];

    /// Hyphen-joined plugin identifier.
    pub const fn identifier(self) -> &'static str {
        match self {
            Self::Logger => "winext-logger",
            Self::ErrorManager => "winext-error-manager",
            Self::KeyManager => "winext-key-manager",
            Self::ApiGateway => "winext-api-gateway",
            Self::ServiceRegistry => "winext-service-registry",
            Self::RepoStore => "winext-repo-store",
            Self::RedisStore => "winext-redis-store",
            Self::Authorization => "winext-authorization",
            Self::MappingStore => "winext-mapping-store",
            Self::Server => "winext-runserver",
        }
    }

    /// Underscore-joined key of this category's config sub-tree.
    pub const fn config_key(self) -> &'static str {
        match self {
            Self::Logger => "winext_logger",
            Self::ErrorManager => "winext_error_manager",
            Self::KeyManager => "winext_key_manager",
            Self::ApiGateway => "winext_api_gateway",
            Self::ServiceRegistry => "winext_service_registry",
            Self::RepoStore => "winext_repo_store",
            Self::RedisStore => "winext_redis_store",
            Self::Authorization => "winext_authorization",
            Self::MappingStore => "winext_mapping_store",
            Self::Server => "winext_runserver",
        }
    }

    /// Name of the slot this category occupies on the application handle.
    pub const fn slot_name(self) -> &'static str {
        match self {
            Self::Logger => "logger",
            Self::ErrorManager => "error_manager",
            Self::KeyManager => "key_manager",
            Self::ApiGateway => "api_gateway",
            Self::ServiceRegistry => "service_registry",
            Self::RepoStore => "repo_store",
            Self::RedisStore => "redis_store",
            Self::Authorization => "authorization",
            Self::MappingStore => "mapping_store",
            Self::Server => "server",
        }
    }

    /// Returns `true` for the logger and error-manager categories.
    pub const fn is_mandatory(self) -> bool {
        matches!(self, Self::Logger | Self::ErrorManager)
    }

    /// Looks a category up by its hyphen-joined identifier.
    pub fn from_identifier(identifier: &str) -> Option<Self> {
        Self::BUILD_ORDER
            .into_iter()
            .find(|c| c.identifier() == identifier)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

/// Error returned when parsing an unknown plugin identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown plugin identifier: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_identifier(s).ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// Converts an underscore-joined config key into its hyphen-joined
/// identifier form.
///
/// Every underscore is replaced, so `winext_repo_store` becomes
/// `winext-repo-store`.
pub fn normalize_key(key: &str) -> String {
    key.replace('_', "-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_round_trip() {
        for category in Category::BUILD_ORDER {
            assert_eq!(category.identifier().parse::<Category>(), Ok(category));
        }
        assert!("winext-unknown".parse::<Category>().is_err());
    }

    #[test]
    fn test_config_key_normalizes_to_identifier() {
        for category in Category::BUILD_ORDER {
            assert_eq!(normalize_key(category.config_key()), category.identifier());
        }
    }

    #[test]
    fn test_normalize_replaces_every_underscore() {
        assert_eq!(normalize_key("winext_service_registry"), "winext-service-registry");
        assert_eq!(normalize_key("plain"), "plain");
    }

    #[test]
    fn test_build_order_starts_with_mandatory() {
        assert_eq!(&Category::BUILD_ORDER[..2], &Category::MANDATORY);
        assert_eq!(Category::BUILD_ORDER.last(), Some(&Category::Server));
        assert!(Category::Logger.is_mandatory());
        assert!(!Category::KeyManager.is_mandatory());
    }
}
