//! API version gating for resource methods.
//!
//! Method availability is a pure function of `(method, version)`, decided by
//! [`is_method_supported`]. [`VersionGuard`] carries a client's bound version
//! and applies that table before anything is dispatched.

use std::fmt;

use crate::config::ApiVersion;
use crate::rest::ResourceError;

/// Generic resource methods subject to version gating.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ApiMethod {
    /// Paginated lookup.
    Find,
    /// Ranked search.
    Search,
    /// Cursor listing.
    List,
    /// Unpaginated collection lookup.
    FindCollection,
    /// Create.
    Create,
    /// Update.
    Update,
    /// Delete.
    Delete,
}

impl fmt::Display for ApiMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Find => "find",
            Self::Search => "search",
            Self::List => "list",
            Self::FindCollection => "find_collection",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// How a `find` call is served.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FindStrategy {
    /// Plain offset pagination on the collection path.
    Offset,
    /// Ranked search on the search path.
    Search,
}

/// The compatibility table.
///
/// Cursor listing and ranked search do not exist on the legacy API.
#[must_use]
pub const fn is_method_supported(method: ApiMethod, version: ApiVersion) -> bool {
    match (method, version) {
        (ApiMethod::List | ApiMethod::Search, ApiVersion::Legacy) => false,
        (
            ApiMethod::Find
            | ApiMethod::Search
            | ApiMethod::List
            | ApiMethod::FindCollection
            | ApiMethod::Create
            | ApiMethod::Update
            | ApiMethod::Delete,
            ApiVersion::Legacy | ApiVersion::Current,
        ) => true,
    }
}

/// Selects the backend behavior behind `find` for a version.
#[must_use]
pub const fn find_strategy(version: ApiVersion) -> FindStrategy {
    match version {
        ApiVersion::Legacy => FindStrategy::Offset,
        ApiVersion::Current => FindStrategy::Search,
    }
}

/// A client's immutable version binding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VersionGuard {
    version: ApiVersion,
}

impl VersionGuard {
    /// Binds to `version`.
    #[must_use]
    pub const fn new(version: ApiVersion) -> Self {
        Self { version }
    }

    /// Returns the bound version.
    #[must_use]
    pub const fn version(&self) -> ApiVersion {
        self.version
    }

    /// Returns `true` if `method` is available for the bound version.
    #[must_use]
    pub const fn supports(&self, method: ApiMethod) -> bool {
        is_method_supported(method, self.version)
    }

    /// Returns the `find` strategy for the bound version.
    #[must_use]
    pub const fn find_strategy(&self) -> FindStrategy {
        find_strategy(self.version)
    }

    /// Fails if `method` is not available for the bound version.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::UnsupportedApiVersion`].
    pub fn ensure(&self, resource: &'static str, method: ApiMethod) -> Result<(), ResourceError> {
        if self.supports(method) {
            return Ok(());
        }
        tracing::warn!(
            "{}::{} rejected: not supported for API version {}",
            resource,
            method,
            self.version
        );
        Err(ResourceError::UnsupportedApiVersion {
            resource,
            method,
            version: self.version,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_rejects_list_and_search() {
        assert!(!is_method_supported(ApiMethod::List, ApiVersion::Legacy));
        assert!(!is_method_supported(ApiMethod::Search, ApiVersion::Legacy));
        assert!(is_method_supported(ApiMethod::Find, ApiVersion::Legacy));
        assert!(is_method_supported(ApiMethod::Create, ApiVersion::Legacy));
    }

    #[test]
    fn test_current_supports_everything() {
        for method in [
            ApiMethod::Find,
            ApiMethod::Search,
            ApiMethod::List,
            ApiMethod::FindCollection,
            ApiMethod::Create,
            ApiMethod::Update,
            ApiMethod::Delete,
        ] {
            assert!(is_method_supported(method, ApiVersion::Current), "{method}");
        }
    }

    #[test]
    fn test_find_strategy_per_version() {
        assert_eq!(find_strategy(ApiVersion::Legacy), FindStrategy::Offset);
        assert_eq!(find_strategy(ApiVersion::Current), FindStrategy::Search);
    }

    #[test]
    fn test_default_guard_is_legacy() {
        let guard = VersionGuard::default();
        assert_eq!(guard.version(), ApiVersion::Legacy);
        assert_eq!(guard.find_strategy(), FindStrategy::Offset);
    }

    #[test]
    fn test_ensure_returns_version_error() {
        let guard = VersionGuard::new(ApiVersion::Legacy);
        let error = guard.ensure("Application", ApiMethod::List).unwrap_err();

        assert!(matches!(
            error,
            ResourceError::UnsupportedApiVersion {
                resource: "Application",
                method: ApiMethod::List,
                version: ApiVersion::Legacy,
            }
        ));
        assert!(VersionGuard::new(ApiVersion::Current)
            .ensure("Application", ApiMethod::List)
            .is_ok());
    }

    #[test]
    fn test_method_display() {
        assert_eq!(ApiMethod::List.to_string(), "list");
        assert_eq!(ApiMethod::FindCollection.to_string(), "find_collection");
    }
}
