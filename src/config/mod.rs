//! Configuration types for the loan origination API SDK.
//!
//! This module provides the core configuration types used to initialize
//! and configure the SDK for API communication.
//!
//! # Overview
//!
//! The main types in this module are:
//!
//! - [`LosConfig`]: The main configuration struct holding all SDK settings
//! - [`LosConfigBuilder`]: A builder for constructing [`LosConfig`] instances
//! - [`ApiKey`]: A validated API key newtype with masked debug output
//! - [`AccessToken`]: A validated account access token
//! - [`BaseUrl`]: A validated API base URL
//! - [`ApiVersion`]: The API version clients are bound to
//!
//! # Example
//!
//! ```rust
//! use los_api::{LosConfig, ApiKey, ApiVersion, BaseUrl};
//!
//! let config = LosConfig::builder()
//!     .base_url(BaseUrl::new("https://api.example.com").unwrap())
//!     .api_key(ApiKey::new("my-api-key").unwrap())
//!     .api_version(ApiVersion::Current)
//!     .build()
//!     .unwrap();
//! ```

mod newtypes;
mod version;

use std::time::Duration;

pub use newtypes::{AccessToken, ApiKey, BaseUrl};
pub use version::ApiVersion;

use crate::error::ConfigError;

/// Configuration for the loan origination API SDK.
///
/// # Thread Safety
///
/// `LosConfig` is `Clone`, `Send`, and `Sync`, making it safe to share
/// across threads and async tasks.
///
/// # Version Binding
///
/// The API version is an explicit configuration value. When it is not set,
/// clients are bound to [`ApiVersion::Legacy`].
#[derive(Clone, Debug)]
pub struct LosConfig {
    base_url: BaseUrl,
    auth_base_url: Option<BaseUrl>,
    api_key: Option<ApiKey>,
    api_version: ApiVersion,
    tries: u32,
    timeout: Option<Duration>,
    user_agent_prefix: Option<String>,
}

impl LosConfig {
    /// Creates a new builder for constructing a `LosConfig`.
    #[must_use]
    pub fn builder() -> LosConfigBuilder {
        LosConfigBuilder::new()
    }

    /// Returns the base URL of the platform API.
    #[must_use]
    pub const fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    /// Returns the base URL of the accounts (auth) service.
    ///
    /// Falls back to [`base_url`](Self::base_url) when not configured.
    #[must_use]
    pub fn auth_base_url(&self) -> &BaseUrl {
        self.auth_base_url.as_ref().unwrap_or(&self.base_url)
    }

    /// Returns the API key, if configured.
    #[must_use]
    pub const fn api_key(&self) -> Option<&ApiKey> {
        self.api_key.as_ref()
    }

    /// Returns the API version clients are bound to.
    #[must_use]
    pub const fn api_version(&self) -> ApiVersion {
        self.api_version
    }

    /// Returns the number of attempts the HTTP transport makes per request.
    #[must_use]
    pub const fn tries(&self) -> u32 {
        self.tries
    }

    /// Returns the transport request timeout, if configured.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Returns the user agent prefix, if configured.
    #[must_use]
    pub fn user_agent_prefix(&self) -> Option<&str> {
        self.user_agent_prefix.as_deref()
    }
}

// Verify LosConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<LosConfig>();
};

/// Builder for constructing [`LosConfig`] instances.
///
/// The only required field is `base_url`.
///
/// # Defaults
///
/// - `api_version`: [`ApiVersion::Legacy`]
/// - `tries`: `1` (no retries)
/// - `auth_base_url`: same as `base_url`
/// - `api_key`, `timeout`, `user_agent_prefix`: `None`
#[derive(Debug, Default)]
pub struct LosConfigBuilder {
    base_url: Option<BaseUrl>,
    auth_base_url: Option<BaseUrl>,
    api_key: Option<ApiKey>,
    api_version: Option<ApiVersion>,
    tries: Option<u32>,
    timeout: Option<Duration>,
    user_agent_prefix: Option<String>,
}

impl LosConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base URL (required).
    #[must_use]
    pub fn base_url(mut self, url: BaseUrl) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Sets a separate base URL for the accounts (auth) service.
    #[must_use]
    pub fn auth_base_url(mut self, url: BaseUrl) -> Self {
        self.auth_base_url = Some(url);
        self
    }

    /// Sets the API key.
    #[must_use]
    pub fn api_key(mut self, key: ApiKey) -> Self {
        self.api_key = Some(key);
        self
    }

    /// Sets the API version clients are bound to.
    #[must_use]
    pub const fn api_version(mut self, version: ApiVersion) -> Self {
        self.api_version = Some(version);
        self
    }

    /// Sets how many times the HTTP transport attempts a request.
    ///
    /// Values below 1 are treated as 1.
    #[must_use]
    pub const fn tries(mut self, tries: u32) -> Self {
        self.tries = Some(tries);
        self
    }

    /// Sets the transport request timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the user agent prefix for HTTP requests.
    #[must_use]
    pub fn user_agent_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.user_agent_prefix = Some(prefix.into());
        self
    }

    /// Builds the [`LosConfig`], validating that required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] if `base_url` is not set.
    pub fn build(self) -> Result<LosConfig, ConfigError> {
        let base_url = self
            .base_url
            .ok_or(ConfigError::MissingRequiredField { field: "base_url" })?;

        Ok(LosConfig {
            base_url,
            auth_base_url: self.auth_base_url,
            api_key: self.api_key,
            api_version: self.api_version.unwrap_or_default(),
            tries: self.tries.unwrap_or(1).max(1),
            timeout: self.timeout,
            user_agent_prefix: self.user_agent_prefix,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> BaseUrl {
        BaseUrl::new("https://api.example.com").unwrap()
    }

    #[test]
    fn test_builder_requires_base_url() {
        let result = LosConfigBuilder::new()
            .api_key(ApiKey::new("key").unwrap())
            .build();

        assert!(matches!(
            result,
            Err(ConfigError::MissingRequiredField { field: "base_url" })
        ));
    }

    #[test]
    fn test_builder_provides_sensible_defaults() {
        let config = LosConfig::builder().base_url(base_url()).build().unwrap();

        assert_eq!(config.api_version(), ApiVersion::Legacy);
        assert_eq!(config.tries(), 1);
        assert!(config.api_key().is_none());
        assert!(config.timeout().is_none());
        assert!(config.user_agent_prefix().is_none());
        assert_eq!(config.auth_base_url(), config.base_url());
    }

    #[test]
    fn test_builder_with_all_optional_fields() {
        let auth = BaseUrl::new("https://auth.example.com").unwrap();
        let config = LosConfig::builder()
            .base_url(base_url())
            .auth_base_url(auth.clone())
            .api_key(ApiKey::new("key").unwrap())
            .api_version(ApiVersion::Current)
            .tries(3)
            .timeout(Duration::from_secs(10))
            .user_agent_prefix("MyApp/1.0")
            .build()
            .unwrap();

        assert_eq!(config.api_version(), ApiVersion::Current);
        assert_eq!(config.auth_base_url(), &auth);
        assert_eq!(config.api_key().map(AsRef::as_ref), Some("key"));
        assert_eq!(config.tries(), 3);
        assert_eq!(config.timeout(), Some(Duration::from_secs(10)));
        assert_eq!(config.user_agent_prefix(), Some("MyApp/1.0"));
    }

    #[test]
    fn test_zero_tries_is_clamped_to_one() {
        let config = LosConfig::builder()
            .base_url(base_url())
            .tries(0)
            .build()
            .unwrap();
        assert_eq!(config.tries(), 1);
    }

    #[test]
    fn test_config_is_clone_and_debug() {
        let config = LosConfig::builder()
            .base_url(base_url())
            .api_key(ApiKey::new("secret-key").unwrap())
            .build()
            .unwrap();

        let cloned = config.clone();
        assert_eq!(cloned.base_url(), config.base_url());

        let debug_str = format!("{:?}", config);
        assert!(debug_str.contains("LosConfig"));
        assert!(!debug_str.contains("secret-key"));
    }
}
