//! Entry point tying configuration, transport and resource clients together.
//!
//! [`LosClient`] builds one [`HttpClient`] for the platform API and one for
//! the auth service, then hands out resource clients that share them.

use std::sync::Arc;

use crate::clients::{HttpClient, HttpError};
use crate::config::{ApiVersion, LosConfig};
use crate::rest::resources::{
    AccountsApi, ApplicationDocumentsApi, ApplicationStatusesApi, ApplicationsApi,
    ProductCalculationsApi,
};

/// Client for the loan origination platform.
///
/// Every resource client it returns is bound to the same API version: the
/// configured one, or the one passed to [`LosClient::with_version`].
///
/// # Thread Safety
///
/// `LosClient` is `Send + Sync`. Resource clients share the underlying HTTP
/// clients through [`Arc`], so creating them is cheap.
///
/// # Example
///
/// ```rust,ignore
/// use los_api::{ApiKey, ApiVersion, BaseUrl, LosClient, LosConfig};
/// use los_api::rest::resources::FindApplicationsParams;
///
/// let config = LosConfig::builder()
///     .base_url(BaseUrl::new("https://api.example.com")?)
///     .api_key(ApiKey::new("key")?)
///     .api_version(ApiVersion::Current)
///     .build()?;
///
/// let client = LosClient::new(&config)?;
/// let page = client
///     .applications()
///     .find(&FindApplicationsParams::default())
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct LosClient {
    http_client: Arc<HttpClient>,
    auth_client: Arc<HttpClient>,
    api_version: ApiVersion,
}

// Verify LosClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<LosClient>();
};

impl LosClient {
    /// Creates a client bound to the configured API version.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Network`] if an HTTP client cannot be created.
    pub fn new(config: &LosConfig) -> Result<Self, HttpError> {
        Self::create_client(config, config.api_version())
    }

    /// Creates a client bound to `version` instead of the configured one.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Network`] if an HTTP client cannot be created.
    pub fn with_version(config: &LosConfig, version: ApiVersion) -> Result<Self, HttpError> {
        if version != config.api_version() {
            tracing::debug!(
                "LosClient overriding API version {} with {}",
                config.api_version(),
                version
            );
        }
        Self::create_client(config, version)
    }

    fn create_client(config: &LosConfig, api_version: ApiVersion) -> Result<Self, HttpError> {
        if api_version.is_legacy() {
            tracing::warn!(
                "LosClient bound to API version {}: application search and listing are unavailable",
                api_version
            );
        }

        Ok(Self {
            http_client: Arc::new(HttpClient::from_config(config)?),
            auth_client: Arc::new(HttpClient::auth_from_config(config)?),
            api_version,
        })
    }

    /// Returns the bound API version.
    #[must_use]
    pub const fn api_version(&self) -> ApiVersion {
        self.api_version
    }

    /// Returns the platform HTTP client.
    #[must_use]
    pub const fn http_client(&self) -> &Arc<HttpClient> {
        &self.http_client
    }

    #[must_use]
    pub fn applications(&self) -> ApplicationsApi<Arc<HttpClient>> {
        ApplicationsApi::new(Arc::clone(&self.http_client), Some(self.api_version))
    }

    #[must_use]
    pub fn application_documents(&self) -> ApplicationDocumentsApi<Arc<HttpClient>> {
        ApplicationDocumentsApi::new(Arc::clone(&self.http_client), Some(self.api_version))
    }

    #[must_use]
    pub fn application_statuses(&self) -> ApplicationStatusesApi<Arc<HttpClient>> {
        ApplicationStatusesApi::new(Arc::clone(&self.http_client), Some(self.api_version))
    }

    #[must_use]
    pub fn product_calculations(&self) -> ProductCalculationsApi<Arc<HttpClient>> {
        ProductCalculationsApi::new(Arc::clone(&self.http_client), Some(self.api_version))
    }

    /// Accounts live on the auth service.
    #[must_use]
    pub fn accounts(&self) -> AccountsApi<Arc<HttpClient>> {
        AccountsApi::new(Arc::clone(&self.auth_client), Some(self.api_version))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BaseUrl;

    fn config(version: Option<ApiVersion>) -> LosConfig {
        let mut builder =
            LosConfig::builder().base_url(BaseUrl::new("https://api.example.com").unwrap());
        if let Some(version) = version {
            builder = builder.api_version(version);
        }
        builder.build().unwrap()
    }

    #[test]
    fn test_client_defaults_to_legacy() {
        let client = LosClient::new(&config(None)).unwrap();
        assert_eq!(client.api_version(), ApiVersion::Legacy);
        assert_eq!(client.applications().version(), ApiVersion::Legacy);
    }

    #[test]
    fn test_resource_clients_share_the_version() {
        let client = LosClient::new(&config(Some(ApiVersion::Current))).unwrap();
        assert_eq!(client.applications().version(), ApiVersion::Current);
    }

    #[test]
    fn test_with_version_overrides_config() {
        let client =
            LosClient::with_version(&config(Some(ApiVersion::Current)), ApiVersion::Legacy)
                .unwrap();
        assert_eq!(client.api_version(), ApiVersion::Legacy);
    }

    #[test]
    fn test_resource_clients_share_the_http_client() {
        let client = LosClient::new(&config(None)).unwrap();
        let _applications = client.applications();
        let _documents = client.application_documents();
        assert_eq!(Arc::strong_count(client.http_client()), 3);
    }
}
