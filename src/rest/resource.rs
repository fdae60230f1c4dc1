//! The generic resource client.
//!
//! A resource describes itself through [`Resource`] (name and path) plus one
//! capability trait per generic operation it supports:
//!
//! | Capability | Operations | Request |
//! |------------|------------|---------|
//! | [`Findable`] | `find`, `search`, `find_collection` | `GET /{path}`, `GET /{path}/search` |
//! | [`Listable`] | `list` | `GET /{path}/list` |
//! | [`Creatable`] | `create` | `POST /{path}` |
//! | [`Updatable`] | `update` | `PUT /{path}/{id}` |
//! | [`Deletable`] | `delete` | `DELETE /{path}/{id}` |
//!
//! [`ResourceClient`] provides each operation only for resources that have
//! the capability. Every operation consults the client's [`VersionGuard`]
//! and encodes its parameters through [`Filter`](crate::rest::Filter) before
//! handing a request to the [`Transport`].
//!
//! # Example
//!
//! ```rust,ignore
//! use los_api::rest::{Findable, Resource, ResourceClient};
//!
//! #[derive(Debug, Deserialize)]
//! pub struct Label {
//!     pub id: String,
//!     pub name: String,
//! }
//!
//! impl Resource for Label {
//!     const NAME: &'static str = "Label";
//!     const PATH: &'static str = "labels";
//! }
//!
//! impl Findable for Label {
//!     type FindParams = FindLabelsParams;
//! }
//!
//! let labels: ResourceClient<Label, _> = ResourceClient::new(transport, Some(ApiVersion::Current));
//! let page = labels.find(&FindLabelsParams::default()).await?;
//! ```

use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::clients::{HttpMethod, HttpRequest, Transport};
use crate::config::ApiVersion;
use crate::rest::pagination::{decode, resolve_cursor, resolve_page};
use crate::rest::{
    ApiMethod, CursorPaginationResult, EncodeError, FindStrategy, MultipartPayload,
    PaginationResult, QueryParams, ResourceError, VersionGuard,
};

/// An entity served by the platform API.
pub trait Resource: DeserializeOwned + Send + Sync {
    /// Singular name used in errors and logs (e.g. "Application").
    const NAME: &'static str;

    /// Collection path segment without slashes (e.g. "applications").
    const PATH: &'static str;
}

/// Resources that can be looked up with filters.
pub trait Findable: Resource {
    /// Parameters for `find`, `search` and `find_collection`.
    type FindParams: QueryParams + Sync;
}

/// Resources that support cursor listing.
pub trait Listable: Resource {
    /// Parameters for `list`.
    type ListParams: QueryParams + Sync;
}

/// Resources that can be created with a JSON body.
pub trait Creatable: Resource {
    /// Body for `create`.
    type CreateParams: Serialize + Sync;
}

/// Resources that can be updated with a JSON body.
pub trait Updatable: Resource {
    /// Body for `update`.
    type UpdateParams: Serialize + Sync;
}

/// Resources that can be deleted by id.
pub trait Deletable: Resource {}

/// Generic client for one resource type over a [`Transport`].
///
/// The API version is bound at construction and never changes. The client
/// holds no other state, so concurrent calls through `&self` are safe.
pub struct ResourceClient<R, T> {
    transport: T,
    guard: VersionGuard,
    resource: PhantomData<fn() -> R>,
}

impl<R: Resource, T: Transport> ResourceClient<R, T> {
    /// Creates a client bound to `version`.
    ///
    /// `None` binds to [`ApiVersion::Legacy`].
    #[must_use]
    pub fn new(transport: T, version: Option<ApiVersion>) -> Self {
        let version = version.map_or_else(
            || {
                tracing::warn!(
                    "No API version bound for {}, using {} (search and list unavailable)",
                    R::NAME,
                    ApiVersion::default()
                );
                ApiVersion::default()
            },
            |version| {
                tracing::debug!("{} client bound to API version {}", R::NAME, version);
                version
            },
        );

        Self {
            transport,
            guard: VersionGuard::new(version),
            resource: PhantomData,
        }
    }

    /// Returns the bound API version.
    #[must_use]
    pub const fn version(&self) -> ApiVersion {
        self.guard.version()
    }

    /// Returns the version guard.
    #[must_use]
    pub const fn guard(&self) -> &VersionGuard {
        &self.guard
    }

    /// Returns the transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// `/{path}`
    #[must_use]
    pub fn collection_path(&self) -> String {
        format!("/{}", R::PATH)
    }

    /// `/{path}/{suffix}`
    #[must_use]
    pub fn sub_path(&self, suffix: &str) -> String {
        format!("/{}/{suffix}", R::PATH)
    }

    /// `/{path}/{id}` with `id` percent-encoded.
    #[must_use]
    pub fn member_path(&self, id: &str) -> String {
        format!("/{}/{}", R::PATH, urlencoding::encode(id))
    }

    /// `/{path}/{id}/{suffix}` with `id` percent-encoded.
    #[must_use]
    pub fn member_sub_path(&self, id: &str, suffix: &str) -> String {
        format!("{}/{suffix}", self.member_path(id))
    }

    /// Sends `request` on behalf of `method` and returns the raw response
    /// body.
    ///
    /// Resource-specific endpoints dispatch through this method (or the
    /// helpers built on it) with the closest [`ApiMethod`], so they are
    /// gated by the same compatibility table as the generic operations.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::UnsupportedApiVersion`] without calling the
    /// transport if `method` is not available on the bound version, and
    /// [`ResourceError::Http`] with the transport's error unchanged.
    pub async fn send(
        &self,
        method: ApiMethod,
        request: HttpRequest,
    ) -> Result<serde_json::Value, ResourceError> {
        self.guard.ensure(R::NAME, method)?;
        self.dispatch(request).await
    }

    /// Sends `request` on behalf of `method` and decodes the response body
    /// into `O`.
    ///
    /// # Errors
    ///
    /// The errors of [`ResourceClient::send`], plus
    /// [`ResourceError::InvalidResponse`] if the body does not decode.
    pub async fn call<O: DeserializeOwned>(
        &self,
        method: ApiMethod,
        request: HttpRequest,
    ) -> Result<O, ResourceError> {
        let body = self.send(method, request).await?;
        decode(R::NAME, body)
    }

    /// `GET` at `path` with `params` encoded as the query string.
    ///
    /// The guard runs before `params` are encoded.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Encoding`] if `params` fail to encode, plus
    /// the errors of [`ResourceClient::call`].
    pub async fn get<O: DeserializeOwned, P: QueryParams + ?Sized>(
        &self,
        method: ApiMethod,
        path: String,
        params: &P,
    ) -> Result<O, ResourceError> {
        self.guard.ensure(R::NAME, method)?;
        let query = params.to_filter().encode()?;
        let request = HttpRequest::builder(HttpMethod::Get, path)
            .query(query)
            .build()?;
        let body = self.dispatch(request).await?;
        decode(R::NAME, body)
    }

    /// Sends `body` as JSON with `http_method` to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Encoding`] if `body` cannot be serialized,
    /// plus the errors of [`ResourceClient::call`].
    pub async fn send_json<O: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: ApiMethod,
        http_method: HttpMethod,
        path: String,
        body: &B,
    ) -> Result<O, ResourceError> {
        self.guard.ensure(R::NAME, method)?;
        let request = HttpRequest::builder(http_method, path)
            .json(json_body(body)?)
            .build()?;
        let body = self.dispatch(request).await?;
        decode(R::NAME, body)
    }

    /// Posts a multipart payload to `path` and returns the raw body.
    ///
    /// # Errors
    ///
    /// The errors of [`ResourceClient::send`].
    pub async fn upload(
        &self,
        method: ApiMethod,
        path: String,
        payload: MultipartPayload,
    ) -> Result<serde_json::Value, ResourceError> {
        let request = HttpRequest::builder(HttpMethod::Post, path)
            .multipart(payload)
            .build()?;
        self.send(method, request).await
    }

    /// The single dispatch point. Callers have already consulted the guard.
    async fn dispatch(&self, request: HttpRequest) -> Result<serde_json::Value, ResourceError> {
        tracing::debug!(
            "{} dispatch: {} {} ({} query params, API version {})",
            R::NAME,
            request.http_method,
            request.path,
            request.query.len(),
            self.guard.version()
        );
        Ok(self.transport.perform(request).await?)
    }
}

impl<R: Findable, T: Transport> ResourceClient<R, T> {
    /// Paginated lookup.
    ///
    /// On [`ApiVersion::Legacy`] this is served by offset pagination at
    /// `GET /{path}`; on newer versions it is redirected to
    /// [`search`](Self::search). Both return the same result type.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] on encoding, transport or decoding failure.
    pub async fn find(&self, params: &R::FindParams) -> Result<PaginationResult<R>, ResourceError> {
        self.guard.ensure(R::NAME, ApiMethod::Find)?;

        match self.guard.find_strategy() {
            FindStrategy::Offset => {
                let query = params.to_filter().encode()?;
                let request = HttpRequest::builder(HttpMethod::Get, self.collection_path())
                    .query(query)
                    .build()?;
                let body = self.dispatch(request).await?;
                resolve_page(R::NAME, FindStrategy::Offset, body)
            }
            FindStrategy::Search => self.search(params).await,
        }
    }

    /// Ranked search at `GET /{path}/search`.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::UnsupportedApiVersion`] on
    /// [`ApiVersion::Legacy`] without calling the transport, otherwise the
    /// errors of [`find`](Self::find).
    pub async fn search(
        &self,
        params: &R::FindParams,
    ) -> Result<PaginationResult<R>, ResourceError> {
        self.guard.ensure(R::NAME, ApiMethod::Search)?;

        let query = params.to_filter().encode()?;
        let request = HttpRequest::builder(HttpMethod::Get, self.sub_path("search"))
            .query(query)
            .build()?;
        let body = self.dispatch(request).await?;
        resolve_page(R::NAME, FindStrategy::Search, body)
    }

    /// Unpaginated lookup at `GET /{path}`, for collections the backend
    /// returns as a bare array.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] on encoding, transport or decoding failure.
    pub async fn find_collection(&self, params: &R::FindParams) -> Result<Vec<R>, ResourceError> {
        self.get(ApiMethod::FindCollection, self.collection_path(), params)
            .await
    }
}

impl<R: Listable, T: Transport> ResourceClient<R, T> {
    /// Cursor listing at `GET /{path}/list`.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::UnsupportedApiVersion`] on
    /// [`ApiVersion::Legacy`] without calling the transport, otherwise
    /// [`ResourceError`] on encoding, transport or decoding failure.
    pub async fn list(
        &self,
        params: &R::ListParams,
    ) -> Result<CursorPaginationResult<R>, ResourceError> {
        self.guard.ensure(R::NAME, ApiMethod::List)?;

        let query = params.to_filter().encode()?;
        let request = HttpRequest::builder(HttpMethod::Get, self.sub_path("list"))
            .query(query)
            .build()?;
        let body = self.dispatch(request).await?;
        resolve_cursor(R::NAME, body)
    }
}

impl<R: Creatable, T: Transport> ResourceClient<R, T> {
    /// `POST /{path}` with `params` as the JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] on encoding, transport or decoding failure.
    pub async fn create(&self, params: &R::CreateParams) -> Result<R, ResourceError> {
        self.send_json(
            ApiMethod::Create,
            HttpMethod::Post,
            self.collection_path(),
            params,
        )
        .await
    }
}

impl<R: Updatable, T: Transport> ResourceClient<R, T> {
    /// `PUT /{path}/{id}` with `params` as the JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] on encoding, transport or decoding failure.
    pub async fn update(&self, id: &str, params: &R::UpdateParams) -> Result<R, ResourceError> {
        self.send_json(
            ApiMethod::Update,
            HttpMethod::Put,
            self.member_path(id),
            params,
        )
        .await
    }
}

impl<R: Deletable, T: Transport> ResourceClient<R, T> {
    /// `DELETE /{path}/{id}`. The response body is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Http`] for transport failures.
    pub async fn delete(&self, id: &str) -> Result<(), ResourceError> {
        self.guard.ensure(R::NAME, ApiMethod::Delete)?;
        let request = HttpRequest::builder(HttpMethod::Delete, self.member_path(id)).build()?;
        self.dispatch(request).await?;
        Ok(())
    }
}

impl<R, T: Clone> Clone for ResourceClient<R, T> {
    fn clone(&self) -> Self {
        Self {
            transport: self.transport.clone(),
            guard: self.guard,
            resource: PhantomData,
        }
    }
}

impl<R: Resource, T> fmt::Debug for ResourceClient<R, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceClient")
            .field("resource", &R::NAME)
            .field("version", &self.guard.version())
            .finish_non_exhaustive()
    }
}

/// Serializes a request body to JSON.
///
/// # Errors
///
/// Returns [`EncodeError::Serialization`] on failure.
pub fn json_body<B: Serialize + ?Sized>(body: &B) -> Result<serde_json::Value, EncodeError> {
    serde_json::to_value(body).map_err(|source| EncodeError::Serialization {
        field: "body".to_string(),
        source,
    })
}
