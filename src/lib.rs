//! # Loan Origination Platform API Rust SDK
//!
//! A Rust SDK for the loan origination platform HTTP API, providing type-safe
//! configuration, a retrying HTTP transport, and typed resource clients for
//! applications, documents, statuses, product calculations and accounts.
//!
//! ## Overview
//!
//! This SDK provides:
//! - Type-safe configuration via [`LosConfig`] and [`LosConfigBuilder`]
//! - Validated newtypes for credentials and URLs
//! - Filter encoding with lists, ranges, nested groups and sort specs
//! - Multipart uploads with index-qualified batch options
//! - Version-gated operations that fail before any request is sent
//! - Uniform pagination results over offset, search and cursor envelopes
//! - Async HTTP client with retry logic and rate limit handling
//!
//! ## Quick Start
//!
//! ```rust
//! use los_api::{ApiKey, ApiVersion, BaseUrl, LosConfig};
//!
//! let config = LosConfig::builder()
//!     .base_url(BaseUrl::new("https://api.example.com").unwrap())
//!     .api_key(ApiKey::new("your-api-key").unwrap())
//!     .api_version(ApiVersion::Current)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.api_version(), ApiVersion::Current);
//! ```
//!
//! ## Querying Applications
//!
//! ```rust,ignore
//! use los_api::LosClient;
//! use los_api::rest::{RangeFilter, SortDirection};
//! use los_api::rest::resources::{ApplicationSortField, FindApplicationsParams};
//!
//! let client = LosClient::new(&config)?;
//!
//! let page = client
//!     .applications()
//!     .find(&FindApplicationsParams {
//!         status_ids: Some(vec!["active".to_string(), "pending".to_string()]),
//!         sort_field: Some(ApplicationSortField::CreatedAt),
//!         sort_direction: Some(SortDirection::Desc),
//!         ..Default::default()
//!     })
//!     .await?;
//!
//! for application in page.iter() {
//!     println!("{}", application.id);
//! }
//! ```
//!
//! ## Version Gating
//!
//! Every client is bound to one [`ApiVersion`]. Operations the bound version
//! does not offer are rejected locally with
//! [`ResourceError::UnsupportedApiVersion`] and no request is sent:
//!
//! ```rust,ignore
//! use los_api::{ApiVersion, LosClient, ResourceError};
//! use los_api::rest::resources::ListApplicationsParams;
//!
//! let client = LosClient::with_version(&config, ApiVersion::Legacy)?;
//! let result = client.applications().list(&ListApplicationsParams::default()).await;
//! assert!(matches!(result, Err(ResourceError::UnsupportedApiVersion { .. })));
//! ```
//!
//! ## Uploading Documents
//!
//! ```rust,ignore
//! use los_api::rest::FileAttachment;
//! use los_api::rest::resources::CreateManyApplicationDocumentsParams;
//!
//! client
//!     .application_documents()
//!     .create_many(
//!         "application-id",
//!         &CreateManyApplicationDocumentsParams {
//!             files: vec![
//!                 FileAttachment::new(bytes_a, "a.pdf"),
//!                 FileAttachment::new(bytes_b, "b.pdf").anchor("income"),
//!             ],
//!             ..Default::default()
//!         },
//!     )
//!     .await?;
//! ```
//!
//! ## Design Principles
//!
//! - **No global state**: Configuration is instance-based and passed explicitly
//! - **Fail-fast validation**: Newtypes and the version guard validate before any I/O
//! - **Thread-safe**: Clients are `Send + Sync`
//! - **Async-first**: Designed for use with the Tokio async runtime

mod client;
pub mod clients;
pub mod config;
pub mod error;
pub mod rest;

pub use client::LosClient;

// Re-export public types at crate root for convenience
pub use config::{AccessToken, ApiKey, ApiVersion, BaseUrl, LosConfig, LosConfigBuilder};
pub use error::ConfigError;

// Re-export HTTP client types
pub use clients::{
    HttpClient, HttpError, HttpMethod, HttpRequest, HttpRequestBuilder, HttpResponse,
    HttpResponseError, InvalidHttpRequestError, MaxHttpRetriesExceededError, RequestBody,
    Transport,
};

// Re-export the resource layer's core types
pub use rest::{
    ApiMethod, CursorPaginationResult, EncodeError, Filter, FilterValue, MultipartBuilder,
    MultipartPayload, PaginationResult, QueryParams, RangeFilter, ResourceClient, ResourceError,
    SortDirection, SortSpec, VersionGuard,
};
