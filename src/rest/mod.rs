//! The generic resource-access layer.
//!
//! Every concrete resource client in [`resources`] is built on the pieces in
//! this module:
//!
//! - **[`Filter`]**: ordered query parameters (scalars, lists, ranges,
//!   nested groups, [`SortSpec`]) and their encoding into query pairs
//! - **[`MultipartBuilder`]**: ordered multipart payloads for uploads,
//!   including index-qualified batch options
//! - **[`VersionGuard`]**: the client's bound [`ApiVersion`](crate::ApiVersion)
//!   and the `(method, version)` compatibility table
//! - **[`PaginationResult`] / [`CursorPaginationResult`]**: uniform results
//!   resolved from the offset, search and cursor envelopes
//! - **[`ResourceClient`]**: generic `find`, `search`, `list`, `create`,
//!   `update` and `delete` for any [`Resource`]
//!
//! # Request Flow
//!
//! 1. The guard checks the method against the bound version. Rejections
//!    happen here, before anything is built or sent.
//! 2. Parameters are encoded ([`Filter::encode`] or [`MultipartBuilder`]).
//! 3. The request goes to the [`Transport`](crate::clients::Transport).
//! 4. The body is decoded with the envelope chosen in step 1.
//!
//! # Example
//!
//! ```rust,ignore
//! use los_api::{ApiVersion, LosClient};
//! use los_api::rest::resources::FindApplicationsParams;
//!
//! let client = LosClient::new(config)?;
//! let applications = client.applications();
//!
//! // Served by ranked search on Current, offset pagination on Legacy
//! let page = applications.find(&FindApplicationsParams::default()).await?;
//! for application in page.iter() {
//!     println!("{}", application.display_id);
//! }
//! println!("{} total", page.total);
//! ```

mod errors;
mod guard;
mod multipart;
mod pagination;
mod query;
mod resource;

pub mod resources;

pub use errors::{EncodeError, ResourceError};
pub use guard::{find_strategy, is_method_supported, ApiMethod, FindStrategy, VersionGuard};
pub use multipart::{
    indexed_name, FileAttachment, MultipartBuilder, MultipartPart, MultipartPayload,
    BATCH_FILES_FIELD, BATCH_OPTIONS_GROUP,
};
pub use pagination::{
    decode, resolve_cursor, resolve_page, CursorEnvelope, CursorPaginationResult, CursorParams,
    HighlightSpan, OffsetEnvelope, PaginationResult, SearchEnvelope,
};
pub use query::{
    format_date, Filter, FilterValue, QueryPairs, QueryParams, RangeFilter, SortDirection,
    SortSpec, KEY_SEPARATOR, RANGE_FROM, RANGE_TO,
};
pub use resource::{
    json_body, Creatable, Deletable, Findable, Listable, Resource, ResourceClient, Updatable,
};
