//! HTTP transport for the loan origination API.
//!
//! This module provides the transport layer that resource clients hand their
//! requests to. It owns everything below the resource layer: URL and header
//! construction, authentication headers, body framing, retries and timeouts.
//!
//! # Overview
//!
//! - [`Transport`]: The seam resource clients depend on
//! - [`HttpClient`]: The reqwest-backed [`Transport`]
//! - [`HttpRequest`]: A request to be sent to the API
//! - [`RequestBody`]: A JSON or multipart request body
//! - [`HttpResponse`]: A parsed response from the API
//! - [`HttpMethod`]: Supported HTTP methods (GET, POST, PUT, DELETE)
//!
//! # Retry Behavior
//!
//! - **429 (Rate Limited)**: Retries using `Retry-After` header value, or 1 second if not present
//! - **5xx (Server Error)**: Retries with fixed 1-second delay
//! - **Other errors (4xx)**: Returns immediately without retry
//!
//! The default `tries` is 1, meaning no automatic retries. Configure it on
//! [`LosConfig`](crate::LosConfig) or per request with
//! [`HttpRequestBuilder::tries`].

mod errors;
mod http_client;
mod http_request;
mod http_response;
mod transport;

pub use errors::{
    HttpError, HttpResponseError, InvalidHttpRequestError, MaxHttpRetriesExceededError,
};
pub use http_client::{HttpClient, RETRY_WAIT_TIME, SDK_VERSION};
pub use http_request::{HttpMethod, HttpRequest, HttpRequestBuilder, RequestBody};
pub use http_response::HttpResponse;
pub use transport::Transport;
