//! The transport seam between resource clients and the network.
//!
//! Resource clients never talk to the network directly. They build an
//! [`HttpRequest`] and hand it to a [`Transport`], which performs the call,
//! attaches authentication, applies retry and timeout policy, and converts
//! non-success responses into an [`HttpError`].
//!
//! [`HttpClient`](crate::clients::HttpClient) is the reqwest-backed
//! implementation. Tests substitute a recording transport.

use std::sync::Arc;

use crate::clients::{HttpError, HttpRequest};

/// Performs HTTP requests on behalf of resource clients.
///
/// Implementations return the parsed response body of a successful call.
/// Failures of any kind (error statuses, connectivity, timeouts) are
/// reported as [`HttpError`] and are propagated by resource clients
/// unchanged.
///
/// For [`RequestBody::Multipart`](crate::clients::RequestBody::Multipart)
/// bodies an implementation must not set its own `Content-Type`; the
/// multipart encoder owns the framing.
#[allow(async_fn_in_trait)]
pub trait Transport: Send + Sync {
    /// Performs `request` and returns the parsed response body.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] for any transport-level failure.
    async fn perform(&self, request: HttpRequest) -> Result<serde_json::Value, HttpError>;
}

impl<T: Transport> Transport for Arc<T> {
    async fn perform(&self, request: HttpRequest) -> Result<serde_json::Value, HttpError> {
        self.as_ref().perform(request).await
    }
}

impl<T: Transport> Transport for &T {
    async fn perform(&self, request: HttpRequest) -> Result<serde_json::Value, HttpError> {
        (**self).perform(request).await
    }
}
