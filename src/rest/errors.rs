//! Error types for resource operations.
//!
//! Every resource operation returns [`ResourceError`]. Its variants keep the
//! three failure families apart:
//!
//! - **Version incompatibility** ([`ResourceError::UnsupportedApiVersion`]):
//!   the bound API version does not offer the method. Raised before any
//!   request is built, so the transport is never called.
//! - **Encoding** ([`ResourceError::Encoding`]): a filter, sort or multipart
//!   input broke an invariant. Also raised before dispatch.
//! - **Transport** ([`ResourceError::Http`]): anything the transport
//!   reported, passed through untouched.
//!
//! # Example
//!
//! ```rust,ignore
//! use los_api::rest::ResourceError;
//!
//! match applications.list(&params).await {
//!     Ok(page) => println!("{} applications", page.len()),
//!     Err(ResourceError::UnsupportedApiVersion { method, version, .. }) => {
//!         println!("{method} needs a newer API than {version}");
//!     }
//!     Err(ResourceError::Http(e)) => println!("transport failed: {e}"),
//!     Err(e) => println!("other error: {e}"),
//! }
//! ```

use thiserror::Error;

use crate::clients::{HttpError, InvalidHttpRequestError};
use crate::config::ApiVersion;
use crate::rest::ApiMethod;

/// An invariant violation in a filter, sort or multipart input.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// The same key appears twice in one filter or sort specification.
    #[error("Duplicate key '{key}' in request parameters")]
    DuplicateKey {
        /// The fully qualified key that was repeated.
        key: String,
    },

    /// A range filter whose lower bound exceeds its upper bound.
    #[error("Range '{key}' has 'from' ({from}) greater than 'to' ({to})")]
    InvertedRange {
        /// The fully qualified key of the range.
        key: String,
        /// The lower bound.
        from: String,
        /// The upper bound.
        to: String,
    },

    /// A structured field could not be serialized to JSON text.
    #[error("Failed to serialize field '{field}': {source}")]
    Serialization {
        /// The name of the field being serialized.
        field: String,
        /// The underlying serde error.
        #[source]
        source: serde_json::Error,
    },
}

/// Error type for resource operations.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// The method is not available for the client's bound API version.
    #[error("{resource}::{method} is not supported for API version {version}")]
    UnsupportedApiVersion {
        /// The resource name (e.g. "Application").
        resource: &'static str,
        /// The rejected method.
        method: ApiMethod,
        /// The version the client is bound to.
        version: ApiVersion,
    },

    /// The request parameters could not be encoded.
    #[error(transparent)]
    Encoding(#[from] EncodeError),

    /// The response body did not match the expected envelope or item shape.
    #[error("Failed to decode {resource} response: {source}")]
    InvalidResponse {
        /// The resource name.
        resource: &'static str,
        /// The underlying serde error.
        #[source]
        source: serde_json::Error,
    },

    /// A transport-level error, propagated unchanged.
    #[error(transparent)]
    Http(#[from] HttpError),
}

impl From<InvalidHttpRequestError> for ResourceError {
    fn from(error: InvalidHttpRequestError) -> Self {
        Self::Http(HttpError::InvalidRequest(error))
    }
}

impl ResourceError {
    /// Returns `true` for [`ResourceError::UnsupportedApiVersion`].
    #[must_use]
    pub const fn is_version_error(&self) -> bool {
        matches!(self, Self::UnsupportedApiVersion { .. })
    }

    /// Returns the request reference of a transport error, if available.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        match self {
            Self::Http(e) => e.error_reference(),
            _ => None,
        }
    }
}

// Verify ResourceError is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ResourceError>();
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::HttpResponseError;

    #[test]
    fn test_unsupported_version_message() {
        let error = ResourceError::UnsupportedApiVersion {
            resource: "Application",
            method: ApiMethod::List,
            version: ApiVersion::Legacy,
        };
        let message = error.to_string();
        assert!(message.contains("Application::list"));
        assert!(message.contains("legacy"));
        assert!(error.is_version_error());
    }

    #[test]
    fn test_encode_error_messages() {
        let error = EncodeError::DuplicateKey {
            key: "statusIds".to_string(),
        };
        assert!(error.to_string().contains("statusIds"));

        let error = EncodeError::InvertedRange {
            key: "createdAt".to_string(),
            from: "2024-02-01".to_string(),
            to: "2024-01-01".to_string(),
        };
        assert!(error.to_string().contains("createdAt"));
    }

    #[test]
    fn test_http_error_passes_through_transparently() {
        let error = ResourceError::from(HttpError::Response(HttpResponseError {
            code: 503,
            message: r#"{"message":"unavailable"}"#.to_string(),
            error_reference: Some("req-7".to_string()),
        }));

        assert_eq!(error.to_string(), r#"{"message":"unavailable"}"#);
        assert_eq!(error.request_id(), Some("req-7"));
        assert!(!error.is_version_error());
    }
}
