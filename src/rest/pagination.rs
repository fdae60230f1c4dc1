//! Pagination envelopes and the uniform results built from them.
//!
//! The backend answers collection requests with one of three envelopes:
//!
//! | Envelope | Wire shape |
//! |----------|------------|
//! | [`OffsetEnvelope`] | `{ items, total, page, pageSize }` |
//! | [`CursorEnvelope`] | `{ items, nextCursor?, hasMore }` |
//! | [`SearchEnvelope`] | `{ items, total, highlights? }` |
//!
//! The envelope to decode is chosen before the request is sent, from the
//! method and the bound version. Responses are never inspected to guess
//! their shape, because the envelopes share field names.
//!
//! Offset and search responses both resolve to [`PaginationResult`], so
//! callers read `items` and `total` the same way whichever version served
//! the call. Cursor responses resolve to [`CursorPaginationResult`].
//!
//! Both results dereference to `[T]`:
//!
//! ```rust
//! use los_api::rest::PaginationResult;
//!
//! let result = PaginationResult::new(vec!["a", "b"], 10);
//! assert_eq!(result.len(), 2);
//! assert_eq!(result[0], "a");
//! assert_eq!(result.total, 10);
//! ```

use std::ops::{Deref, DerefMut};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::rest::{Filter, FindStrategy, QueryParams, ResourceError};

/// Offset-paginated response.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OffsetEnvelope<T> {
    /// The page of items.
    pub items: Vec<T>,
    /// Total matching items.
    pub total: u64,
    /// The page that was served.
    pub page: u32,
    /// The page size that was served.
    pub page_size: u32,
}

/// Cursor-paginated response.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CursorEnvelope<T> {
    /// The batch of items.
    pub items: Vec<T>,
    /// Continuation token, absent once the listing is exhausted.
    #[serde(default)]
    pub next_cursor: Option<String>,
    /// Whether more items exist.
    pub has_more: bool,
}

/// Ranked search response.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchEnvelope<T> {
    /// The ranked items.
    pub items: Vec<T>,
    /// Total matching items.
    pub total: u64,
    /// Match markers for relevance display.
    #[serde(default)]
    pub highlights: Vec<HighlightSpan>,
}

/// Marks which parts of a field matched a search query.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightSpan {
    /// The item the span belongs to, when reported per envelope.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// The matched field.
    pub field: String,
    /// The matched substrings.
    #[serde(default)]
    pub matches: Vec<String>,
}

/// A page of items, from either offset pagination or ranked search.
///
/// `page` and `page_size` are only known for offset pagination;
/// `highlights` is only populated by ranked search.
#[derive(Clone, Debug, PartialEq)]
pub struct PaginationResult<T> {
    /// The items.
    pub items: Vec<T>,
    /// Total matching items.
    pub total: u64,
    /// The page that was served (offset pagination).
    pub page: Option<u32>,
    /// The page size that was served (offset pagination).
    pub page_size: Option<u32>,
    /// Match markers (ranked search).
    pub highlights: Vec<HighlightSpan>,
}

impl<T> PaginationResult<T> {
    /// Creates a result with items and a total and no other metadata.
    #[must_use]
    pub const fn new(items: Vec<T>, total: u64) -> Self {
        Self {
            items,
            total,
            page: None,
            page_size: None,
            highlights: Vec::new(),
        }
    }

    /// Consumes the result and returns the items.
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}

impl<T> From<OffsetEnvelope<T>> for PaginationResult<T> {
    fn from(envelope: OffsetEnvelope<T>) -> Self {
        Self {
            items: envelope.items,
            total: envelope.total,
            page: Some(envelope.page),
            page_size: Some(envelope.page_size),
            highlights: Vec::new(),
        }
    }
}

impl<T> From<SearchEnvelope<T>> for PaginationResult<T> {
    fn from(envelope: SearchEnvelope<T>) -> Self {
        Self {
            items: envelope.items,
            total: envelope.total,
            page: None,
            page_size: None,
            highlights: envelope.highlights,
        }
    }
}

impl<T> Deref for PaginationResult<T> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        &self.items
    }
}

impl<T> DerefMut for PaginationResult<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.items
    }
}

/// A batch of items from cursor listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CursorPaginationResult<T> {
    /// The items.
    pub items: Vec<T>,
    /// Token for the next batch.
    pub next_cursor: Option<String>,
    /// Whether more items exist.
    pub has_more: bool,
}

impl<T> CursorPaginationResult<T> {
    /// Returns `true` if another batch can be requested.
    #[must_use]
    pub const fn has_next_page(&self) -> bool {
        self.has_more && self.next_cursor.is_some()
    }

    /// Returns params for the next batch, keeping `limit`.
    #[must_use]
    pub fn next_params(&self, limit: Option<u32>) -> Option<CursorParams> {
        if !self.has_next_page() {
            return None;
        }
        Some(CursorParams {
            cursor: self.next_cursor.clone(),
            limit,
        })
    }

    /// Consumes the result and returns the items.
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}

impl<T> From<CursorEnvelope<T>> for CursorPaginationResult<T> {
    fn from(envelope: CursorEnvelope<T>) -> Self {
        Self {
            items: envelope.items,
            next_cursor: envelope.next_cursor,
            has_more: envelope.has_more,
        }
    }
}

impl<T> Deref for CursorPaginationResult<T> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        &self.items
    }
}

impl<T> DerefMut for CursorPaginationResult<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.items
    }
}

/// Cursor listing parameters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CursorParams {
    /// Continuation token from a previous batch.
    pub cursor: Option<String>,
    /// Maximum items per batch.
    pub limit: Option<u32>,
}

impl CursorParams {
    /// Appends `cursor` and `limit` to `filter`.
    #[must_use]
    pub fn extend(&self, filter: Filter) -> Filter {
        filter
            .with("cursor", self.cursor.as_deref())
            .with("limit", self.limit)
    }
}

impl QueryParams for CursorParams {
    fn to_filter(&self) -> Filter {
        self.extend(Filter::new())
    }
}

/// Decodes a `find` response with the envelope selected by `strategy`.
///
/// # Errors
///
/// Returns [`ResourceError::InvalidResponse`] if the body does not match the
/// envelope.
pub fn resolve_page<T: DeserializeOwned>(
    resource: &'static str,
    strategy: FindStrategy,
    body: serde_json::Value,
) -> Result<PaginationResult<T>, ResourceError> {
    match strategy {
        FindStrategy::Offset => decode::<OffsetEnvelope<T>>(resource, body).map(Into::into),
        FindStrategy::Search => decode::<SearchEnvelope<T>>(resource, body).map(Into::into),
    }
}

/// Decodes a cursor listing response.
///
/// # Errors
///
/// Returns [`ResourceError::InvalidResponse`] if the body does not match the
/// envelope.
pub fn resolve_cursor<T: DeserializeOwned>(
    resource: &'static str,
    body: serde_json::Value,
) -> Result<CursorPaginationResult<T>, ResourceError> {
    decode::<CursorEnvelope<T>>(resource, body).map(Into::into)
}

/// Decodes any response body into `T`.
///
/// # Errors
///
/// Returns [`ResourceError::InvalidResponse`] on a shape mismatch.
pub fn decode<T: DeserializeOwned>(
    resource: &'static str,
    body: serde_json::Value,
) -> Result<T, ResourceError> {
    serde_json::from_value(body).map_err(|source| ResourceError::InvalidResponse { resource, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        id: String,
    }

    #[test]
    fn test_offset_envelope_resolves_with_page_metadata() {
        let body = json!({
            "items": [{"id": "1"}, {"id": "2"}],
            "total": 42,
            "page": 3,
            "pageSize": 2
        });

        let result: PaginationResult<Item> =
            resolve_page("Item", FindStrategy::Offset, body).unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result.total, 42);
        assert_eq!(result.page, Some(3));
        assert_eq!(result.page_size, Some(2));
        assert!(result.highlights.is_empty());
    }

    #[test]
    fn test_search_envelope_resolves_with_highlights() {
        let body = json!({
            "items": [{"id": "1"}],
            "total": 1,
            "highlights": [{"id": "1", "field": "borrowerFullName", "matches": ["Smi"]}]
        });

        let result: PaginationResult<Item> =
            resolve_page("Item", FindStrategy::Search, body).unwrap();

        assert_eq!(result[0].id, "1");
        assert_eq!(result.total, 1);
        assert_eq!(result.page, None);
        assert_eq!(result.highlights[0].field, "borrowerFullName");
        assert_eq!(result.highlights[0].matches, vec!["Smi".to_string()]);
    }

    #[test]
    fn test_search_envelope_highlights_are_optional() {
        let body = json!({"items": [], "total": 0});
        let result: PaginationResult<Item> =
            resolve_page("Item", FindStrategy::Search, body).unwrap();
        assert!(result.is_empty());
        assert!(result.highlights.is_empty());
    }

    #[test]
    fn test_strategy_decides_shape_not_body() {
        // A search body lacks pageSize, so decoding it as offset must fail.
        let body = json!({"items": [{"id": "1"}], "total": 1});
        let result: Result<PaginationResult<Item>, _> =
            resolve_page("Item", FindStrategy::Offset, body);

        assert!(matches!(
            result,
            Err(ResourceError::InvalidResponse { resource: "Item", .. })
        ));
    }

    #[test]
    fn test_cursor_envelope_resolves() {
        let body = json!({"items": [{"id": "1"}], "nextCursor": "abc", "hasMore": true});
        let result: CursorPaginationResult<Item> = resolve_cursor("Item", body).unwrap();

        assert!(result.has_next_page());
        assert_eq!(
            result.next_params(Some(50)),
            Some(CursorParams {
                cursor: Some("abc".to_string()),
                limit: Some(50),
            })
        );
    }

    #[test]
    fn test_exhausted_cursor_has_no_next_page() {
        let body = json!({"items": [], "hasMore": false});
        let result: CursorPaginationResult<Item> = resolve_cursor("Item", body).unwrap();

        assert!(!result.has_next_page());
        assert_eq!(result.next_cursor, None);
        assert_eq!(result.next_params(None), None);
    }

    #[test]
    fn test_cursor_params_encode() {
        let params = CursorParams {
            cursor: Some("abc".to_string()),
            limit: Some(25),
        };
        assert_eq!(
            params.to_filter().encode().unwrap(),
            vec![
                ("cursor".to_string(), "abc".to_string()),
                ("limit".to_string(), "25".to_string()),
            ]
        );
        assert!(CursorParams::default().to_filter().is_empty());
    }

    #[test]
    fn test_bare_array_decode() {
        let items: Vec<Item> = decode("Item", json!([{"id": "a"}])).unwrap();
        assert_eq!(items, vec![Item { id: "a".to_string() }]);
    }
}
