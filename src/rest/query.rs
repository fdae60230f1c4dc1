//! Filter and sort encoding for read requests.
//!
//! A [`Filter`] is an ordered mapping from parameter name to a
//! [`FilterValue`] (scalar, list or range), a nested group, or a
//! [`SortSpec`]. [`Filter::encode`] flattens it into the ordered
//! `(key, value)` pairs that go on the query string:
//!
//! | Value | Pairs |
//! |-------|-------|
//! | `Scalar("x")` at `k` | `k=x` |
//! | `List(["a", "b"])` at `k` | `k=a`, `k=b` |
//! | `Range { from: "1", to: "9" }` at `k` | `k.from=1`, `k.to=9` |
//! | group `g` containing `k` | `g.k=...` |
//! | sort `s` with `(f, Desc)` | `s.f=desc` |
//!
//! Entries are emitted in insertion order and never re-sorted. Absent values
//! are skipped when the filter is built, so nothing is ever emitted with an
//! empty placeholder.
//!
//! # Example
//!
//! ```rust
//! use los_api::rest::{Filter, RangeFilter};
//!
//! let filter = Filter::new()
//!     .with("status", Some(vec!["active", "pending"]))
//!     .with("createdAt", Some(RangeFilter::starting("2024-01-01")));
//!
//! let pairs = filter.encode().unwrap();
//! assert_eq!(
//!     pairs,
//!     vec![
//!         ("status".to_string(), "active".to_string()),
//!         ("status".to_string(), "pending".to_string()),
//!         ("createdAt.from".to_string(), "2024-01-01".to_string()),
//!     ]
//! );
//! ```

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::rest::EncodeError;

/// Ordered query-string pairs. Keys may repeat.
pub type QueryPairs = Vec<(String, String)>;

/// Separator between a parameter name and a nested key or range bound.
pub const KEY_SEPARATOR: char = '.';

/// Suffix for the lower bound of a range.
pub const RANGE_FROM: &str = "from";

/// Suffix for the upper bound of a range.
pub const RANGE_TO: &str = "to";

/// A range constraint. Either bound may be open.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeFilter {
    /// Lower bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    /// Upper bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
}

impl RangeFilter {
    /// Creates a range from optional bounds.
    #[must_use]
    pub fn new(from: Option<impl Into<String>>, to: Option<impl Into<String>>) -> Self {
        Self {
            from: from.map(Into::into),
            to: to.map(Into::into),
        }
    }

    /// A range with both bounds.
    #[must_use]
    pub fn between(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: Some(from.into()),
            to: Some(to.into()),
        }
    }

    /// A range with only a lower bound.
    #[must_use]
    pub fn starting(from: impl Into<String>) -> Self {
        Self {
            from: Some(from.into()),
            to: None,
        }
    }

    /// A range with only an upper bound.
    #[must_use]
    pub fn until(to: impl Into<String>) -> Self {
        Self {
            from: None,
            to: Some(to.into()),
        }
    }

    /// A date range. Returns `None` when both bounds are absent.
    #[must_use]
    pub fn dates(from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Option<Self> {
        if from.is_none() && to.is_none() {
            return None;
        }
        Some(Self {
            from: from.map(|date| format_date(&date)),
            to: to.map(|date| format_date(&date)),
        })
    }

    /// Returns `true` if neither bound is set.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    /// Bounds compare numerically when both parse as numbers, otherwise
    /// lexically (which orders ISO 8601 dates correctly).
    fn is_inverted(&self) -> bool {
        let (Some(from), Some(to)) = (&self.from, &self.to) else {
            return false;
        };
        let ordering = match (from.trim().parse::<f64>(), to.trim().parse::<f64>()) {
            (Ok(from), Ok(to)) => from.partial_cmp(&to).unwrap_or(Ordering::Equal),
            _ => from.as_str().cmp(to.as_str()),
        };
        ordering == Ordering::Greater
    }
}

/// The value of a single filter entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// A single value.
    Scalar(String),
    /// Several values, matched with OR semantics. Sent as repeated keys.
    List(Vec<String>),
    /// A bounded or half-open range.
    Range(RangeFilter),
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        Self::Scalar(value)
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::Scalar(value.to_string())
    }
}

impl From<&String> for FilterValue {
    fn from(value: &String) -> Self {
        Self::Scalar(value.clone())
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        Self::Scalar(value.to_string())
    }
}

impl From<u32> for FilterValue {
    fn from(value: u32) -> Self {
        Self::Scalar(value.to_string())
    }
}

impl From<u64> for FilterValue {
    fn from(value: u64) -> Self {
        Self::Scalar(value.to_string())
    }
}

impl From<DateTime<Utc>> for FilterValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Scalar(format_date(&value))
    }
}

impl From<Vec<String>> for FilterValue {
    fn from(values: Vec<String>) -> Self {
        Self::List(values)
    }
}

impl From<&Vec<String>> for FilterValue {
    fn from(values: &Vec<String>) -> Self {
        Self::List(values.clone())
    }
}

impl From<&[String]> for FilterValue {
    fn from(values: &[String]) -> Self {
        Self::List(values.to_vec())
    }
}

impl From<Vec<&str>> for FilterValue {
    fn from(values: Vec<&str>) -> Self {
        Self::List(values.into_iter().map(String::from).collect())
    }
}

impl From<RangeFilter> for FilterValue {
    fn from(range: RangeFilter) -> Self {
        Self::Range(range)
    }
}

impl From<&RangeFilter> for FilterValue {
    fn from(range: &RangeFilter) -> Self {
        Self::Range(range.clone())
    }
}

/// Sort direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending order.
    #[default]
    Asc,
    /// Descending order.
    Desc,
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asc => write!(f, "asc"),
            Self::Desc => write!(f, "desc"),
        }
    }
}

/// An ordered multi-key sort. Earlier entries take precedence.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SortSpec {
    entries: Vec<(String, SortDirection)>,
}

impl SortSpec {
    /// Creates an empty sort specification.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Appends a sort key.
    #[must_use]
    pub fn then(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.push(field, direction);
        self
    }

    /// Appends a sort key in place.
    pub fn push(&mut self, field: impl Into<String>, direction: SortDirection) {
        self.entries.push((field.into(), direction));
    }

    /// Returns the sort keys in precedence order.
    #[must_use]
    pub fn entries(&self) -> &[(String, SortDirection)] {
        &self.entries
    }

    /// Returns `true` if no sort keys are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, SortDirection)> for SortSpec {
    fn from_iter<I: IntoIterator<Item = (K, SortDirection)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(field, direction)| (field.into(), direction))
                .collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Entry {
    Value(FilterValue),
    Group(Filter),
    Sort(SortSpec),
}

/// An ordered set of query parameters.
///
/// Builder methods taking an `Option` skip `None`, so optional fields of a
/// parameter struct can be passed straight through.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Filter {
    entries: Vec<(String, Entry)>,
}

impl Filter {
    /// Creates an empty filter.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Adds `key` if `value` is present.
    #[must_use]
    pub fn with<V: Into<FilterValue>>(mut self, key: impl Into<String>, value: Option<V>) -> Self {
        if let Some(value) = value {
            self.insert(key, value);
        }
        self
    }

    /// Adds `key` unconditionally.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FilterValue>) {
        self.entries.push((key.into(), Entry::Value(value.into())));
    }

    /// Adds a nested group whose keys are emitted as `key.<inner>`.
    #[must_use]
    pub fn group(mut self, key: impl Into<String>, group: Option<Self>) -> Self {
        if let Some(group) = group {
            self.entries.push((key.into(), Entry::Group(group)));
        }
        self
    }

    /// Adds a sort specification whose fields are emitted as `key.<field>`.
    #[must_use]
    pub fn sort(mut self, key: impl Into<String>, sort: Option<SortSpec>) -> Self {
        if let Some(sort) = sort {
            self.entries.push((key.into(), Entry::Sort(sort)));
        }
        self
    }

    /// Returns the number of top-level entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the filter has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Flattens the filter into ordered query pairs.
    ///
    /// # Errors
    ///
    /// - [`EncodeError::DuplicateKey`] if a key (after qualification with
    ///   its group prefix) appears more than once
    /// - [`EncodeError::InvertedRange`] if a range's lower bound exceeds its
    ///   upper bound
    pub fn encode(&self) -> Result<QueryPairs, EncodeError> {
        let mut pairs = Vec::new();
        let mut seen = HashSet::new();
        self.encode_into(None, &mut pairs, &mut seen)?;
        Ok(pairs)
    }

    /// Encodes the filter as a percent-encoded query string.
    ///
    /// # Errors
    ///
    /// See [`Filter::encode`].
    pub fn to_query_string(&self) -> Result<String, EncodeError> {
        Ok(self
            .encode()?
            .iter()
            .map(|(key, value)| {
                format!(
                    "{}={}",
                    urlencoding::encode(key),
                    urlencoding::encode(value)
                )
            })
            .collect::<Vec<_>>()
            .join("&"))
    }

    fn encode_into(
        &self,
        prefix: Option<&str>,
        pairs: &mut QueryPairs,
        seen: &mut HashSet<String>,
    ) -> Result<(), EncodeError> {
        for (key, entry) in &self.entries {
            let key = qualify(prefix, key);
            if !seen.insert(key.clone()) {
                return Err(EncodeError::DuplicateKey { key });
            }

            match entry {
                Entry::Value(FilterValue::Scalar(value)) => pairs.push((key, value.clone())),
                Entry::Value(FilterValue::List(values)) => {
                    pairs.extend(values.iter().map(|value| (key.clone(), value.clone())));
                }
                Entry::Value(FilterValue::Range(range)) => {
                    if range.is_inverted() {
                        return Err(EncodeError::InvertedRange {
                            key,
                            from: range.from.clone().unwrap_or_default(),
                            to: range.to.clone().unwrap_or_default(),
                        });
                    }
                    if let Some(from) = &range.from {
                        pairs.push((qualify(Some(&key), RANGE_FROM), from.clone()));
                    }
                    if let Some(to) = &range.to {
                        pairs.push((qualify(Some(&key), RANGE_TO), to.clone()));
                    }
                }
                Entry::Group(group) => group.encode_into(Some(&key), pairs, seen)?,
                Entry::Sort(sort) => {
                    for (field, direction) in sort.entries() {
                        let field_key = qualify(Some(&key), field);
                        if !seen.insert(field_key.clone()) {
                            return Err(EncodeError::DuplicateKey { key: field_key });
                        }
                        pairs.push((field_key, direction.to_string()));
                    }
                }
            }
        }
        Ok(())
    }
}

impl<K: Into<String>, V: Into<FilterValue>> FromIterator<(K, V)> for Filter {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut filter = Self::new();
        for (key, value) in iter {
            filter.insert(key, value);
        }
        filter
    }
}

/// Parameter types that can be expressed as a [`Filter`].
///
/// Implemented by every find/list parameter struct so the resource layer can
/// encode them without knowing their fields.
pub trait QueryParams {
    /// Builds the filter for these parameters.
    fn to_filter(&self) -> Filter;
}

impl QueryParams for Filter {
    fn to_filter(&self) -> Filter {
        self.clone()
    }
}

impl QueryParams for () {
    fn to_filter(&self) -> Filter {
        Filter::new()
    }
}

fn qualify(prefix: Option<&str>, key: &str) -> String {
    match prefix {
        Some(prefix) => format!("{prefix}{KEY_SEPARATOR}{key}"),
        None => key.to_string(),
    }
}

/// Formats a timestamp the way date filters are sent.
#[must_use]
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}
