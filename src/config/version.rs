//! API version binding.
//!
//! This module provides the [`ApiVersion`] enum, the version a client
//! instance is bound to for its whole lifetime.

use crate::error::ConfigError;
use std::fmt;
use std::str::FromStr;

/// Loan origination API version.
///
/// The backend exposes two generations of its collection endpoints. `Legacy`
/// only offers offset-paginated lookups; `Current` adds ranked search and
/// cursor listing.
///
/// The default is [`ApiVersion::Legacy`]: a client that was not told which
/// version it talks to never assumes the newer capabilities exist.
///
/// # Example
///
/// ```rust
/// use los_api::ApiVersion;
///
/// assert_eq!(ApiVersion::default(), ApiVersion::Legacy);
///
/// let version: ApiVersion = "current".parse().unwrap();
/// assert_eq!(version, ApiVersion::Current);
/// assert_eq!(version.to_string(), "current");
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ApiVersion {
    /// The original API: offset pagination only.
    #[default]
    Legacy,
    /// The current API: ranked search and cursor listing.
    Current,
}

impl ApiVersion {
    /// Returns the newest known API version.
    #[must_use]
    pub const fn latest() -> Self {
        Self::Current
    }

    /// Returns every known version, oldest first.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Legacy, Self::Current]
    }

    /// Returns `true` for [`ApiVersion::Legacy`].
    #[must_use]
    pub const fn is_legacy(self) -> bool {
        matches!(self, Self::Legacy)
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::Legacy => "legacy",
            Self::Current => "current",
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApiVersion {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();

        match s.as_str() {
            "legacy" => Ok(Self::Legacy),
            "current" => Ok(Self::Current),
            _ => Err(ConfigError::InvalidApiVersion { version: s }),
        }
    }
}
