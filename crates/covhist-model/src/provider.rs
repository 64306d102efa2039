//! CI provider keys
//!
//! Uploads are bucketed by the free-text `provider` field. Uploads without one
//! go to a sentinel bucket that can never collide with a real provider, even a
//! provider literally named `"none"`.

use serde::{Serialize, Serializer};
use std::fmt;

/// Grouping key used for the sentinel bucket
pub const NOT_SPECIFIED_KEY: &str = "none";

/// Display label for the sentinel bucket
pub const NOT_SPECIFIED_LABEL: &str = "Not specified";

/// CI provider grouping key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProviderKey {
    /// A named CI provider (e.g. `travis`, `circleci`)
    Named(String),
    /// Upload carried no provider
    NotSpecified,
}

impl ProviderKey {
    /// Derive key from an upload's optional provider field
    ///
    /// Absent, empty and whitespace-only providers all map to the sentinel.
    #[must_use]
    pub fn from_provider(provider: Option<&str>) -> Self {
        match provider.map(str::trim) {
            Some(name) if !name.is_empty() => Self::Named(name.to_string()),
            _ => Self::NotSpecified,
        }
    }

    /// Create named key
    #[inline]
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// Grouping key string
    #[inline]
    #[must_use]
    pub fn as_key(&self) -> &str {
        match self {
            Self::Named(name) => name,
            Self::NotSpecified => NOT_SPECIFIED_KEY,
        }
    }

    /// Human-readable label
    #[inline]
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Named(name) => name,
            Self::NotSpecified => NOT_SPECIFIED_LABEL,
        }
    }

    /// Check if this is the sentinel bucket
    #[inline]
    #[must_use]
    pub fn is_not_specified(&self) -> bool {
        matches!(self, Self::NotSpecified)
    }
}

impl fmt::Display for ProviderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_key())
    }
}

impl Serialize for ProviderKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_provider_is_sentinel() {
        assert_eq!(ProviderKey::from_provider(None), ProviderKey::NotSpecified);
        assert_eq!(ProviderKey::from_provider(Some("")), ProviderKey::NotSpecified);
        assert_eq!(ProviderKey::from_provider(Some("   ")), ProviderKey::NotSpecified);
    }

    #[test]
    fn literal_none_provider_stays_named() {
        let key = ProviderKey::from_provider(Some("none"));
        assert_eq!(key, ProviderKey::named("none"));
        assert!(!key.is_not_specified());
        assert_ne!(key, ProviderKey::NotSpecified);
    }

    #[test]
    fn labels_and_keys() {
        assert_eq!(ProviderKey::NotSpecified.as_key(), "none");
        assert_eq!(ProviderKey::NotSpecified.label(), "Not specified");
        assert_eq!(ProviderKey::named("travis").label(), "travis");
        assert_eq!(ProviderKey::named("circleci").to_string(), "circleci");
    }
}
