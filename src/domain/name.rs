//! Canonical package names (PEP 503)

use serde::{Deserialize, Deserializer, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// A package name normalized the way package indexes compare them
///
/// Lowercase, with every run of `-`, `_` and `.` collapsed to a single `-`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct PackageName(String);

impl PackageName {
    /// Canonicalize a raw package name
    pub fn new(raw: &str) -> Self {
        let mut canonical = String::with_capacity(raw.len());
        let mut pending_separator = false;

        for c in raw.trim().chars() {
            if matches!(c, '-' | '_' | '.') {
                pending_separator = true;
                continue;
            }
            if pending_separator && !canonical.is_empty() {
                canonical.push('-');
            }
            pending_separator = false;
            canonical.extend(c.to_lowercase());
        }

        Self(canonical)
    }

    /// Returns the canonical name
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the raw name canonicalized to nothing
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for PackageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for PackageName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PackageName {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl<'de> Deserialize<'de> for PackageName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::new(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercases() {
        assert_eq!(PackageName::new("Django").as_str(), "django");
    }

    #[test]
    fn test_already_canonical() {
        assert_eq!(
            PackageName::new("django-cors-headers").as_str(),
            "django-cors-headers"
        );
    }

    #[test]
    fn test_separators_collapse() {
        assert_eq!(
            PackageName::new("Django_CORS_Headers").as_str(),
            "django-cors-headers"
        );
        assert_eq!(
            PackageName::new("DJANGO.CORS.HEADERS").as_str(),
            "django-cors-headers"
        );
        assert_eq!(PackageName::new("a-_.b").as_str(), "a-b");
    }

    #[test]
    fn test_surrounding_whitespace() {
        assert_eq!(PackageName::new("  requests ").as_str(), "requests");
    }

    #[test]
    fn test_borrow_lookup() {
        let mut map = std::collections::HashMap::new();
        map.insert(PackageName::new("Typing_Extensions"), 1);
        assert_eq!(map.get("typing-extensions"), Some(&1));
    }

    #[test]
    fn test_deserialize_canonicalizes() {
        let name: PackageName = serde_json::from_str("\"Foo.Bar\"").unwrap();
        assert_eq!(name.as_str(), "foo-bar");
    }
}
