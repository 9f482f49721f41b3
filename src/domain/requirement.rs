//! PEP 508 requirement strings
//!
//! Examples:
//! - `requests>=2.25.0`
//! - `uvicorn[standard] (>=0.20) ; python_version >= "3.9"`
//! - `mylib @ git+https://example.com/mylib.git`

use super::PackageName;
use crate::error::VersionError;
use regex::Regex;
use std::sync::LazyLock;

static REQUIREMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^\s*(?P<name>[A-Za-z0-9](?:[A-Za-z0-9._-]*[A-Za-z0-9])?)",
        r"\s*(?:\[(?P<extras>[^\]]*)\])?\s*(?P<rest>.*)$",
    ))
    .unwrap()
});

/// A parsed dependency declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    /// Canonical package name
    pub name: PackageName,
    /// Requested extras, canonicalized
    pub extras: Vec<String>,
    /// Version specifier text, empty when unconstrained
    pub specifier: String,
    /// Direct reference for `name @ url` requirements
    pub url: Option<String>,
    /// Environment marker text after `;`
    pub marker: Option<String>,
}

impl Requirement {
    /// Parse a PEP 508 requirement
    pub fn parse(s: &str) -> Result<Self, VersionError> {
        let (body, marker) = match s.split_once(';') {
            Some((body, marker)) => (body, Some(marker.trim().to_string())),
            None => (s, None),
        };

        let caps = REQUIREMENT_RE
            .captures(body)
            .ok_or_else(|| VersionError::InvalidRequirement(s.to_string()))?;

        let extras = caps
            .name("extras")
            .map(|m| {
                m.as_str()
                    .split(',')
                    .map(|extra| PackageName::new(extra).to_string())
                    .filter(|extra| !extra.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let rest = caps.name("rest").map(|m| m.as_str().trim()).unwrap_or("");
        let (specifier, url) = if let Some(url) = rest.strip_prefix('@') {
            let url = url.trim();
            if url.is_empty() {
                return Err(VersionError::InvalidRequirement(s.to_string()));
            }
            (String::new(), Some(url.to_string()))
        } else {
            let spec = rest
                .strip_prefix('(')
                .and_then(|r| r.strip_suffix(')'))
                .unwrap_or(rest)
                .trim();
            if !spec.is_empty() && !spec.starts_with(['<', '>', '=', '!', '~']) {
                return Err(VersionError::InvalidRequirement(s.to_string()));
            }
            (spec.split_whitespace().collect::<String>(), None)
        };

        Ok(Self {
            name: PackageName::new(&caps["name"]),
            extras,
            specifier,
            url,
            marker: marker.filter(|m| !m.is_empty()),
        })
    }

    /// Returns the specifier text if the requirement constrains versions
    pub fn constraint(&self) -> Option<&str> {
        if self.specifier.is_empty() {
            None
        } else {
            Some(&self.specifier)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_only() {
        let req = Requirement::parse("requests").unwrap();
        assert_eq!(req.name.as_str(), "requests");
        assert!(req.extras.is_empty());
        assert_eq!(req.constraint(), None);
    }

    #[test]
    fn test_with_specifier() {
        let req = Requirement::parse("Requests>=2.25.0").unwrap();
        assert_eq!(req.name.as_str(), "requests");
        assert_eq!(req.constraint(), Some(">=2.25.0"));
    }

    #[test]
    fn test_range_with_spaces() {
        let req = Requirement::parse("django >= 5.0, < 5.1").unwrap();
        assert_eq!(req.constraint(), Some(">=5.0,<5.1"));
    }

    #[test]
    fn test_extras_parens_and_marker() {
        let req =
            Requirement::parse(r#"uvicorn[Standard, test] (>=0.20) ; python_version >= "3.9""#)
                .unwrap();
        assert_eq!(req.name.as_str(), "uvicorn");
        assert_eq!(req.extras, vec!["standard", "test"]);
        assert_eq!(req.constraint(), Some(">=0.20"));
        assert_eq!(req.marker.as_deref(), Some(r#"python_version >= "3.9""#));
    }

    #[test]
    fn test_direct_reference() {
        let req = Requirement::parse("mylib @ git+https://example.com/mylib.git").unwrap();
        assert_eq!(req.name.as_str(), "mylib");
        assert_eq!(
            req.url.as_deref(),
            Some("git+https://example.com/mylib.git")
        );
        assert_eq!(req.constraint(), None);
    }

    #[test]
    fn test_invalid() {
        assert!(Requirement::parse(">=1.0").is_err());
        assert!(Requirement::parse("").is_err());
        assert!(Requirement::parse("foo bar").is_err());
        assert!(Requirement::parse("foo @ ").is_err());
    }
}
