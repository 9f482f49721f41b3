//! PEP 440 version specifiers
//!
//! A specifier set is a comma-separated list of clauses such as
//! `>=2.25.0`, `>=5.0,<5.1`, `~=1.4`, `==3.*` or `!=1.2.3`.

use super::Version;
use crate::error::VersionError;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static CLAUSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(~=|===|==|!=|<=|>=|<|>)\s*(\S+?)\s*$").unwrap());

/// Comparison operator of a single clause
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Compatible,
    Equal,
    EqualPrefix,
    NotEqual,
    NotEqualPrefix,
    LessEqual,
    GreaterEqual,
    Less,
    Greater,
    Arbitrary,
}

/// A single specifier clause, e.g. `>=2.25.0`
#[derive(Debug, Clone)]
pub struct Specifier {
    operator: Operator,
    version: Option<Version>,
    raw_version: String,
}

/// A set of clauses that must all admit a version
#[derive(Debug, Clone)]
pub struct SpecifierSet {
    clauses: Vec<Specifier>,
    raw: String,
}

impl Specifier {
    /// Parse a single clause
    pub fn parse(s: &str) -> Result<Self, VersionError> {
        let invalid = |message: &str| VersionError::InvalidSpecifier {
            spec: s.trim().to_string(),
            message: message.to_string(),
        };

        let caps = CLAUSE_RE
            .captures(s)
            .ok_or_else(|| invalid("expected an operator followed by a version"))?;
        let op = &caps[1];
        let raw_version = caps[2].to_string();

        if op == "===" {
            return Ok(Self {
                operator: Operator::Arbitrary,
                version: None,
                raw_version,
            });
        }

        let (operator, version_str) = match (op, raw_version.strip_suffix(".*")) {
            ("==", Some(prefix)) => (Operator::EqualPrefix, prefix),
            ("!=", Some(prefix)) => (Operator::NotEqualPrefix, prefix),
            (_, Some(_)) => return Err(invalid("wildcards are only allowed with == and !=")),
            ("~=", None) => (Operator::Compatible, raw_version.as_str()),
            ("==", None) => (Operator::Equal, raw_version.as_str()),
            ("!=", None) => (Operator::NotEqual, raw_version.as_str()),
            ("<=", None) => (Operator::LessEqual, raw_version.as_str()),
            (">=", None) => (Operator::GreaterEqual, raw_version.as_str()),
            ("<", None) => (Operator::Less, raw_version.as_str()),
            (_, None) => (Operator::Greater, raw_version.as_str()),
        };

        let version = Version::parse(version_str).map_err(|e| invalid(&e.to_string()))?;
        if operator == Operator::Compatible && version.release().len() < 2 {
            return Err(invalid("~= needs at least two release segments"));
        }

        Ok(Self {
            operator,
            version: Some(version),
            raw_version,
        })
    }

    /// Returns true if this clause admits the version
    pub fn contains(&self, candidate: &Version) -> bool {
        let Some(ref bound) = self.version else {
            return candidate.to_string().eq_ignore_ascii_case(&self.raw_version);
        };

        match self.operator {
            Operator::Equal => candidate == bound,
            Operator::NotEqual => candidate != bound,
            Operator::EqualPrefix => prefix_match(candidate, bound),
            Operator::NotEqualPrefix => !prefix_match(candidate, bound),
            Operator::LessEqual => candidate <= bound,
            Operator::GreaterEqual => candidate >= bound,
            Operator::Less => {
                candidate < bound
                    && !(candidate.is_prerelease()
                        && !bound.is_prerelease()
                        && candidate.same_base(bound))
            }
            Operator::Greater => {
                candidate > bound
                    && !(candidate.is_postrelease()
                        && !bound.is_postrelease()
                        && candidate.same_base(bound))
            }
            Operator::Compatible => {
                let release = bound.release();
                let prefix = &release[..release.len() - 1];
                candidate >= bound
                    && candidate.epoch() == bound.epoch()
                    && release_starts_with(candidate.release(), prefix)
            }
            Operator::Arbitrary => false,
        }
    }
}

fn prefix_match(candidate: &Version, prefix: &Version) -> bool {
    candidate.epoch() == prefix.epoch()
        && release_starts_with(candidate.release(), prefix.release())
}

// Missing candidate segments count as zero.
fn release_starts_with(release: &[u64], prefix: &[u64]) -> bool {
    prefix
        .iter()
        .enumerate()
        .all(|(i, segment)| release.get(i).copied().unwrap_or(0) == *segment)
}

impl fmt::Display for Specifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self.operator {
            Operator::Compatible => "~=",
            Operator::Equal | Operator::EqualPrefix => "==",
            Operator::NotEqual | Operator::NotEqualPrefix => "!=",
            Operator::LessEqual => "<=",
            Operator::GreaterEqual => ">=",
            Operator::Less => "<",
            Operator::Greater => ">",
            Operator::Arbitrary => "===",
        };
        write!(f, "{}{}", op, self.raw_version)
    }
}

impl SpecifierSet {
    /// Parse a comma-separated specifier set; the empty string admits everything
    pub fn parse(s: &str) -> Result<Self, VersionError> {
        let clauses = s
            .split(',')
            .filter(|clause| !clause.trim().is_empty())
            .map(Specifier::parse)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            clauses,
            raw: s.trim().to_string(),
        })
    }

    /// Returns true if every clause admits the version
    pub fn contains(&self, version: &Version) -> bool {
        self.clauses.iter().all(|clause| clause.contains(version))
    }

    /// Returns true if there are no clauses
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }
}

impl fmt::Display for SpecifierSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Returns true if the constraint keeps the package below `latest`
///
/// An empty or invalid constraint, or an unparsable latest version, never holds back.
pub fn holds_back(constraint: &str, latest: &str) -> bool {
    let Ok(spec) = SpecifierSet::parse(constraint) else {
        return false;
    };
    if spec.is_empty() {
        return false;
    }
    match Version::parse(latest) {
        Ok(latest) => !spec.contains(&latest),
        Err(_) => false,
    }
}
