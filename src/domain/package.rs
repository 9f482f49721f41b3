//! Locked package information structures

use super::PackageName;
use std::fmt;

/// Where a locked package comes from
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PackageSource {
    /// A package index, e.g. `https://pypi.org/simple`
    Registry(String),
    /// An editable local project (usually the project itself)
    Editable(String),
    /// A virtual workspace member that is never built
    Virtual(String),
    /// A local source directory
    Directory(String),
    /// A local archive or wheel
    Path(String),
    /// A git repository
    Git(String),
    /// A direct URL to an archive
    Url(String),
    /// No source recorded
    #[default]
    Unknown,
}

impl PackageSource {
    /// Returns true for sources that are part of the project rather than third-party
    pub fn is_local_project(&self) -> bool {
        matches!(self, PackageSource::Editable(_) | PackageSource::Virtual(_))
    }
}

impl fmt::Display for PackageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackageSource::Registry(url) => write!(f, "registry+{}", url),
            PackageSource::Editable(path) => write!(f, "editable+{}", path),
            PackageSource::Virtual(path) => write!(f, "virtual+{}", path),
            PackageSource::Directory(path) => write!(f, "directory+{}", path),
            PackageSource::Path(path) => write!(f, "path+{}", path),
            PackageSource::Git(url) => write!(f, "git+{}", url),
            PackageSource::Url(url) => write!(f, "url+{}", url),
            PackageSource::Unknown => f.write_str("unknown"),
        }
    }
}

/// One declared dependency of a locked package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockedDependency {
    /// The dependency's canonical name
    pub name: PackageName,
    /// The dependent's extra that declares this edge; `None` for the main list
    pub through_extra: Option<String>,
}

impl LockedDependency {
    /// Creates a dependency from the main dependency list
    pub fn main(name: impl Into<PackageName>) -> Self {
        Self {
            name: name.into(),
            through_extra: None,
        }
    }

    /// Creates a dependency declared by one of the dependent's extras
    pub fn extra(name: impl Into<PackageName>, extra: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            through_extra: Some(extra.into()),
        }
    }
}

/// A package as resolved in the lockfile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockedPackage {
    /// Canonical package name
    pub name: PackageName,
    /// Resolved version; empty for virtual workspace roots
    pub version: String,
    /// Declared dependencies in lockfile order
    pub dependencies: Vec<LockedDependency>,
    /// Where the package comes from
    pub source: PackageSource,
}

impl LockedPackage {
    /// Creates a locked package with no dependencies
    pub fn new(name: impl Into<PackageName>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            dependencies: Vec::new(),
            source: PackageSource::Unknown,
        }
    }

    /// Adds a main dependency (builder pattern)
    pub fn with_dependency(mut self, name: impl Into<PackageName>) -> Self {
        self.dependencies.push(LockedDependency::main(name));
        self
    }
}

impl fmt::Display for LockedPackage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}=={}", self.name, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let pkg = LockedPackage::new("Requests", "2.28.0").with_dependency("urllib3");
        assert_eq!(pkg.name.as_str(), "requests");
        assert_eq!(pkg.dependencies, vec![LockedDependency::main("urllib3")]);
        assert_eq!(pkg.to_string(), "requests==2.28.0");
    }

    #[test]
    fn test_is_local_project() {
        assert!(PackageSource::Editable(".".into()).is_local_project());
        assert!(PackageSource::Virtual(".".into()).is_local_project());
        assert!(!PackageSource::Registry("https://pypi.org/simple".into()).is_local_project());
        assert!(!PackageSource::Unknown.is_local_project());
    }

    #[test]
    fn test_source_display() {
        assert_eq!(
            PackageSource::Git("https://github.com/a/b".into()).to_string(),
            "git+https://github.com/a/b"
        );
        assert_eq!(PackageSource::Unknown.to_string(), "unknown");
    }

    #[test]
    fn test_extra_dependency() {
        let dep = LockedDependency::extra("PySocks", "socks");
        assert_eq!(dep.name.as_str(), "pysocks");
        assert_eq!(dep.through_extra.as_deref(), Some("socks"));
    }
}
