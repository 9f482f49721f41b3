//! Manifest (pyproject.toml) parsing into dependency groups
//!
//! This module provides functionality to:
//! - Read the project manifest, tolerating its absence
//! - Map each dependency group to its declared packages and constraints

mod pyproject_toml;

pub use pyproject_toml::{parse_pyproject, PyprojectTomlParser};

use crate::domain::PackageName;
use crate::error::ManifestError;
use std::path::Path;
use tracing::debug;

/// File name of the manifest inside a project
pub const MANIFEST_NAME: &str = "pyproject.toml";

/// Group holding `[project].dependencies`
pub const MAIN_GROUP: &str = "main";

/// Group that legacy `tool.uv.dev-dependencies` merge into
pub const DEV_GROUP: &str = "dev";

/// A package declared in a dependency group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredDependency {
    /// Canonical package name
    pub name: PackageName,
    /// Version specifier text; `None` means unconstrained
    pub constraint: Option<String>,
}

impl DeclaredDependency {
    /// Creates a declared dependency
    pub fn new(name: impl Into<PackageName>, constraint: Option<String>) -> Self {
        Self {
            name: name.into(),
            constraint,
        }
    }
}

/// A named set of directly declared packages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyGroup {
    /// Group name (`main`, an extra, or a dependency-group name)
    pub name: String,
    /// Declared packages in declaration order
    pub dependencies: Vec<DeclaredDependency>,
}

impl DependencyGroup {
    /// Creates an empty group
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dependencies: Vec::new(),
        }
    }

    /// Declares a package (builder pattern)
    pub fn with(mut self, name: &str, constraint: Option<&str>) -> Self {
        self.declare(DeclaredDependency::new(name, constraint.map(str::to_string)));
        self
    }

    /// Adds a package; a repeated name keeps its first position and first constraint
    pub fn declare(&mut self, dep: DeclaredDependency) {
        match self.dependencies.iter_mut().find(|d| d.name == dep.name) {
            Some(existing) => {
                if existing.constraint.is_none() {
                    existing.constraint = dep.constraint;
                }
            }
            None => self.dependencies.push(dep),
        }
    }

    /// Returns true if the package is declared in this group
    pub fn contains(&self, name: &str) -> bool {
        self.dependencies.iter().any(|d| d.name.as_str() == name)
    }

    /// Returns the constraint declared for a package, if any
    pub fn constraint(&self, name: &str) -> Option<&str> {
        self.dependencies
            .iter()
            .find(|d| d.name.as_str() == name)
            .and_then(|d| d.constraint.as_deref())
    }
}

/// Dependency groups of a project
///
/// `Ungrouped` stands for "no manifest": every package is direct and unconstrained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Grouping {
    /// No manifest was found
    Ungrouped,
    /// Groups read from the manifest
    Groups(Vec<DependencyGroup>),
}

impl Grouping {
    /// Returns the groups; empty when ungrouped
    pub fn groups(&self) -> &[DependencyGroup] {
        match self {
            Grouping::Ungrouped => &[],
            Grouping::Groups(groups) => groups,
        }
    }

    /// Returns true when no manifest was available
    pub fn is_ungrouped(&self) -> bool {
        matches!(self, Grouping::Ungrouped)
    }

    /// Look up a group by name
    pub fn group(&self, name: &str) -> Option<&DependencyGroup> {
        self.groups().iter().find(|g| g.name == name)
    }
}

/// Read dependency groups from a project directory
///
/// A missing manifest yields `Grouping::Ungrouped`; an unreadable or malformed one is an error.
pub fn read_manifest(project_dir: &Path) -> Result<Grouping, ManifestError> {
    let path = project_dir.join(MANIFEST_NAME);
    match std::fs::read_to_string(&path) {
        Ok(content) => PyprojectTomlParser::new(&path).parse(&content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("{} not found; packages will be ungrouped", path.display());
            Ok(Grouping::Ungrouped)
        }
        Err(e) => Err(ManifestError::read_error(&path, e)),
    }
}
