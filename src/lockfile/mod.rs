//! uv.lock parser
//!
//! Handles:
//! - `[[package]]` entries with `name`, `version` and `source`
//! - `dependencies` (main dependency list)
//! - `optional-dependencies.<extra>` (edges through an extra)
//! - `dev-dependencies.<group>` (the project's own dependency groups)
//!
//! Everything else in the lockfile (wheels, sdists, metadata) is ignored.

use crate::domain::{LockedDependency, LockedPackage, PackageName, PackageSource};
use crate::error::LockfileError;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::{debug, warn};

/// File name of the lockfile inside a project
pub const LOCKFILE_NAME: &str = "uv.lock";

/// Newest lockfile format revision this parser knows
const SUPPORTED_LOCK_VERSION: u32 = 1;

#[derive(Debug, Deserialize)]
struct RawLockfile {
    version: Option<u32>,
    #[serde(default)]
    package: Vec<RawPackage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RawPackage {
    name: PackageName,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    source: Option<RawSource>,
    #[serde(default)]
    dependencies: Vec<RawDependency>,
    #[serde(default)]
    optional_dependencies: BTreeMap<String, Vec<RawDependency>>,
    #[serde(default)]
    dev_dependencies: BTreeMap<String, Vec<RawDependency>>,
}

#[derive(Debug, Default, Deserialize)]
struct RawSource {
    registry: Option<String>,
    editable: Option<String>,
    #[serde(rename = "virtual")]
    virtual_path: Option<String>,
    directory: Option<String>,
    path: Option<String>,
    git: Option<String>,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawDependency {
    Table { name: String },
    Requirement(String),
}

impl RawDependency {
    // Old lockfiles wrote `"name==1.0"` strings instead of tables.
    fn name(&self) -> PackageName {
        match self {
            RawDependency::Table { name } => PackageName::new(name),
            RawDependency::Requirement(req) => {
                let first = req.split_whitespace().next().unwrap_or("");
                let end = first
                    .find(|c: char| matches!(c, '=' | '<' | '>' | '!' | '~' | '[' | ';'))
                    .unwrap_or(first.len());
                PackageName::new(&first[..end])
            }
        }
    }
}

impl From<RawSource> for PackageSource {
    fn from(raw: RawSource) -> Self {
        if let Some(url) = raw.registry {
            PackageSource::Registry(url)
        } else if let Some(path) = raw.editable {
            PackageSource::Editable(path)
        } else if let Some(path) = raw.virtual_path {
            PackageSource::Virtual(path)
        } else if let Some(path) = raw.directory {
            PackageSource::Directory(path)
        } else if let Some(path) = raw.path {
            PackageSource::Path(path)
        } else if let Some(url) = raw.git {
            PackageSource::Git(url)
        } else if let Some(url) = raw.url {
            PackageSource::Url(url)
        } else {
            PackageSource::Unknown
        }
    }
}

/// The resolved packages of a project
#[derive(Debug, Clone, Default)]
pub struct Lockfile {
    /// Lockfile format revision, if recorded
    pub version: Option<u32>,
    packages: Vec<LockedPackage>,
    index: HashMap<PackageName, usize>,
}

impl Lockfile {
    /// Parse lockfile content; `path` is only used in error messages
    pub fn parse(content: &str, path: &Path) -> Result<Self, LockfileError> {
        let raw: RawLockfile =
            toml::from_str(content).map_err(|e| LockfileError::parse_error(path, e.to_string()))?;

        if let Some(version) = raw.version {
            if version > SUPPORTED_LOCK_VERSION {
                warn!(
                    "{} uses lockfile version {}; newer than supported version {}",
                    path.display(),
                    version,
                    SUPPORTED_LOCK_VERSION
                );
            }
        }

        let mut lockfile = Lockfile {
            version: raw.version,
            ..Default::default()
        };

        for raw_pkg in raw.package {
            if raw_pkg.name.is_empty() {
                return Err(LockfileError::parse_error(path, "package with empty name"));
            }
            lockfile.insert(convert_package(raw_pkg));
        }

        debug!(
            "parsed {} packages from {}",
            lockfile.packages.len(),
            path.display()
        );
        Ok(lockfile)
    }

    /// Builds a lockfile from already-resolved packages
    pub fn from_packages(packages: impl IntoIterator<Item = LockedPackage>) -> Self {
        let mut lockfile = Lockfile::default();
        for package in packages {
            lockfile.insert(package);
        }
        lockfile
    }

    // Forked resolutions repeat a name; the first entry wins and absorbs later edges.
    fn insert(&mut self, package: LockedPackage) {
        match self.index.get(&package.name) {
            Some(&i) => {
                let existing = &mut self.packages[i];
                debug!("merging duplicate lockfile entry for {}", package.name);
                for dep in package.dependencies {
                    if !existing.dependencies.contains(&dep) {
                        existing.dependencies.push(dep);
                    }
                }
            }
            None => {
                self.index
                    .insert(package.name.clone(), self.packages.len());
                self.packages.push(package);
            }
        }
    }

    /// Returns packages in lockfile order
    pub fn packages(&self) -> &[LockedPackage] {
        &self.packages
    }

    /// Look up a package by canonical name
    pub fn get(&self, name: &str) -> Option<&LockedPackage> {
        self.index.get(name).map(|&i| &self.packages[i])
    }

    /// Returns the number of distinct packages
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    /// Returns true if the lockfile has no packages
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

fn convert_package(raw: RawPackage) -> LockedPackage {
    let mut dependencies: Vec<LockedDependency> = raw
        .dependencies
        .iter()
        .map(|dep| LockedDependency::main(dep.name()))
        .collect();

    for (extra, deps) in raw
        .optional_dependencies
        .iter()
        .chain(raw.dev_dependencies.iter())
    {
        for dep in deps {
            let edge = LockedDependency::extra(dep.name(), extra.clone());
            if !dependencies.contains(&edge) {
                dependencies.push(edge);
            }
        }
    }

    LockedPackage {
        name: raw.name,
        version: raw.version.unwrap_or_default(),
        dependencies,
        source: raw.source.map(PackageSource::from).unwrap_or_default(),
    }
}

/// Read `uv.lock` from a project directory
pub fn read_lockfile(project_dir: &Path) -> Result<Lockfile, LockfileError> {
    let path = project_dir.join(LOCKFILE_NAME);
    let content = std::fs::read_to_string(&path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            LockfileError::not_found(&path)
        } else {
            LockfileError::read_error(&path, e)
        }
    })?;
    Lockfile::parse(&content, &path)
}
