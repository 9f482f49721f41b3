//! Latest-version data from `uv pip list --outdated`
//!
//! This module provides:
//! - The `OutdatedSource` seam used by the orchestrator
//! - The uv-backed implementation
//! - Parsing of pip's JSON listing format

use crate::domain::PackageName;
use crate::error::ExternalToolError;
use crate::uv::Uv;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

const PIP_LIST_ARGS: &[&str] = &["pip", "list", "--outdated", "--format=json"];

/// One entry of the outdated listing
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OutdatedPackage {
    /// Canonical package name
    pub name: PackageName,
    /// Installed version
    pub version: String,
    /// Latest version available on the index
    pub latest_version: String,
}

impl OutdatedPackage {
    /// Creates an outdated entry
    pub fn new(
        name: impl Into<PackageName>,
        version: impl Into<String>,
        latest_version: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            latest_version: latest_version.into(),
        }
    }
}

/// Package name → latest version
#[derive(Debug, Clone, Default)]
pub struct OutdatedVersions {
    packages: HashMap<PackageName, OutdatedPackage>,
}

impl OutdatedVersions {
    /// Returns the entry for a package, if it is outdated
    pub fn get(&self, name: &str) -> Option<&OutdatedPackage> {
        self.packages.get(name)
    }

    /// Returns the latest version for a package, if it is outdated
    pub fn latest(&self, name: &str) -> Option<&str> {
        self.get(name).map(|p| p.latest_version.as_str())
    }

    /// Returns the number of outdated packages
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    /// Returns true if nothing is outdated
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

impl FromIterator<OutdatedPackage> for OutdatedVersions {
    fn from_iter<I: IntoIterator<Item = OutdatedPackage>>(iter: I) -> Self {
        Self {
            packages: iter.into_iter().map(|p| (p.name.clone(), p)).collect(),
        }
    }
}

/// Source of latest-version information
pub trait OutdatedSource {
    /// List the outdated packages of the project in `project_dir`
    fn outdated(&self, project_dir: &Path) -> Result<OutdatedVersions, ExternalToolError>;
}

impl OutdatedSource for Uv {
    fn outdated(&self, project_dir: &Path) -> Result<OutdatedVersions, ExternalToolError> {
        let stdout = self.run(PIP_LIST_ARGS, project_dir)?;
        let command = format!("{} {}", self.program(), PIP_LIST_ARGS.join(" "));
        let versions = parse_pip_list_json(&stdout, &command)?;
        debug!("{} packages reported outdated", versions.len());
        Ok(versions)
    }
}

/// Parse the JSON printed by `pip list --outdated --format=json`
pub fn parse_pip_list_json(
    stdout: &str,
    command: &str,
) -> Result<OutdatedVersions, ExternalToolError> {
    if stdout.trim().is_empty() {
        return Ok(OutdatedVersions::default());
    }
    let packages: Vec<OutdatedPackage> = serde_json::from_str(stdout)
        .map_err(|e| ExternalToolError::invalid_output(command, e.to_string()))?;
    Ok(packages.into_iter().collect())
}
