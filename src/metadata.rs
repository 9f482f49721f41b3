//! Installed package descriptions
//!
//! Descriptions come from the `Summary:` header of each `*.dist-info/METADATA`
//! file in the project's virtualenv. Everything here is best effort: callers
//! log a `MetadataError` and carry on with blank descriptions.

use crate::domain::PackageName;
use crate::error::MetadataError;
use crate::uv::Uv;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Package name → one-line description
pub type Descriptions = HashMap<PackageName, String>;

/// Source of package descriptions
pub trait MetadataSource {
    /// Collect descriptions for the packages installed for `project_dir`
    fn descriptions(&self, project_dir: &Path) -> Result<Descriptions, MetadataError>;
}

/// Reads descriptions from the site-packages of the project's virtualenv
pub struct SitePackages {
    uv: Uv,
}

impl SitePackages {
    /// Create a source that falls back to `uv python find` when the
    /// project has no `.venv`
    pub fn new(uv: Uv) -> Self {
        Self { uv }
    }

    /// Locate the virtualenv directory for a project
    fn venv_dir(&self, project_dir: &Path) -> Result<PathBuf, MetadataError> {
        let local = project_dir.join(".venv");
        if local.join("pyvenv.cfg").is_file() {
            return Ok(local);
        }

        let stdout = self
            .uv
            .run(&["python", "find"], project_dir)
            .map_err(|e| MetadataError::InterpreterNotFound {
                message: e.to_string(),
            })?;
        let python = PathBuf::from(stdout.trim());
        // <venv>/bin/python or <venv>\Scripts\python.exe
        python
            .parent()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .ok_or_else(|| MetadataError::InterpreterNotFound {
                message: format!("unexpected interpreter path {}", python.display()),
            })
    }

    /// Locate site-packages for a project
    pub fn site_packages(&self, project_dir: &Path) -> Result<PathBuf, MetadataError> {
        let venv = self.venv_dir(project_dir)?;
        site_packages_in(&venv)
    }
}

impl MetadataSource for SitePackages {
    fn descriptions(&self, project_dir: &Path) -> Result<Descriptions, MetadataError> {
        let site_packages = self.site_packages(project_dir)?;
        debug!("reading package metadata from {}", site_packages.display());
        read_descriptions(&site_packages)
    }
}

/// Resolve `site-packages` inside a virtualenv using its `pyvenv.cfg`
pub fn site_packages_in(venv: &Path) -> Result<PathBuf, MetadataError> {
    let site_packages = if cfg!(windows) {
        venv.join("Lib").join("site-packages")
    } else {
        let cfg_path = venv.join("pyvenv.cfg");
        let cfg = std::fs::read_to_string(&cfg_path).map_err(|e| MetadataError::ReadError {
            path: cfg_path.clone(),
            source: e,
        })?;
        let version = python_version(&cfg).ok_or_else(|| MetadataError::InterpreterNotFound {
            message: format!("no Python version in {}", cfg_path.display()),
        })?;
        venv.join("lib")
            .join(format!("python{}", version))
            .join("site-packages")
    };

    if site_packages.is_dir() {
        Ok(site_packages)
    } else {
        Err(MetadataError::SitePackagesNotFound {
            path: site_packages,
        })
    }
}

/// Extract `major.minor` from pyvenv.cfg (`version` or `version_info` key)
fn python_version(cfg: &str) -> Option<String> {
    cfg.lines().find_map(|line| {
        let (key, value) = line.split_once('=')?;
        if !matches!(key.trim(), "version" | "version_info") {
            return None;
        }
        let mut parts = value.trim().split('.');
        let major = parts.next().filter(|s| !s.is_empty())?;
        let minor = parts.next()?;
        Some(format!("{}.{}", major, minor))
    })
}

/// Read the `Summary:` of every distribution installed in `site_packages`
pub fn read_descriptions(site_packages: &Path) -> Result<Descriptions, MetadataError> {
    let entries = std::fs::read_dir(site_packages).map_err(|e| MetadataError::ReadError {
        path: site_packages.to_path_buf(),
        source: e,
    })?;

    let mut descriptions = Descriptions::new();
    for entry in entries.flatten() {
        let dir = entry.path();
        let is_dist_info = dir
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(".dist-info"));
        if !is_dist_info {
            continue;
        }

        let metadata_path = dir.join("METADATA");
        let Ok(content) = std::fs::read_to_string(&metadata_path) else {
            debug!("skipping unreadable {}", metadata_path.display());
            continue;
        };
        if let Some((name, summary)) = parse_metadata(&content) {
            descriptions.insert(name, summary);
        }
    }

    debug!("found {} package descriptions", descriptions.len());
    Ok(descriptions)
}

/// Parse `Name:` and `Summary:` from a core metadata document
///
/// Only the header block (up to the first blank line) is considered.
pub fn parse_metadata(content: &str) -> Option<(PackageName, String)> {
    let mut name = None;
    let mut summary = String::new();

    for line in content.lines() {
        if line.trim().is_empty() {
            break;
        }
        if let Some(value) = line.strip_prefix("Name:") {
            name.get_or_insert_with(|| PackageName::new(value.trim()));
        } else if let Some(value) = line.strip_prefix("Summary:") {
            if summary.is_empty() {
                summary = value.trim().to_string();
            }
        }
    }

    name.filter(|n| !n.is_empty()).map(|n| (n, summary))
}
