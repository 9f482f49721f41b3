//! Pipeline orchestrator
//!
//! This module provides:
//! - Workflow coordination: lockfile → manifest → outdated → descriptions → classify
//! - Substitutable sources for the external uv calls
//! - Degraded handling of missing metadata

use crate::cli::CliArgs;
use crate::error::AppError;
use crate::graph::{classify, DependencyGraph, Report};
use crate::lockfile::read_lockfile;
use crate::manifest::read_manifest;
use crate::metadata::{Descriptions, MetadataSource, SitePackages};
use crate::outdated::OutdatedSource;
use crate::progress::Progress;
use crate::uv::Uv;
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing::debug;

/// Runs the pipeline for one project directory
pub struct Orchestrator {
    /// Directory holding uv.lock and pyproject.toml
    project_dir: PathBuf,
    /// Latest-version source
    outdated: Box<dyn OutdatedSource>,
    /// Description source
    metadata: Box<dyn MetadataSource>,
    /// Whether to draw a spinner while uv runs
    show_progress: bool,
}

impl Orchestrator {
    /// Create an orchestrator backed by the uv executable named in the arguments
    pub fn new(args: &CliArgs) -> Self {
        let uv = Uv::new(args.uv.clone());
        Self {
            project_dir: args.project.clone(),
            outdated: Box::new(uv.clone()),
            metadata: Box::new(SitePackages::new(uv)),
            show_progress: !args.quiet && std::io::stderr().is_terminal(),
        }
    }

    /// Create an orchestrator with explicit sources and no spinner
    pub fn with_sources(
        project_dir: impl Into<PathBuf>,
        outdated: Box<dyn OutdatedSource>,
        metadata: Box<dyn MetadataSource>,
    ) -> Self {
        Self {
            project_dir: project_dir.into(),
            outdated,
            metadata,
            show_progress: false,
        }
    }

    /// Run the pipeline and return the classified report
    pub fn run(&self) -> Result<Report, AppError> {
        let lockfile = read_lockfile(&self.project_dir)?;
        let grouping = read_manifest(&self.project_dir)?;

        let mut progress = Progress::new(self.show_progress);
        progress.spinner("Checking for outdated packages...");
        let outdated = self.outdated.outdated(&self.project_dir);
        progress.finish_and_clear();
        let outdated = outdated?;

        let descriptions = if outdated.is_empty() {
            Descriptions::new()
        } else {
            self.descriptions()
        };

        let graph = DependencyGraph::build(&lockfile, grouping, &outdated, &descriptions);
        let report = classify(&graph);
        debug!(
            "{} sections, {} locked, {} reported outdated",
            report.sections.len(),
            report.locked,
            report.outdated_reported
        );
        Ok(report)
    }

    fn descriptions(&self) -> Descriptions {
        match self.metadata.descriptions(&self.project_dir) {
            Ok(descriptions) => descriptions,
            Err(e) => {
                debug!("package descriptions unavailable: {}", e);
                Descriptions::new()
            }
        }
    }
}
