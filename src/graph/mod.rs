//! Dependency graph of the locked packages
//!
//! This module provides:
//! - `DependencyGraph`: one node per locked package, one edge per declared dependency
//! - The join of outdated versions and descriptions onto nodes
//! - The classifier in [`classify`]

pub mod classify;

pub use classify::{classify, ClassifiedPackage, Relation, Report, Section};

use crate::domain::{PackageName, Version};
use crate::lockfile::Lockfile;
use crate::manifest::Grouping;
use crate::metadata::Descriptions;
use crate::outdated::OutdatedVersions;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::HashMap;
use tracing::debug;

/// A locked package with the data joined onto it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageNode {
    pub name: PackageName,
    /// Locked version
    pub version: String,
    /// Latest version; `None` when the package is up to date
    pub latest: Option<String>,
    pub description: Option<String>,
}

impl PackageNode {
    /// Returns true if a newer version than the locked one exists
    pub fn is_outdated(&self) -> bool {
        self.latest.is_some()
    }
}

/// Directed "depends on" graph; edge weights hold the extra that declared the edge
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    graph: DiGraph<PackageNode, Option<String>>,
    index: HashMap<PackageName, NodeIndex>,
    grouping: Grouping,
    outdated_reported: usize,
}

impl DependencyGraph {
    /// Build the graph and join every data source onto it
    pub fn build(
        lockfile: &Lockfile,
        grouping: Grouping,
        outdated: &OutdatedVersions,
        descriptions: &Descriptions,
    ) -> Self {
        let mut graph = DiGraph::with_capacity(lockfile.len(), 0);
        let mut index = HashMap::with_capacity(lockfile.len());

        for package in lockfile.packages() {
            let mut latest = outdated
                .latest(package.name.as_str())
                .filter(|latest| !same_version(&package.version, latest))
                .map(str::to_string);
            // An index release with the project's own name is a different project.
            if latest.is_some() && package.source.is_local_project() {
                debug!("ignoring latest version for local project {}", package.name);
                latest = None;
            }
            let node = graph.add_node(PackageNode {
                name: package.name.clone(),
                version: package.version.clone(),
                latest,
                description: descriptions.get(package.name.as_str()).cloned(),
            });
            index.insert(package.name.clone(), node);
        }

        for package in lockfile.packages() {
            let from = index[&package.name];
            for dep in &package.dependencies {
                match index.get(&dep.name) {
                    Some(&to) => {
                        graph.add_edge(from, to, dep.through_extra.clone());
                    }
                    None => debug!(
                        "dropping edge {} -> {}: not in lockfile",
                        package.name, dep.name
                    ),
                }
            }
        }

        debug!(
            "built dependency graph with {} nodes and {} edges",
            graph.node_count(),
            graph.edge_count()
        );

        Self {
            graph,
            index,
            grouping,
            outdated_reported: outdated.len(),
        }
    }

    /// Returns the manifest groups joined onto the graph
    pub fn grouping(&self) -> &Grouping {
        &self.grouping
    }

    /// Returns the number of locked packages
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns true if the lockfile had no packages
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Returns the number of packages the outdated source reported
    pub fn outdated_reported(&self) -> usize {
        self.outdated_reported
    }

    /// Look up a node index by canonical name
    pub fn index_of(&self, name: &str) -> Option<NodeIndex> {
        self.index.get(name).copied()
    }

    /// Returns the node at `index`
    pub fn node(&self, index: NodeIndex) -> &PackageNode {
        &self.graph[index]
    }

    /// Look up a node by canonical name
    pub fn package(&self, name: &str) -> Option<&PackageNode> {
        self.index_of(name).map(|i| self.node(i))
    }

    /// Returns outdated nodes in lockfile order
    pub fn outdated(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph
            .node_indices()
            .filter(|&i| self.graph[i].is_outdated())
    }

    /// Returns the direct dependencies of a node in lockfile order, without duplicates
    pub fn dependencies(&self, index: NodeIndex) -> Vec<NodeIndex> {
        // petgraph yields the most recently added edge first
        let mut deps: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(index, Direction::Outgoing)
            .collect();
        deps.reverse();
        let mut seen = Vec::with_capacity(deps.len());
        deps.retain(|d| {
            if seen.contains(d) {
                false
            } else {
                seen.push(*d);
                true
            }
        });
        deps
    }

    /// Returns the names of the packages that depend on a node, sorted
    pub fn dependents(&self, index: NodeIndex) -> Vec<PackageName> {
        let mut names: Vec<PackageName> = self
            .graph
            .neighbors_directed(index, Direction::Incoming)
            .map(|i| self.graph[i].name.clone())
            .collect();
        names.sort();
        names.dedup();
        names
    }
}

// PEP 440 equality when both sides parse, text equality otherwise.
fn same_version(locked: &str, latest: &str) -> bool {
    match (Version::parse(locked), Version::parse(latest)) {
        (Ok(a), Ok(b)) => a == b,
        _ => locked == latest,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LockedDependency, LockedPackage, PackageSource};
    use crate::outdated::OutdatedPackage;

    fn lockfile() -> Lockfile {
        Lockfile::from_packages([
            LockedPackage::new("app", "0.1.0")
                .with_dependency("requests")
                .with_dependency("missing"),
            LockedPackage::new("requests", "2.28.0")
                .with_dependency("urllib3")
                .with_dependency("idna"),
            LockedPackage::new("urllib3", "1.26.0"),
            LockedPackage::new("idna", "3.4"),
        ])
    }

    fn outdated() -> OutdatedVersions {
        [
            OutdatedPackage::new("requests", "2.28.0", "2.31.0"),
            OutdatedPackage::new("urllib3", "1.26.0", "2.0.7"),
            OutdatedPackage::new("idna", "3.4", "3.4.0"),
            OutdatedPackage::new("not-locked", "1.0", "2.0"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_build_nodes_and_edges() {
        let graph = DependencyGraph::build(
            &lockfile(),
            Grouping::Ungrouped,
            &outdated(),
            &Descriptions::new(),
        );
        assert_eq!(graph.len(), 4);
        assert_eq!(graph.outdated_reported(), 4);

        let requests = graph.index_of("requests").unwrap();
        let names: Vec<&str> = graph
            .dependencies(requests)
            .into_iter()
            .map(|i| graph.node(i).name.as_str())
            .collect();
        assert_eq!(names, vec!["urllib3", "idna"]);
    }

    #[test]
    fn test_outdated_join() {
        let graph = DependencyGraph::build(
            &lockfile(),
            Grouping::Ungrouped,
            &outdated(),
            &Descriptions::new(),
        );
        let outdated: Vec<&str> = graph
            .outdated()
            .map(|i| graph.node(i).name.as_str())
            .collect();
        // idna 3.4 == 3.4.0 under PEP 440; not-locked is ignored
        assert_eq!(outdated, vec!["requests", "urllib3"]);
        assert_eq!(
            graph.package("urllib3").unwrap().latest.as_deref(),
            Some("2.0.7")
        );
        assert!(graph.package("app").unwrap().latest.is_none());
    }

    #[test]
    fn test_descriptions_join() {
        let mut descriptions = Descriptions::new();
        descriptions.insert(PackageName::new("requests"), "HTTP for Humans".to_string());
        let graph = DependencyGraph::build(
            &lockfile(),
            Grouping::Ungrouped,
            &outdated(),
            &descriptions,
        );
        assert_eq!(
            graph.package("requests").unwrap().description.as_deref(),
            Some("HTTP for Humans")
        );
        assert!(graph.package("urllib3").unwrap().description.is_none());
    }

    #[test]
    fn test_dependents_sorted_and_unique() {
        let base = lockfile();
        let lockfile = Lockfile::from_packages(
            base.packages()
                .iter()
                .cloned()
                .chain([LockedPackage {
                    dependencies: vec![
                        LockedDependency::main("urllib3"),
                        LockedDependency::extra("urllib3", "socks"),
                    ],
                    ..LockedPackage::new("botocore", "1.0")
                }]),
        );
        let graph = DependencyGraph::build(
            &lockfile,
            Grouping::Ungrouped,
            &outdated(),
            &Descriptions::new(),
        );
        let urllib3 = graph.index_of("urllib3").unwrap();
        let dependents: Vec<String> = graph
            .dependents(urllib3)
            .into_iter()
            .map(|n| n.to_string())
            .collect();
        assert_eq!(dependents, vec!["botocore", "requests"]);

        let botocore = graph.index_of("botocore").unwrap();
        assert_eq!(graph.dependencies(botocore), vec![urllib3]);
    }

    #[test]
    fn test_local_project_is_never_outdated() {
        let lockfile = Lockfile::from_packages([
            LockedPackage {
                source: PackageSource::Editable(".".to_string()),
                ..LockedPackage::new("app", "0.1.0").with_dependency("requests")
            },
            LockedPackage::new("requests", "2.28.0"),
        ]);
        let outdated: OutdatedVersions = [
            OutdatedPackage::new("app", "0.1.0", "3.0.0"),
            OutdatedPackage::new("requests", "2.28.0", "2.31.0"),
        ]
        .into_iter()
        .collect();
        let graph = DependencyGraph::build(
            &lockfile,
            Grouping::Ungrouped,
            &outdated,
            &Descriptions::new(),
        );
        assert!(graph.package("app").unwrap().latest.is_none());
        assert_eq!(
            graph.package("requests").unwrap().latest.as_deref(),
            Some("2.31.0")
        );
    }

    #[test]
    fn test_same_version() {
        assert!(same_version("1.0", "1.0.0"));
        assert!(!same_version("1.0", "1.0.1"));
        assert!(same_version("weird", "weird"));
    }
}
