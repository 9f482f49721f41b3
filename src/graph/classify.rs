//! Direct/transitive classification per dependency group
//!
//! For each group the declared packages are the roots. A breadth-first walk
//! from all roots at once (in declaration order) assigns every reachable
//! package its first ancestor; one walk per root collects the full ancestor
//! set. Walks never continue through another root of the same group and keep
//! a visited set, so cycles terminate.

use super::DependencyGraph;
use crate::domain::{holds_back, PackageName};
use crate::manifest::{DependencyGroup, Grouping, MAIN_GROUP};
use petgraph::graph::NodeIndex;
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt;
use tracing::debug;

/// How a package relates to a group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    /// Declared in the group
    Direct,
    /// Reached through a declared package, or unrelated to every group
    Transitive,
}

impl Relation {
    /// Returns true for `Relation::Direct`
    pub fn is_direct(&self) -> bool {
        matches!(self, Relation::Direct)
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Relation::Direct => write!(f, "direct"),
            Relation::Transitive => write!(f, "transitive"),
        }
    }
}

/// One outdated package as it appears in one section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedPackage {
    pub name: PackageName,
    /// Locked version
    pub version: String,
    /// Latest available version
    pub latest: String,
    pub description: Option<String>,
    pub relation: Relation,
    /// Specifier declared for this package in this group
    pub constraint: Option<String>,
    /// True when `constraint` excludes `latest`
    pub held_back: bool,
    /// Packages that depend on this one directly, sorted
    pub dependents: Vec<PackageName>,
    /// Every declared package of the group this one is reached from, sorted
    pub ancestors: Vec<PackageName>,
    /// The ancestor found first by the breadth-first walk
    pub primary_ancestor: Option<PackageName>,
}

impl ClassifiedPackage {
    /// Returns true if the package is declared in its group
    pub fn is_direct(&self) -> bool {
        self.relation.is_direct()
    }
}

/// Rows of one group, or of the ungrouped remainder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Group name; `None` for the ungrouped section
    pub group: Option<String>,
    /// Rows ordered by package name
    pub packages: Vec<ClassifiedPackage>,
}

/// Classified outdated packages, ready for rendering
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Report {
    /// `main` first, other groups alphabetically, ungrouped last
    pub sections: Vec<Section>,
    /// Number of packages in the lockfile
    pub locked: usize,
    /// Number of packages the outdated source reported
    pub outdated_reported: usize,
}

impl Report {
    /// Returns true if no section has rows
    pub fn is_empty(&self) -> bool {
        self.sections.iter().all(|s| s.packages.is_empty())
    }

    /// Look up a section by group name; `None` selects the ungrouped section
    pub fn section(&self, group: Option<&str>) -> Option<&Section> {
        self.sections.iter().find(|s| s.group.as_deref() == group)
    }
}

/// Reachability of one group's declared packages
struct GroupReach {
    direct: HashSet<NodeIndex>,
    primary: HashMap<NodeIndex, NodeIndex>,
    ancestors: HashMap<NodeIndex, BTreeSet<PackageName>>,
}

impl GroupReach {
    fn compute(graph: &DependencyGraph, group: &DependencyGroup) -> Self {
        let roots: Vec<NodeIndex> = group
            .dependencies
            .iter()
            .filter_map(|d| graph.index_of(d.name.as_str()))
            .collect();
        let direct: HashSet<NodeIndex> = roots.iter().copied().collect();

        let mut primary = HashMap::new();
        let mut queue: VecDeque<(NodeIndex, NodeIndex)> =
            roots.iter().map(|&root| (root, root)).collect();
        while let Some((node, root)) = queue.pop_front() {
            for dep in graph.dependencies(node) {
                if direct.contains(&dep) || primary.contains_key(&dep) {
                    continue;
                }
                primary.insert(dep, root);
                queue.push_back((dep, root));
            }
        }

        let mut ancestors: HashMap<NodeIndex, BTreeSet<PackageName>> = HashMap::new();
        for &root in &roots {
            let root_name = &graph.node(root).name;
            let mut visited = HashSet::from([root]);
            let mut queue = VecDeque::from([root]);
            while let Some(node) = queue.pop_front() {
                for dep in graph.dependencies(node) {
                    if direct.contains(&dep) || !visited.insert(dep) {
                        continue;
                    }
                    ancestors.entry(dep).or_default().insert(root_name.clone());
                    queue.push_back(dep);
                }
            }
        }

        debug!(
            "group {}: {} declared, {} reachable",
            group.name,
            direct.len(),
            primary.len()
        );

        Self {
            direct,
            primary,
            ancestors,
        }
    }

    fn relates(&self, node: NodeIndex) -> bool {
        self.direct.contains(&node) || self.primary.contains_key(&node)
    }
}

/// Classify every outdated package of the graph into sections
pub fn classify(graph: &DependencyGraph) -> Report {
    let outdated: Vec<NodeIndex> = graph.outdated().collect();
    let mut sections = Vec::new();

    match graph.grouping() {
        Grouping::Ungrouped => {
            let packages = outdated
                .iter()
                .map(|&node| entry(graph, node, Relation::Direct, None, None, Vec::new()))
                .collect();
            sections.push(section(None, packages));
        }
        Grouping::Groups(groups) => {
            let mut related = HashSet::new();
            let mut grouped = Vec::new();

            for group in groups {
                let reach = GroupReach::compute(graph, group);
                let mut packages = Vec::new();
                for &node in &outdated {
                    if !reach.relates(node) {
                        continue;
                    }
                    related.insert(node);
                    let name = graph.node(node).name.as_str();
                    let constraint = group.constraint(name);
                    let package = if reach.direct.contains(&node) {
                        entry(graph, node, Relation::Direct, constraint, None, Vec::new())
                    } else {
                        let primary = reach.primary.get(&node).map(|&i| graph.node(i).name.clone());
                        let ancestors = reach
                            .ancestors
                            .get(&node)
                            .map(|set| set.iter().cloned().collect())
                            .unwrap_or_default();
                        entry(graph, node, Relation::Transitive, constraint, primary, ancestors)
                    };
                    packages.push(package);
                }
                if !packages.is_empty() {
                    grouped.push(section(Some(group.name.clone()), packages));
                }
            }

            grouped.sort_by(|a, b| section_key(a).cmp(&section_key(b)));
            sections.extend(grouped);

            let orphans: Vec<ClassifiedPackage> = outdated
                .iter()
                .filter(|node| !related.contains(*node))
                .map(|&node| entry(graph, node, Relation::Transitive, None, None, Vec::new()))
                .collect();
            if !orphans.is_empty() {
                debug!("{} outdated packages belong to no group", orphans.len());
                sections.push(section(None, orphans));
            }
        }
    }

    sections.retain(|s| !s.packages.is_empty());

    Report {
        sections,
        locked: graph.len(),
        outdated_reported: graph.outdated_reported(),
    }
}

fn entry(
    graph: &DependencyGraph,
    node: NodeIndex,
    relation: Relation,
    constraint: Option<&str>,
    primary_ancestor: Option<PackageName>,
    ancestors: Vec<PackageName>,
) -> ClassifiedPackage {
    let package = graph.node(node);
    let latest = package.latest.clone().unwrap_or_default();
    ClassifiedPackage {
        name: package.name.clone(),
        version: package.version.clone(),
        held_back: constraint.is_some_and(|c| holds_back(c, &latest)),
        latest,
        description: package.description.clone(),
        relation,
        constraint: constraint.map(str::to_string),
        dependents: graph.dependents(node),
        ancestors,
        primary_ancestor,
    }
}

fn section(group: Option<String>, mut packages: Vec<ClassifiedPackage>) -> Section {
    packages.sort_by(|a, b| a.name.cmp(&b.name));
    Section { group, packages }
}

// `main` sorts before every other group name.
fn section_key(section: &Section) -> (bool, &str) {
    let name = section.group.as_deref().unwrap_or_default();
    (name != MAIN_GROUP, name)
}
