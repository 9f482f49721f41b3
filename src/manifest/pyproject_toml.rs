//! pyproject.toml parser for uv projects
//!
//! Handles:
//! - project.dependencies (PEP 621) as the `main` group
//! - project.optional-dependencies (PEP 621), one group per extra
//! - dependency-groups (PEP 735), including `{ include-group = "..." }`
//! - tool.uv.dev-dependencies (legacy uv), merged into `dev`

use super::{DeclaredDependency, DependencyGroup, Grouping, DEV_GROUP, MAIN_GROUP};
use crate::domain::{PackageName, Requirement};
use crate::error::ManifestError;
use std::path::{Path, PathBuf};
use toml::Value;
use tracing::debug;

/// Parser for pyproject.toml files
pub struct PyprojectTomlParser {
    path: PathBuf,
}

impl PyprojectTomlParser {
    /// Create a parser; `path` is only used in error messages
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Parse dependency groups from pyproject.toml content
    pub fn parse(&self, content: &str) -> Result<Grouping, ManifestError> {
        let toml: toml::Table = toml::from_str(content)
            .map_err(|e| ManifestError::toml_parse_error(&self.path, e.to_string()))?;

        let mut groups: Vec<DependencyGroup> = Vec::new();

        // Parse PEP 621 project.dependencies
        if let Some(deps) = toml
            .get("project")
            .and_then(|p| p.get("dependencies"))
            .and_then(|d| d.as_array())
        {
            let declared = self.parse_requirements(deps)?;
            merge_group(&mut groups, MAIN_GROUP, declared);
        }

        // Parse PEP 621 project.optional-dependencies
        if let Some(optional) = toml
            .get("project")
            .and_then(|p| p.get("optional-dependencies"))
            .and_then(|d| d.as_table())
        {
            for (extra, deps) in optional {
                if let Some(deps_array) = deps.as_array() {
                    let declared = self.parse_requirements(deps_array)?;
                    merge_group(&mut groups, &group_name(extra), declared);
                }
            }
        }

        // Parse PEP 735 dependency-groups
        if let Some(dependency_groups) = toml.get("dependency-groups").and_then(|g| g.as_table()) {
            for name in dependency_groups.keys() {
                let mut stack = Vec::new();
                let declared = self.resolve_group(dependency_groups, name, &mut stack)?;
                merge_group(&mut groups, &group_name(name), declared);
            }
        }

        // Parse legacy tool.uv.dev-dependencies
        if let Some(dev_deps) = toml
            .get("tool")
            .and_then(|t| t.get("uv"))
            .and_then(|u| u.get("dev-dependencies"))
            .and_then(|d| d.as_array())
        {
            let declared = self.parse_requirements(dev_deps)?;
            merge_group(&mut groups, DEV_GROUP, declared);
        }

        groups.retain(|group| !group.dependencies.is_empty());
        debug!(
            "parsed {} dependency groups from {}",
            groups.len(),
            self.path.display()
        );
        Ok(Grouping::Groups(groups))
    }

    fn parse_requirements(
        &self,
        values: &[Value],
    ) -> Result<Vec<DeclaredDependency>, ManifestError> {
        values
            .iter()
            .filter_map(|value| value.as_str())
            .map(|dep_str| self.parse_requirement(dep_str))
            .collect()
    }

    fn parse_requirement(&self, dep_str: &str) -> Result<DeclaredDependency, ManifestError> {
        let requirement = Requirement::parse(dep_str).map_err(|e| {
            ManifestError::invalid_requirement(&self.path, dep_str, e.to_string())
        })?;
        Ok(DeclaredDependency::new(
            requirement.name.clone(),
            requirement.constraint().map(str::to_string),
        ))
    }

    // Expands one PEP 735 group, following include-group entries depth first.
    fn resolve_group(
        &self,
        table: &toml::Table,
        name: &str,
        stack: &mut Vec<String>,
    ) -> Result<Vec<DeclaredDependency>, ManifestError> {
        let invalid_include = || ManifestError::InvalidInclude {
            path: self.path.clone(),
            group: name.to_string(),
        };

        let normalized = group_name(name);
        if stack.contains(&normalized) {
            return Err(invalid_include());
        }
        let entries = table
            .iter()
            .find(|(key, _)| group_name(key) == normalized)
            .and_then(|(_, value)| value.as_array())
            .ok_or_else(invalid_include)?;

        stack.push(normalized);
        let mut declared = Vec::new();
        for entry in entries {
            if let Some(dep_str) = entry.as_str() {
                declared.push(self.parse_requirement(dep_str)?);
            } else if let Some(included) = entry.get("include-group").and_then(|g| g.as_str()) {
                declared.extend(self.resolve_group(table, included, stack)?);
            }
        }
        stack.pop();

        Ok(declared)
    }
}

// Extras and dependency groups compare like package names.
fn group_name(raw: &str) -> String {
    PackageName::new(raw).to_string()
}

fn merge_group(groups: &mut Vec<DependencyGroup>, name: &str, declared: Vec<DeclaredDependency>) {
    let index = match groups.iter().position(|g| g.name == name) {
        Some(i) => i,
        None => {
            groups.push(DependencyGroup::new(name));
            groups.len() - 1
        }
    };
    for dep in declared {
        groups[index].declare(dep);
    }
}

/// Parse pyproject.toml content with a default error path
pub fn parse_pyproject(content: &str) -> Result<Grouping, ManifestError> {
    PyprojectTomlParser::new(Path::new("pyproject.toml")).parse(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn groups(content: &str) -> Vec<DependencyGroup> {
        parse_pyproject(content).unwrap().groups().to_vec()
    }

    #[test]
    fn test_parse_pep621_dependencies() {
        let content = r#"
[project]
name = "test-project"
dependencies = [
    "requests>=2.25.0",
    "click",
]
"#;
        let groups = groups(content);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].name, MAIN_GROUP);
        assert_eq!(groups[0].constraint("requests"), Some(">=2.25.0"));
        assert!(groups[0].contains("click"));
        assert_eq!(groups[0].constraint("click"), None);
    }

    #[test]
    fn test_parse_optional_dependencies() {
        let content = r#"
[project]
name = "test"
dependencies = []

[project.optional-dependencies]
Docs = ["sphinx>=7"]
"#;
        let groups = groups(content);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].name, "docs");
        assert_eq!(groups[0].constraint("sphinx"), Some(">=7"));
    }

    #[test]
    fn test_parse_dependency_groups_with_include() {
        let content = r#"
[dependency-groups]
test = ["pytest>=8"]
dev = [
    "mypy",
    { include-group = "test" },
]
"#;
        let groups = groups(content);
        let dev = groups.iter().find(|g| g.name == "dev").unwrap();
        assert!(dev.contains("mypy"));
        assert_eq!(dev.constraint("pytest"), Some(">=8"));
        let test = groups.iter().find(|g| g.name == "test").unwrap();
        assert_eq!(test.dependencies.len(), 1);
    }

    #[test]
    fn test_include_cycle_is_error() {
        let content = r#"
[dependency-groups]
a = [{ include-group = "b" }]
b = [{ include-group = "a" }]
"#;
        let err = parse_pyproject(content).unwrap_err();
        assert!(matches!(err, ManifestError::InvalidInclude { .. }));
    }

    #[test]
    fn test_include_missing_group_is_error() {
        let content = r#"
[dependency-groups]
dev = [{ include-group = "nope" }]
"#;
        assert!(parse_pyproject(content).is_err());
    }

    #[test]
    fn test_legacy_uv_dev_dependencies_merge_into_dev() {
        let content = r#"
[dependency-groups]
dev = ["ruff"]

[tool.uv]
dev-dependencies = ["pytest<9"]
"#;
        let groups = groups(content);
        assert_eq!(groups.len(), 1);
        assert!(groups[0].contains("ruff"));
        assert_eq!(groups[0].constraint("pytest"), Some("<9"));
    }

    #[test]
    fn test_names_are_canonicalized() {
        let content = r#"
[project]
dependencies = ["Typing_Extensions>=4"]
"#;
        let groups = groups(content);
        assert!(groups[0].contains("typing-extensions"));
    }

    #[test]
    fn test_no_dependencies() {
        let content = r#"
[project]
name = "empty"
"#;
        let grouping = parse_pyproject(content).unwrap();
        assert!(!grouping.is_ungrouped());
        assert!(grouping.groups().is_empty());
    }

    #[test]
    fn test_invalid_toml() {
        let err = parse_pyproject("[project\n").unwrap_err();
        assert!(matches!(err, ManifestError::TomlParseError { .. }));
    }

    #[test]
    fn test_invalid_requirement() {
        let content = r#"
[project]
dependencies = [">=1.0"]
"#;
        let err = parse_pyproject(content).unwrap_err();
        assert!(matches!(err, ManifestError::InvalidRequirement { .. }));
    }
}
