//! Output formatting for classified reports
//!
//! This module provides:
//! - Render options resolved from the command line
//! - The relation filter behind `--direct` / `--transitive`
//! - The style mapping for versions held back by a constraint
//! - The table formatter

mod table;

pub use table::TableFormatter;

use crate::graph::Relation;
use colored::{ColoredString, Colorize};

/// Which rows to show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RelationFilter {
    /// Direct and transitive rows
    #[default]
    All,
    /// Only packages declared in their group
    DirectOnly,
    /// Only packages reached through a declared package
    TransitiveOnly,
}

impl RelationFilter {
    /// Returns true if rows with this relation pass the filter
    pub fn admits(&self, relation: Relation) -> bool {
        match self {
            RelationFilter::All => true,
            RelationFilter::DirectOnly => relation == Relation::Direct,
            RelationFilter::TransitiveOnly => relation == Relation::Transitive,
        }
    }
}

/// Output verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Table only; no summary when nothing is outdated
    Quiet,
    /// Normal output
    #[default]
    Normal,
    /// Debug logging on stderr
    Verbose,
}

/// Configuration for output formatting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// Print the header row
    pub show_headers: bool,
    /// Include the Constraint and Dependents columns
    pub why: bool,
    /// Row filter
    pub filter: RelationFilter,
    /// Nest transitive rows under their first ancestor
    pub group_by_ancestor: bool,
    /// Whether to use colors
    pub color: bool,
    /// Verbosity level
    pub verbosity: Verbosity,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            show_headers: false,
            why: true,
            filter: RelationFilter::default(),
            group_by_ancestor: false,
            color: true,
            verbosity: Verbosity::default(),
        }
    }
}

/// Style of the Latest column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    /// The declared constraint excludes the latest version
    HeldBack,
    /// An upgrade within the constraint is available
    Upgradable,
}

impl Style {
    /// Map the held-back flag of a row to its style
    pub fn for_row(held_back: bool) -> Self {
        if held_back {
            Style::HeldBack
        } else {
            Style::Upgradable
        }
    }

    /// Apply the style to text
    pub fn paint(&self, text: &str) -> ColoredString {
        match self {
            Style::HeldBack => text.yellow(),
            Style::Upgradable => text.red(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_config_default() {
        let config = OutputConfig::default();
        assert!(!config.show_headers);
        assert!(config.why);
        assert_eq!(config.filter, RelationFilter::All);
        assert!(!config.group_by_ancestor);
        assert!(config.color);
        assert_eq!(config.verbosity, Verbosity::Normal);
    }

    #[test]
    fn test_filters_partition_relations() {
        for relation in [Relation::Direct, Relation::Transitive] {
            assert!(RelationFilter::All.admits(relation));
            assert_ne!(
                RelationFilter::DirectOnly.admits(relation),
                RelationFilter::TransitiveOnly.admits(relation)
            );
        }
    }

    #[test]
    fn test_style_mapping() {
        assert_eq!(Style::for_row(true), Style::HeldBack);
        assert_eq!(Style::for_row(false), Style::Upgradable);
    }
}
