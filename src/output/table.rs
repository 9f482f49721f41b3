//! Table formatter for human-readable display
//!
//! This module provides:
//! - One section per group with a `[group:<name>]` title
//! - Column alignment computed on plain text across every section
//! - Optional nesting of transitive rows under their first ancestor
//! - Colors for held-back versions

use crate::domain::PackageName;
use crate::graph::{ClassifiedPackage, Report, Section};
use crate::output::{OutputConfig, Style};
use colored::Colorize;
use std::collections::BTreeMap;

const SEPARATOR: &str = "  ";
const INDENT: &str = "  ";
const UNKNOWN_ANCESTOR: &str = "(unknown ancestor)";

/// How a cell is colored; widths never depend on it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Paint {
    Plain,
    Name { nested: bool },
    Ancestor,
    Current,
    Latest(Style),
    Heading,
}

#[derive(Debug, Clone)]
struct Cell {
    text: String,
    paint: Paint,
}

impl Cell {
    fn new(text: impl Into<String>, paint: Paint) -> Self {
        Self {
            text: text.into(),
            paint,
        }
    }

    fn plain(text: impl Into<String>) -> Self {
        Self::new(text, Paint::Plain)
    }

    fn width(&self) -> usize {
        self.text.chars().count()
    }
}

#[derive(Debug, Clone)]
enum Line {
    Blank,
    Title(String),
    Rule,
    Cells(Vec<Cell>),
}

/// Table formatter for human-readable output
pub struct TableFormatter {
    config: OutputConfig,
}

impl TableFormatter {
    /// Create a new table formatter
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    /// Render a report into a string
    pub fn render(&self, report: &Report) -> String {
        let lines = self.layout(report);
        let widths = column_widths(&lines, self.columns().len());

        let mut out = String::new();
        for line in &lines {
            let text = match line {
                Line::Blank => String::new(),
                Line::Title(title) => {
                    if self.config.color {
                        title.bold().blue().to_string()
                    } else {
                        title.clone()
                    }
                }
                Line::Rule => widths
                    .iter()
                    .map(|&w| "-".repeat(w))
                    .collect::<Vec<_>>()
                    .join(SEPARATOR),
                Line::Cells(cells) => self.format_cells(cells, &widths),
            };
            out.push_str(text.trim_end());
            out.push('\n');
        }
        out
    }

    fn columns(&self) -> Vec<&'static str> {
        let mut columns = vec!["Package", "Current", "Latest"];
        if self.config.why {
            columns.extend(["Constraint", "Dependents"]);
        }
        columns.push("Description");
        columns
    }

    // Empty when no section has a visible row, even with headers on.
    fn layout(&self, report: &Report) -> Vec<Line> {
        let mut body = Vec::new();
        for section in &report.sections {
            let rows = self.section_rows(section);
            if rows.is_empty() {
                continue;
            }
            if !body.is_empty() {
                body.push(Line::Blank);
            }
            if let Some(group) = &section.group {
                body.push(Line::Title(format!("[group:{}]", group)));
            }
            body.extend(rows);
        }

        if body.is_empty() || !self.config.show_headers {
            return body;
        }
        let header = self
            .columns()
            .into_iter()
            .map(|c| Cell::new(c, Paint::Heading))
            .collect();
        let mut lines = vec![Line::Cells(header), Line::Rule];
        lines.append(&mut body);
        lines
    }

    fn section_rows(&self, section: &Section) -> Vec<Line> {
        let visible: Vec<&ClassifiedPackage> = section
            .packages
            .iter()
            .filter(|p| self.config.filter.admits(p.relation))
            .collect();

        if !self.config.group_by_ancestor {
            return visible
                .into_iter()
                .map(|p| self.package_row(p, false))
                .collect();
        }

        let (direct, transitive): (Vec<&ClassifiedPackage>, Vec<&ClassifiedPackage>) =
            visible.into_iter().partition(|p| p.is_direct());

        let mut rows = Vec::new();
        for package in &direct {
            rows.push(self.package_row(package, false));
            for child in transitive
                .iter()
                .filter(|t| t.primary_ancestor.as_ref() == Some(&package.name))
            {
                rows.push(self.package_row(child, true));
            }
        }

        let mut headless: BTreeMap<&PackageName, Vec<&ClassifiedPackage>> = BTreeMap::new();
        let mut unknown = Vec::new();
        for child in &transitive {
            match &child.primary_ancestor {
                Some(ancestor) if direct.iter().any(|d| &d.name == ancestor) => {}
                Some(ancestor) => headless.entry(ancestor).or_default().push(*child),
                None => unknown.push(*child),
            }
        }

        for (ancestor, children) in headless {
            rows.push(self.ancestor_row(ancestor.as_str()));
            rows.extend(children.into_iter().map(|c| self.package_row(c, true)));
        }
        if !unknown.is_empty() {
            rows.push(self.ancestor_row(UNKNOWN_ANCESTOR));
            rows.extend(unknown.into_iter().map(|c| self.package_row(c, true)));
        }
        rows
    }

    fn package_row(&self, package: &ClassifiedPackage, nested: bool) -> Line {
        let name = if nested {
            format!("{}{}", INDENT, package.name)
        } else {
            package.name.to_string()
        };

        let mut cells = vec![
            Cell::new(name, Paint::Name { nested }),
            Cell::new(package.version.as_str(), Paint::Current),
            Cell::new(
                package.latest.as_str(),
                Paint::Latest(Style::for_row(package.held_back)),
            ),
        ];
        if self.config.why {
            cells.push(Cell::plain(package.constraint.as_deref().unwrap_or_default()));
            let dependents = if package.is_direct() {
                String::new()
            } else {
                package
                    .dependents
                    .iter()
                    .map(PackageName::as_str)
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            cells.push(Cell::plain(dependents));
        }
        cells.push(Cell::plain(package.description.as_deref().unwrap_or_default()));
        Line::Cells(cells)
    }

    fn ancestor_row(&self, name: &str) -> Line {
        Line::Cells(vec![Cell::new(name, Paint::Ancestor)])
    }

    fn format_cells(&self, cells: &[Cell], widths: &[usize]) -> String {
        let mut parts = Vec::with_capacity(widths.len());
        for (i, &width) in widths.iter().enumerate() {
            let (text, pad) = match cells.get(i) {
                Some(cell) => (self.paint(cell), width.saturating_sub(cell.width())),
                None => (String::new(), width),
            };
            parts.push(format!("{}{}", text, " ".repeat(pad)));
        }
        parts.join(SEPARATOR)
    }

    fn paint(&self, cell: &Cell) -> String {
        if !self.config.color || cell.text.is_empty() {
            return cell.text.clone();
        }
        let body = cell.text.trim_start();
        let lead = &cell.text[..cell.text.len() - body.len()];
        let painted = match cell.paint {
            Paint::Plain => body.normal(),
            Paint::Name { nested: false } => body.cyan(),
            Paint::Name { nested: true } => body.cyan().italic(),
            Paint::Ancestor => body.cyan().dimmed(),
            Paint::Current => body.bold(),
            Paint::Latest(style) => style.paint(body),
            Paint::Heading => body.bold(),
        };
        format!("{}{}", lead, painted)
    }
}

fn column_widths(lines: &[Line], columns: usize) -> Vec<usize> {
    let mut widths = vec![0; columns];
    for line in lines {
        if let Line::Cells(cells) = line {
            for (width, cell) in widths.iter_mut().zip(cells) {
                *width = (*width).max(cell.width());
            }
        }
    }
    widths
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Relation;
    use crate::output::RelationFilter;
    use regex::Regex;

    fn package(name: &str, relation: Relation) -> ClassifiedPackage {
        ClassifiedPackage {
            name: PackageName::new(name),
            version: "1.0.0".to_string(),
            latest: "2.0.0".to_string(),
            description: None,
            relation,
            constraint: None,
            held_back: false,
            dependents: Vec::new(),
            ancestors: Vec::new(),
            primary_ancestor: None,
        }
    }

    fn transitive(name: &str, ancestor: &str) -> ClassifiedPackage {
        ClassifiedPackage {
            dependents: vec![PackageName::new(ancestor)],
            ancestors: vec![PackageName::new(ancestor)],
            primary_ancestor: Some(PackageName::new(ancestor)),
            ..package(name, Relation::Transitive)
        }
    }

    fn requests_report() -> Report {
        Report {
            sections: vec![Section {
                group: Some("main".to_string()),
                packages: vec![
                    ClassifiedPackage {
                        version: "2.28.0".to_string(),
                        latest: "2.31.0".to_string(),
                        constraint: Some(">=2.25.0".to_string()),
                        description: Some("Python HTTP for Humans.".to_string()),
                        ..package("requests", Relation::Direct)
                    },
                    ClassifiedPackage {
                        version: "1.26.0".to_string(),
                        latest: "2.0.7".to_string(),
                        ..transitive("urllib3", "requests")
                    },
                ],
            }],
            locked: 2,
            outdated_reported: 2,
        }
    }

    fn plain(config: OutputConfig) -> TableFormatter {
        TableFormatter::new(OutputConfig {
            color: false,
            ..config
        })
    }

    fn strip_ansi(text: &str) -> String {
        Regex::new(r"\x1b\[[0-9;]*m").unwrap().replace_all(text, "").to_string()
    }

    #[test]
    fn test_render_basic_table() {
        let output = plain(OutputConfig::default()).render(&requests_report());
        let expected = "\
[group:main]
requests  2.28.0  2.31.0  >=2.25.0            Python HTTP for Humans.
urllib3   1.26.0  2.0.7             requests
";
        assert_eq!(output, expected);
    }

    #[test]
    fn test_render_with_headers() {
        let formatter = plain(OutputConfig {
            show_headers: true,
            ..OutputConfig::default()
        });
        let output = formatter.render(&requests_report());
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(
            lines[0],
            "Package   Current  Latest  Constraint  Dependents  Description"
        );
        assert!(lines[1].starts_with("--------  -------  ------  ----------"));
        assert_eq!(lines[2], "[group:main]");
    }

    #[test]
    fn test_render_without_why() {
        let formatter = plain(OutputConfig {
            why: false,
            ..OutputConfig::default()
        });
        let output = formatter.render(&requests_report());
        assert!(!output.contains(">=2.25.0"));
        assert!(output.contains("urllib3   1.26.0  2.0.7\n"));
        assert!(output.contains("requests  2.28.0  2.31.0  Python HTTP for Humans.\n"));
    }

    #[test]
    fn test_direct_and_transitive_filters_partition() {
        let report = requests_report();
        let direct = plain(OutputConfig {
            filter: RelationFilter::DirectOnly,
            ..OutputConfig::default()
        })
        .render(&report);
        let transitive = plain(OutputConfig {
            filter: RelationFilter::TransitiveOnly,
            ..OutputConfig::default()
        })
        .render(&report);

        assert!(direct.contains("requests  2.28.0"));
        assert!(!direct.contains("urllib3"));
        assert!(transitive.contains("urllib3"));
        assert!(!transitive.contains("2.28.0"));
    }

    #[test]
    fn test_ungrouped_section_has_no_title() {
        let report = Report {
            sections: vec![Section {
                group: None,
                packages: vec![package("six", Relation::Direct)],
            }],
            ..Report::default()
        };
        let output = plain(OutputConfig::default()).render(&report);
        assert_eq!(output, "six  1.0.0  2.0.0\n");
    }

    #[test]
    fn test_sections_separated_and_aligned() {
        let report = Report {
            sections: vec![
                Section {
                    group: Some("main".to_string()),
                    packages: vec![package("a", Relation::Direct)],
                },
                Section {
                    group: Some("dev".to_string()),
                    packages: vec![package("long-name", Relation::Direct)],
                },
            ],
            ..Report::default()
        };
        let output = plain(OutputConfig::default()).render(&report);
        assert_eq!(
            output,
            "[group:main]\na          1.0.0  2.0.0\n\n[group:dev]\nlong-name  1.0.0  2.0.0\n"
        );
    }

    #[test]
    fn test_group_by_ancestor() {
        let report = Report {
            sections: vec![Section {
                group: Some("main".to_string()),
                packages: vec![
                    transitive("certifi", "requests"),
                    package("orphan", Relation::Transitive),
                    package("requests", Relation::Direct),
                    transitive("sqlparse", "django"),
                    transitive("urllib3", "requests"),
                ],
            }],
            ..Report::default()
        };
        let formatter = plain(OutputConfig {
            why: false,
            group_by_ancestor: true,
            ..OutputConfig::default()
        });
        let output = formatter.render(&report);
        let expected = "\
[group:main]
requests            1.0.0  2.0.0
  certifi           1.0.0  2.0.0
  urllib3           1.0.0  2.0.0
django
  sqlparse          1.0.0  2.0.0
(unknown ancestor)
  orphan            1.0.0  2.0.0
";
        assert_eq!(output, expected);
    }

    #[test]
    fn test_group_by_ancestor_with_direct_filtered_out() {
        let formatter = plain(OutputConfig {
            why: false,
            group_by_ancestor: true,
            filter: RelationFilter::TransitiveOnly,
            ..OutputConfig::default()
        });
        let output = formatter.render(&requests_report());
        assert_eq!(output, "[group:main]\nrequests\n  urllib3  1.26.0  2.0.7\n");
    }

    #[test]
    fn test_empty_report() {
        let output = plain(OutputConfig::default()).render(&Report::default());
        assert_eq!(output, "");
    }

    #[test]
    fn test_render_is_idempotent() {
        let report = requests_report();
        let formatter = TableFormatter::new(OutputConfig {
            group_by_ancestor: true,
            show_headers: true,
            ..OutputConfig::default()
        });
        assert_eq!(formatter.render(&report), formatter.render(&report));
    }

    #[test]
    fn test_color_marks_held_back_and_keeps_layout() {
        colored::control::set_override(true);
        let mut report = requests_report();
        report.sections[0].packages[1].held_back = true;

        let colored = TableFormatter::new(OutputConfig::default()).render(&report);
        let uncolored = plain(OutputConfig::default()).render(&report);

        assert!(colored.contains("\x1b[31m2.31.0\x1b[0m"));
        assert!(colored.contains("\x1b[33m2.0.7\x1b[0m"));
        assert_eq!(strip_ansi(&colored), uncolored);
    }

    #[test]
    fn test_headers_alone_render_nothing() {
        let formatter = plain(OutputConfig {
            show_headers: true,
            ..OutputConfig::default()
        });
        assert_eq!(formatter.render(&Report::default()), "");

        let filtered = plain(OutputConfig {
            show_headers: true,
            filter: RelationFilter::DirectOnly,
            ..OutputConfig::default()
        });
        let report = Report {
            sections: vec![Section {
                group: Some("main".to_string()),
                packages: vec![transitive("urllib3", "requests")],
            }],
            ..Report::default()
        };
        assert_eq!(filtered.render(&report), "");
    }
}
