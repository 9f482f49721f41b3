//! CLI argument parsing module for uv-outdated

use crate::output::{OutputConfig, RelationFilter, Verbosity};
use crate::uv::DEFAULT_UV;
use clap::Parser;
use std::io::IsTerminal;
use std::path::PathBuf;

/// Show outdated packages of a uv project
#[derive(Parser, Debug, Clone)]
#[command(
    name = "uv-outdated",
    version,
    about = "Show outdated packages of a uv project, grouped by dependency group"
)]
pub struct CliArgs {
    // Table options
    /// Show table headers
    #[arg(long, overrides_with = "no_headers")]
    pub show_headers: bool,

    /// Hide table headers (default)
    #[arg(long, overrides_with = "show_headers")]
    pub no_headers: bool,

    /// Show the Constraint and Dependents columns (default)
    #[arg(long, overrides_with = "no_why")]
    pub why: bool,

    /// Hide the Constraint and Dependents columns
    #[arg(long, overrides_with = "why")]
    pub no_why: bool,

    // Row filters
    /// Only show packages declared in a dependency group
    #[arg(long, overrides_with_all = ["transitive", "all"])]
    pub direct: bool,

    /// Only show packages pulled in through another package
    #[arg(long, overrides_with_all = ["direct", "all"])]
    pub transitive: bool,

    /// Show direct and transitive packages (default)
    #[arg(long, overrides_with_all = ["direct", "transitive"])]
    pub all: bool,

    /// Nest transitive packages under the declared package that pulls them in
    #[arg(long)]
    pub group_by_ancestor: bool,

    // General options
    /// Project directory containing uv.lock and pyproject.toml
    #[arg(long, default_value = ".")]
    pub project: PathBuf,

    /// uv executable to run
    #[arg(long, env = "UV_OUTDATED_UV", default_value = DEFAULT_UV)]
    pub uv: String,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable verbose output (debug logging on stderr)
    #[arg(short, long)]
    pub verbose: bool,

    /// Enable quiet mode - table only
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl CliArgs {
    /// Resolve `--direct` / `--transitive` / `--all`
    pub fn relation_filter(&self) -> RelationFilter {
        if self.direct {
            RelationFilter::DirectOnly
        } else if self.transitive {
            RelationFilter::TransitiveOnly
        } else {
            RelationFilter::All
        }
    }

    /// Resolve `--show-headers` / `--no-headers`
    pub fn headers(&self) -> bool {
        self.show_headers
    }

    /// Resolve `--why` / `--no-why`
    pub fn show_why(&self) -> bool {
        !self.no_why
    }

    /// Get the verbosity level
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else if self.verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        }
    }

    /// Check if colored output should be used
    pub fn use_color(&self) -> bool {
        !self.no_color
            && std::env::var_os("NO_COLOR").is_none()
            && std::io::stdout().is_terminal()
    }

    /// Build the renderer configuration
    pub fn output_config(&self, color: bool) -> OutputConfig {
        OutputConfig {
            show_headers: self.headers(),
            why: self.show_why(),
            filter: self.relation_filter(),
            group_by_ancestor: self.group_by_ancestor,
            color,
            verbosity: self.verbosity(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_args() {
        let args = CliArgs::parse_from(["uv-outdated"]);
        assert_eq!(args.project, PathBuf::from("."));
        assert!(!args.headers());
        assert!(args.show_why());
        assert_eq!(args.relation_filter(), RelationFilter::All);
        assert!(!args.group_by_ancestor);
        assert!(!args.no_color);
        assert!(!args.verbose);
        assert!(!args.quiet);
        assert_eq!(args.verbosity(), Verbosity::Normal);
    }

    #[test]
    fn test_project_option() {
        let args = CliArgs::parse_from(["uv-outdated", "--project", "/some/path"]);
        assert_eq!(args.project, PathBuf::from("/some/path"));
    }

    #[test]
    fn test_uv_option() {
        let args = CliArgs::parse_from(["uv-outdated", "--uv", "/opt/bin/uv"]);
        assert_eq!(args.uv, "/opt/bin/uv");
    }

    #[test]
    fn test_headers_last_one_wins() {
        let args = CliArgs::parse_from(["uv-outdated", "--show-headers"]);
        assert!(args.headers());

        let args = CliArgs::parse_from(["uv-outdated", "--show-headers", "--no-headers"]);
        assert!(!args.headers());

        let args = CliArgs::parse_from(["uv-outdated", "--no-headers", "--show-headers"]);
        assert!(args.headers());
    }

    #[test]
    fn test_why_last_one_wins() {
        let args = CliArgs::parse_from(["uv-outdated", "--no-why"]);
        assert!(!args.show_why());

        let args = CliArgs::parse_from(["uv-outdated", "--no-why", "--why"]);
        assert!(args.show_why());

        let args = CliArgs::parse_from(["uv-outdated", "--why", "--no-why"]);
        assert!(!args.show_why());
    }

    #[test]
    fn test_relation_filters() {
        let args = CliArgs::parse_from(["uv-outdated", "--direct"]);
        assert_eq!(args.relation_filter(), RelationFilter::DirectOnly);

        let args = CliArgs::parse_from(["uv-outdated", "--transitive"]);
        assert_eq!(args.relation_filter(), RelationFilter::TransitiveOnly);

        let args = CliArgs::parse_from(["uv-outdated", "--direct", "--transitive"]);
        assert_eq!(args.relation_filter(), RelationFilter::TransitiveOnly);

        let args = CliArgs::parse_from(["uv-outdated", "--transitive", "--all"]);
        assert_eq!(args.relation_filter(), RelationFilter::All);

        let args = CliArgs::parse_from(["uv-outdated", "--all", "--direct"]);
        assert_eq!(args.relation_filter(), RelationFilter::DirectOnly);
    }

    #[test]
    fn test_verbosity() {
        let args = CliArgs::parse_from(["uv-outdated", "-v"]);
        assert_eq!(args.verbosity(), Verbosity::Verbose);

        let args = CliArgs::parse_from(["uv-outdated", "-q"]);
        assert_eq!(args.verbosity(), Verbosity::Quiet);

        assert!(CliArgs::try_parse_from(["uv-outdated", "-q", "-v"]).is_err());
    }

    #[test]
    fn test_no_color() {
        let args = CliArgs::parse_from(["uv-outdated", "--no-color"]);
        assert!(!args.use_color());
    }

    #[test]
    fn test_output_config() {
        let args = CliArgs::parse_from([
            "uv-outdated",
            "--show-headers",
            "--no-why",
            "--direct",
            "--group-by-ancestor",
        ]);
        let config = args.output_config(false);
        assert_eq!(
            config,
            OutputConfig {
                show_headers: true,
                why: false,
                filter: RelationFilter::DirectOnly,
                group_by_ancestor: true,
                color: false,
                verbosity: Verbosity::Normal,
            }
        );
    }
}
