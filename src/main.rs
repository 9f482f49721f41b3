//! uv-outdated - outdated package report for uv projects
//!
//! Reads uv.lock and pyproject.toml, asks uv which packages are outdated and
//! prints them grouped by dependency group.

use clap::Parser;
use std::io::{self, IsTerminal, Write};
use std::process::ExitCode;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uv_outdated::cli::CliArgs;
use uv_outdated::orchestrator::Orchestrator;
use uv_outdated::output::{TableFormatter, Verbosity};

/// Environment variable overriding the log filter
const LOG_ENV: &str = "UV_OUTDATED_LOG";

fn main() -> ExitCode {
    let args = CliArgs::parse();
    init_logging(&args);

    // Run the main logic and handle errors
    match run(args) {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(args: &CliArgs) {
    let level = if args.verbosity() == Verbosity::Verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .with_env_var(LOG_ENV)
        .from_env_lossy();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_ansi(!args.no_color && io::stderr().is_terminal())
        .without_time()
        .try_init();
}

/// Main application logic
fn run(args: CliArgs) -> anyhow::Result<ExitCode> {
    tracing::debug!(
        "uv-outdated v{} in {}",
        env!("CARGO_PKG_VERSION"),
        args.project.display()
    );

    let report = Orchestrator::new(&args).run()?;

    let color = args.use_color();
    colored::control::set_override(color);
    let config = args.output_config(color);
    let verbosity = config.verbosity;
    let formatter = TableFormatter::new(config);

    let mut stdout = io::stdout().lock();
    let table = formatter.render(&report);
    if table.is_empty() {
        writeln!(stdout, "No outdated packages found.")?;
        if verbosity != Verbosity::Quiet {
            writeln!(stdout, "Total packages in uv.lock: {}", report.locked)?;
            writeln!(
                stdout,
                "Checked {} packages for updates",
                report.outdated_reported
            )?;
        }
    } else {
        stdout.write_all(table.as_bytes())?;
    }
    stdout.flush()?;

    Ok(ExitCode::SUCCESS)
}
