//! Invocation of the `uv` executable
//!
//! Every call runs in the project directory with `VIRTUAL_ENV` removed, so uv
//! resolves the project's own `.venv` instead of whatever shell environment
//! happens to be active.

use crate::error::ExternalToolError;
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Default executable name
pub const DEFAULT_UV: &str = "uv";

/// Handle to a uv executable
#[derive(Debug, Clone)]
pub struct Uv {
    program: String,
}

impl Default for Uv {
    fn default() -> Self {
        Self::new(DEFAULT_UV)
    }
}

impl Uv {
    /// Create a handle for the given executable name or path
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Returns the executable name or path
    pub fn program(&self) -> &str {
        &self.program
    }

    fn display_command(&self, args: &[&str]) -> String {
        std::iter::once(self.program.as_str())
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Run uv and return its standard output
    pub fn run(&self, args: &[&str], working_dir: &Path) -> Result<String, ExternalToolError> {
        let command = self.display_command(args);
        debug!("running `{}` in {}", command, working_dir.display());

        let output = Command::new(&self.program)
            .args(args)
            .current_dir(working_dir)
            .env_remove("VIRTUAL_ENV")
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ExternalToolError::NotFound {
                        program: self.program.clone(),
                    }
                } else {
                    ExternalToolError::SpawnError {
                        command: command.clone(),
                        source: e,
                    }
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(ExternalToolError::failed(
                command,
                output.status.to_string(),
                stderr,
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}
