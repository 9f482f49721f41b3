//! Application error types using thiserror
//!
//! Error hierarchy:
//! - LockfileError: uv.lock missing or malformed (fatal)
//! - ManifestError: pyproject.toml unreadable or malformed (fatal when present)
//! - ExternalToolError: the outdated-check command failed (fatal)
//! - MetadataError: installed package metadata unavailable (non-fatal)
//! - VersionError: invalid version, specifier or requirement strings

use std::path::PathBuf;
use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Lockfile related errors
    #[error(transparent)]
    Lockfile(#[from] LockfileError),

    /// Manifest related errors
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// External command related errors
    #[error(transparent)]
    ExternalTool(#[from] ExternalToolError),
}

/// Errors related to reading uv.lock
#[derive(Error, Debug)]
pub enum LockfileError {
    /// Lockfile not found
    #[error("lockfile not found: {path}")]
    NotFound { path: PathBuf },

    /// Failed to read lockfile
    #[error("failed to read lockfile {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML parsing error
    #[error("failed to parse {path}: {message}")]
    ParseError { path: PathBuf, message: String },
}

/// Errors related to reading pyproject.toml
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Failed to read manifest file
    #[error("failed to read manifest file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML parsing error
    #[error("failed to parse TOML in {path}: {message}")]
    TomlParseError { path: PathBuf, message: String },

    /// A dependency string that is not a valid requirement
    #[error("invalid requirement '{requirement}' in {path}: {message}")]
    InvalidRequirement {
        path: PathBuf,
        requirement: String,
        message: String,
    },

    /// A dependency group includes a group that does not exist, or itself
    #[error("invalid include-group '{group}' in {path}")]
    InvalidInclude { path: PathBuf, group: String },
}

/// Errors related to running the external package manager
#[derive(Error, Debug)]
pub enum ExternalToolError {
    /// Executable not found on PATH
    #[error("'{program}' not found; install uv or pass --uv <PATH>")]
    NotFound { program: String },

    /// Failed to spawn the command
    #[error("failed to run '{command}': {source}")]
    SpawnError {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The command exited unsuccessfully
    #[error("'{command}' exited with {status}: {stderr}")]
    Failed {
        command: String,
        status: String,
        stderr: String,
    },

    /// The command output could not be understood
    #[error("unexpected output from '{command}': {message}")]
    InvalidOutput { command: String, message: String },
}

/// Errors raised while looking up installed package metadata
///
/// These never abort the program; descriptions are left blank instead.
#[derive(Error, Debug)]
pub enum MetadataError {
    /// No Python interpreter could be located for the project
    #[error("could not locate the project interpreter: {message}")]
    InterpreterNotFound { message: String },

    /// The interpreter was found but site-packages was not
    #[error("could not find site-packages under {path}")]
    SitePackagesNotFound { path: PathBuf },

    /// Failed to read metadata files
    #[error("failed to read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from parsing PEP 440 / PEP 508 strings
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    /// Not a PEP 440 version
    #[error("invalid version '{0}'")]
    InvalidVersion(String),

    /// Not a PEP 440 specifier
    #[error("invalid specifier '{spec}': {message}")]
    InvalidSpecifier { spec: String, message: String },

    /// Not a PEP 508 requirement
    #[error("invalid requirement '{0}'")]
    InvalidRequirement(String),
}

impl LockfileError {
    /// Creates a new NotFound error
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        LockfileError::NotFound { path: path.into() }
    }

    /// Creates a new ReadError
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LockfileError::ReadError {
            path: path.into(),
            source,
        }
    }

    /// Creates a new ParseError
    pub fn parse_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        LockfileError::ParseError {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl ManifestError {
    /// Creates a new ReadError
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ManifestError::ReadError {
            path: path.into(),
            source,
        }
    }

    /// Creates a new TomlParseError
    pub fn toml_parse_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ManifestError::TomlParseError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new InvalidRequirement error
    pub fn invalid_requirement(
        path: impl Into<PathBuf>,
        requirement: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        ManifestError::InvalidRequirement {
            path: path.into(),
            requirement: requirement.into(),
            message: message.into(),
        }
    }
}

impl ExternalToolError {
    /// Creates a new Failed error
    pub fn failed(
        command: impl Into<String>,
        status: impl Into<String>,
        stderr: impl Into<String>,
    ) -> Self {
        ExternalToolError::Failed {
            command: command.into(),
            status: status.into(),
            stderr: stderr.into(),
        }
    }

    /// Creates a new InvalidOutput error
    pub fn invalid_output(command: impl Into<String>, message: impl Into<String>) -> Self {
        ExternalToolError::InvalidOutput {
            command: command.into(),
            message: message.into(),
        }
    }
}
