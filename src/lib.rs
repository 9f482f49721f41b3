//! uv-outdated - outdated package report library
//!
//! This library provides the pieces behind the `uv-outdated` binary:
//! - Python packaging primitives (names, versions, specifiers, requirements)
//! - uv.lock and pyproject.toml parsing
//! - Outdated-version and description sources backed by uv
//! - Dependency graph classification and table rendering

pub mod cli;
pub mod domain;
pub mod error;
pub mod graph;
pub mod lockfile;
pub mod manifest;
pub mod metadata;
pub mod orchestrator;
pub mod outdated;
pub mod output;
pub mod progress;
pub mod uv;
