//! Core domain models for uv-outdated
//!
//! This module contains the fundamental types used throughout the application:
//! - Canonical package names
//! - PEP 440 versions and specifier sets
//! - PEP 508 requirement strings
//! - Locked package and source structures

mod name;
mod package;
mod requirement;
mod specifier;
mod version;

pub use name::PackageName;
pub use package::{LockedDependency, LockedPackage, PackageSource};
pub use requirement::Requirement;
pub use specifier::{holds_back, Operator, Specifier, SpecifierSet};
pub use version::{PreRelease, Version};
