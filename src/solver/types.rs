use super::version::{PackageVersion, VersionConstraint};

use serde::Serialize;

/// Package metadata as read from a repository index.
#[derive(Clone, Debug)]
pub struct PackageMeta {
    pub name: String,
    pub version: PackageVersion,
    pub arch: String,
    /// Unpacked size in bytes.
    pub install_size: u64,
    pub depends: Vec<(String, VersionConstraint)>,
    pub conflicts: Vec<(String, VersionConstraint)>,
    /// Package file path relative to the repository root.
    pub location: String,
}

/// One entry of a resolution result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ResolvedPackage {
    pub name: String,
    /// Full download location of the package file.
    pub uri: String,
    pub installsize_bytes: u64,
    pub arch: String,
    pub version: String,
    /// Alias of the repository the package resolves from.
    pub repository: String,
}
