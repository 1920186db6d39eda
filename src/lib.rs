//! SAT-based package resolution core for system image builders.
//!
//! Takes a set of requested package names plus a registry of package
//! repositories and computes the complete installation set, with every
//! dependency pinned to one concrete package. The surrounding image
//! builder stays in charge of everything else: parsing the image
//! description, downloading packages and assembling the image.
//!
//! # Components
//!
//! - Repository registry: ordered descriptors with source, kind, alias
//!   and priority
//! - Solver adapter: boolean encoding of candidates, dependencies and
//!   conflicts on top of a SAT engine
//! - Resolution classifier: tells requested packages apart from
//!   packages pulled in by the solver
//! - Container dispatcher: maps a backend kind string to a setup
//!   handle, rejecting unknown kinds

pub mod container;
pub mod error;
pub mod repo;
pub mod report;
pub mod solver;

pub use container::{ContainerKind, ContainerSetup};
pub use error::{DependencyProblem, Error, Result};
pub use repo::uri::Uri;
pub use repo::{RepositoryDescriptor, RepositoryKind, RepositoryRegistry};
pub use report::{classify, PackageReport, PackageStatus};
pub use solver::types::ResolvedPackage;
pub use solver::version::{PackageVersion, VersionConstraint};
pub use solver::Sat;
