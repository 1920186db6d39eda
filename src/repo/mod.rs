pub mod source;
pub mod uri;

use crate::error::{Error, Result};
use uri::Uri;

use serde::{Deserialize, Serialize};
use tracing::debug;

use std::fmt;
use std::str::FromStr;

/// How a repository's metadata is reached and laid out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepositoryKind {
    /// Plain directory with the package index at its root.
    Dir,
    /// Package index reachable over http(s).
    Index,
    /// Open Build Service project, read through its download server.
    BuildService,
}

impl FromStr for RepositoryKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "dir" => Ok(RepositoryKind::Dir),
            "index" => Ok(RepositoryKind::Index),
            "buildservice" => Ok(RepositoryKind::BuildService),
            _ => Err(Error::UnknownRepositoryKind {
                kind: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for RepositoryKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            RepositoryKind::Dir => "dir",
            RepositoryKind::Index => "index",
            RepositoryKind::BuildService => "buildservice",
        };
        f.write_str(name)
    }
}

/// Everything needed to use one repository during resolution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryDescriptor {
    pub source: Uri,
    pub kind: RepositoryKind,
    pub alias: String,
    /// Lower values win when several repositories offer the same package.
    pub priority: u32,
}

impl RepositoryDescriptor {
    pub fn new(source: Uri, kind: RepositoryKind, alias: impl Into<String>, priority: u32) -> Self {
        RepositoryDescriptor {
            source,
            kind,
            alias: alias.into(),
            priority,
        }
    }
}

/// Ordered collection of the repositories of one resolution session.
#[derive(Clone, Debug, Default)]
pub struct RepositoryRegistry {
    descriptors: Vec<RepositoryDescriptor>,
}

impl RepositoryRegistry {
    pub fn new() -> Self {
        RepositoryRegistry::default()
    }

    /// Register a repository. Aliases are unique within a registry.
    pub fn add(&mut self, descriptor: RepositoryDescriptor) -> Result<()> {
        if self
            .descriptors
            .iter()
            .any(|d| d.alias == descriptor.alias)
        {
            return Err(Error::DuplicateAlias {
                alias: descriptor.alias,
            });
        }
        debug!(
            "registered repository {:?} ({}, priority {})",
            descriptor.alias, descriptor.source, descriptor.priority
        );
        self.descriptors.push(descriptor);
        Ok(())
    }

    /// Drop every registered repository.
    pub fn clear(&mut self) {
        self.descriptors.clear();
    }

    /// Rewrite internal build service sources to their public
    /// counterparts, keeping everything else as registered. Safe to call
    /// any number of times.
    pub fn rewrite_internal_to_external(&mut self) {
        for descriptor in &mut self.descriptors {
            if descriptor.source.is_internal_build_service() {
                let external = descriptor.source.to_external();
                debug!("rewriting {} to {}", descriptor.source, external);
                descriptor.source = external;
            }
        }
    }

    /// Registered repositories in registration order.
    pub fn descriptors(&self) -> &[RepositoryDescriptor] {
        &self.descriptors
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn build_service(alias: &str, source: &str) -> RepositoryDescriptor {
        RepositoryDescriptor::new(
            Uri::new(source),
            RepositoryKind::BuildService,
            alias,
            99,
        )
    }

    #[test]
    fn kind_from_str() {
        assert_eq!("dir".parse::<RepositoryKind>().unwrap(), RepositoryKind::Dir);
        assert_eq!(
            "index".parse::<RepositoryKind>().unwrap(),
            RepositoryKind::Index
        );
        assert_eq!(
            "buildservice".parse::<RepositoryKind>().unwrap(),
            RepositoryKind::BuildService
        );
        assert!(matches!(
            "rpm-md".parse::<RepositoryKind>(),
            Err(Error::UnknownRepositoryKind { kind }) if kind == "rpm-md"
        ));
    }

    #[test]
    fn duplicate_alias_is_rejected() {
        let mut registry = RepositoryRegistry::new();
        registry
            .add(build_service("base", "obs://Some:Project/images"))
            .unwrap();
        let err = registry
            .add(build_service("base", "obs://Other:Project/images"))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateAlias { alias } if alias == "base"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn clear_empties_the_registry() {
        let mut registry = RepositoryRegistry::new();
        registry
            .add(build_service("base", "obs://Some:Project/images"))
            .unwrap();
        registry.clear();
        assert!(registry.is_empty());
        // The alias is free again
        registry
            .add(build_service("base", "obs://Some:Project/images"))
            .unwrap();
    }

    #[test]
    fn rewrite_internal_to_external_is_idempotent() {
        let mut registry = RepositoryRegistry::new();
        registry
            .add(build_service("internal", "ibs://SUSE:SLE-15/standard"))
            .unwrap();
        registry
            .add(build_service("public", "obs://Some:Project/images"))
            .unwrap();

        registry.rewrite_internal_to_external();
        let after_once: Vec<String> = registry
            .descriptors()
            .iter()
            .map(|d| d.source.as_str().to_string())
            .collect();
        assert_eq!(
            after_once,
            vec!["obs://SUSE:SLE-15/standard", "obs://Some:Project/images"]
        );

        registry.rewrite_internal_to_external();
        let after_twice: Vec<String> = registry
            .descriptors()
            .iter()
            .map(|d| d.source.as_str().to_string())
            .collect();
        assert_eq!(after_once, after_twice);

        // Kind and alias survive the rewrite
        assert_eq!(registry.descriptors()[0].kind, RepositoryKind::BuildService);
        assert_eq!(registry.descriptors()[0].alias, "internal");
    }
}
