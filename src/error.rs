use thiserror::Error;

use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures surfaced by the resolution core.
#[derive(Error, Debug)]
pub enum Error {
    #[error("repository alias {alias:?} is already registered")]
    DuplicateAlias { alias: String },

    #[error("no repositories configured, cannot resolve packages")]
    NoRepositoriesConfigured,

    #[error("failed to load metadata for repository {alias:?} from {uri}: {source}")]
    RepositoryMetadata {
        alias: String,
        uri: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("cannot satisfy package request: {}", join_problems(.problems))]
    UnresolvableDependency { problems: Vec<DependencyProblem> },

    #[error("unsupported container kind {kind:?}")]
    UnsupportedContainerKind { kind: String },

    #[error("unknown repository kind {kind:?}")]
    UnknownRepositoryKind { kind: String },

    #[error("malformed repository uri {uri:?}: {reason}")]
    MalformedUri { uri: String, reason: String },
}

/// One reason a package request could not be satisfied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DependencyProblem {
    /// No repository offers a package with this name.
    Missing { package: String },
    /// The package participates in a clause set that cannot hold together.
    Conflicting { package: String, version: String },
}

impl fmt::Display for DependencyProblem {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DependencyProblem::Missing { package } => {
                write!(f, "{package} (not available in any repository)")
            }
            DependencyProblem::Conflicting { package, version } => {
                write!(f, "{package} ({version})")
            }
        }
    }
}

fn join_problems(problems: &[DependencyProblem]) -> String {
    problems
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn unresolvable_message_lists_every_problem() {
        let err = Error::UnresolvableDependency {
            problems: vec![
                DependencyProblem::Missing {
                    package: "plymouth".to_string(),
                },
                DependencyProblem::Conflicting {
                    package: "systemd".to_string(),
                    version: "249.11-1".to_string(),
                },
            ],
        };
        let msg = err.to_string();
        assert!(msg.contains("plymouth (not available in any repository)"));
        assert!(msg.contains("systemd (249.11-1)"));
    }
}
