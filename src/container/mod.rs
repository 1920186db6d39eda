use crate::error::{Error, Result};

use tracing::debug;

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Container name used when the caller does not pass one.
const DEFAULT_CONTAINER_NAME: &str = "systemContainer";

/// Supported container image backends.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ContainerKind {
    Docker,
    Oci,
}

impl FromStr for ContainerKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "docker" => Ok(ContainerKind::Docker),
            "oci" => Ok(ContainerKind::Oci),
            _ => Err(Error::UnsupportedContainerKind {
                kind: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ContainerKind::Docker => write!(f, "docker"),
            ContainerKind::Oci => write!(f, "oci"),
        }
    }
}

/// Setup handle for one container backend.
///
/// Resolving the backend by name happens here; what to do with the
/// handle is up to the image builder. Unknown kind strings are rejected
/// instead of falling back to a default backend.
#[derive(Clone, Debug)]
pub struct ContainerSetup {
    kind: ContainerKind,
    root_dir: PathBuf,
    custom_args: HashMap<String, String>,
}

impl ContainerSetup {
    pub fn new(
        kind: &str,
        root_dir: impl Into<PathBuf>,
        custom_args: Option<HashMap<String, String>>,
    ) -> Result<ContainerSetup> {
        match ContainerKind::from_str(kind)? {
            ContainerKind::Docker => Ok(Self::docker(root_dir, custom_args)),
            ContainerKind::Oci => Ok(Self::oci(root_dir, custom_args)),
        }
    }

    pub fn docker(
        root_dir: impl Into<PathBuf>,
        custom_args: Option<HashMap<String, String>>,
    ) -> ContainerSetup {
        Self::with_kind(ContainerKind::Docker, root_dir, custom_args)
    }

    pub fn oci(
        root_dir: impl Into<PathBuf>,
        custom_args: Option<HashMap<String, String>>,
    ) -> ContainerSetup {
        Self::with_kind(ContainerKind::Oci, root_dir, custom_args)
    }

    fn with_kind(
        kind: ContainerKind,
        root_dir: impl Into<PathBuf>,
        custom_args: Option<HashMap<String, String>>,
    ) -> ContainerSetup {
        let root_dir = root_dir.into();
        debug!("setting up {} container in {}", kind, root_dir.display());
        ContainerSetup {
            kind,
            root_dir,
            custom_args: custom_args.unwrap_or_default(),
        }
    }

    pub fn kind(&self) -> ContainerKind {
        self.kind
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Name of the container to create, either the `container_name`
    /// custom argument or the built-in default.
    pub fn container_name(&self) -> &str {
        self.custom_args
            .get("container_name")
            .map(|s| s.as_str())
            .unwrap_or(DEFAULT_CONTAINER_NAME)
    }

    pub fn custom_args(&self) -> &HashMap<String, String> {
        &self.custom_args
    }
}
