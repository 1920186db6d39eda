mod index;

use super::{RepositoryDescriptor, RepositoryKind};
use crate::error::{Error, Result};
use crate::solver::types::PackageMeta;

use anyhow::{bail, Context};
use tracing::debug;

use std::fs;
use std::path::Path;
use std::time::Duration;

/// File name of the package index inside a repository.
const INDEX_NAME: &str = "Packages";
/// How long a metadata fetch may take before it is aborted.
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Load the package index of a repository.
///
/// Any failure along the way is reported as a metadata error naming the
/// repository, so one broken repository aborts the whole resolution
/// instead of silently shrinking the candidate set.
pub fn load_packages(descriptor: &RepositoryDescriptor) -> Result<Vec<PackageMeta>> {
    read_and_parse(descriptor).map_err(|e| Error::RepositoryMetadata {
        alias: descriptor.alias.clone(),
        uri: descriptor.source.as_str().to_string(),
        source: e,
    })
}

fn read_and_parse(descriptor: &RepositoryDescriptor) -> anyhow::Result<Vec<PackageMeta>> {
    let data = read_index(descriptor)?;
    index::parse_index(&data)
}

fn read_index(descriptor: &RepositoryDescriptor) -> anyhow::Result<String> {
    let base = descriptor.source.translate()?;
    debug!(
        "loading package index for {} from {}",
        descriptor.alias, base
    );
    match descriptor.kind {
        RepositoryKind::Dir => {
            if is_remote_base(&base) {
                bail!("dir repository must point into the local filesystem");
            }
            read_local(&base)
        }
        RepositoryKind::Index | RepositoryKind::BuildService => {
            if base.starts_with("http://") || base.starts_with("https://") {
                fetch_remote(&base)
            } else if base.starts_with("ftp://") {
                bail!("ftp sources cannot be fetched, mirror the repository locally");
            } else {
                read_local(&base)
            }
        }
    }
}

fn is_remote_base(base: &str) -> bool {
    base.starts_with("http://") || base.starts_with("https://") || base.starts_with("ftp://")
}

fn read_local(base: &str) -> anyhow::Result<String> {
    let path = Path::new(base).join(INDEX_NAME);
    fs::read_to_string(&path).with_context(|| format!("failed to read {}", path.display()))
}

fn fetch_remote(base: &str) -> anyhow::Result<String> {
    let url = format!("{}/{}", base.trim_end_matches('/'), INDEX_NAME);
    let client = reqwest::blocking::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .build()?;
    let response = client.get(&url).send()?;
    if !response.status().is_success() {
        bail!("{} answered {}", url, response.status());
    }
    Ok(response.text()?)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::repo::uri::Uri;

    #[test]
    fn loads_a_dir_repository() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(INDEX_NAME),
            "Package: a\nVersion: 1.0\nFilename: a-1.0.noarch.rpm\n",
        )
        .unwrap();
        let descriptor = RepositoryDescriptor::new(
            Uri::new(dir.path().to_str().unwrap()),
            RepositoryKind::Dir,
            "local",
            90,
        );
        let packages = load_packages(&descriptor).unwrap();
        assert_eq!(packages.len(), 1);
        assert_eq!(packages[0].name, "a");
    }

    #[test]
    fn missing_index_names_the_repository() {
        let dir = tempfile::tempdir().unwrap();
        let descriptor = RepositoryDescriptor::new(
            Uri::new(dir.path().to_str().unwrap()),
            RepositoryKind::Dir,
            "empty",
            90,
        );
        let e = load_packages(&descriptor).unwrap_err();
        assert!(matches!(e, Error::RepositoryMetadata { ref alias, .. } if alias == "empty"));
    }

    #[test]
    fn dir_repository_rejects_remote_sources() {
        let descriptor = RepositoryDescriptor::new(
            Uri::new("http://example.com/repo"),
            RepositoryKind::Dir,
            "remote",
            90,
        );
        assert!(load_packages(&descriptor).is_err());
    }
}
