use crate::error::{Error, Result};

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use std::fmt;

lazy_static! {
    static ref SCHEME: Regex = Regex::new(r"^(?P<scheme>[a-z][a-z0-9+]*)://(?P<rest>.*)$").unwrap();
}

const OBS_DOWNLOAD_SERVER: &str = "http://download.opensuse.org/repositories";
const IBS_DOWNLOAD_SERVER: &str = "http://download.suse.de/ibs";

/// Repository location in any of the supported notations.
///
/// Plain paths, `dir://` and `file://` point into the local filesystem,
/// `http(s)://` and `ftp://` are used as written, and the build service
/// forms `obs://project/repo` (public) and `ibs://project/repo` (internal)
/// translate to their download servers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Uri {
    raw: String,
}

impl Uri {
    pub fn new(raw: impl Into<String>) -> Self {
        Uri { raw: raw.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn scheme(&self) -> Option<&str> {
        self.split().map(|(scheme, _)| scheme)
    }

    pub fn is_remote(&self) -> bool {
        matches!(
            self.scheme(),
            Some("http" | "https" | "ftp" | "obs" | "ibs")
        )
    }

    pub fn is_internal_build_service(&self) -> bool {
        self.scheme() == Some("ibs")
    }

    pub fn is_external_build_service(&self) -> bool {
        self.scheme() == Some("obs")
    }

    /// Rewrite an internal build service location to its public
    /// counterpart. Anything else passes through unchanged, so applying
    /// this twice is the same as applying it once.
    pub fn to_external(&self) -> Uri {
        match self.raw.strip_prefix("ibs://") {
            Some(rest) => Uri::new(format!("obs://{rest}")),
            None => self.clone(),
        }
    }

    /// The concrete location metadata can be read from: a filesystem path
    /// or an http(s) base URL. Build service forms map onto their download
    /// servers, with colons in the project name doubling as path
    /// separators.
    pub fn translate(&self) -> Result<String> {
        let (scheme, rest) = match self.split() {
            Some(parts) => parts,
            // A plain path counts as a local directory
            None => return Ok(self.raw.clone()),
        };
        match scheme {
            "dir" | "file" => Ok(rest.to_string()),
            "http" | "https" | "ftp" => Ok(self.raw.clone()),
            "obs" => self.build_service_link(OBS_DOWNLOAD_SERVER, rest),
            "ibs" => self.build_service_link(IBS_DOWNLOAD_SERVER, rest),
            other => Err(Error::MalformedUri {
                uri: self.raw.clone(),
                reason: format!("unknown uri scheme {other:?}"),
            }),
        }
    }

    fn build_service_link(&self, server: &str, rest: &str) -> Result<String> {
        let (project, repo) = rest.split_once('/').ok_or_else(|| Error::MalformedUri {
            uri: self.raw.clone(),
            reason: "expected project/repository".to_string(),
        })?;
        if project.is_empty() || repo.is_empty() {
            return Err(Error::MalformedUri {
                uri: self.raw.clone(),
                reason: "expected project/repository".to_string(),
            });
        }
        Ok(format!("{}/{}/{}", server, project.replace(':', ":/"), repo))
    }

    fn split(&self) -> Option<(&str, &str)> {
        SCHEME.captures(&self.raw).map(|c| {
            (
                c.name("scheme").unwrap().as_str(),
                c.name("rest").unwrap().as_str(),
            )
        })
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
