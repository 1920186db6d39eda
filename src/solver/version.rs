use anyhow::{bail, format_err, Result};
use lazy_static::lazy_static;
use regex::Regex;

use std::cmp::Ordering;
use std::fmt;

lazy_static! {
    static ref EVR_CHARS: Regex = Regex::new(r"^[A-Za-z0-9.+~_:-]+$").unwrap();
}

/// rpm style `epoch:version-release` with tilde segments ordered before release.
///
/// The release part is split off at the last hyphen. Two versions compare
/// equal whenever the rpm segment walk ranks them equal, even if they were
/// written differently (`1.001` and `1.1`, or an explicit `0:` epoch).
#[derive(Clone, Debug)]
pub struct PackageVersion {
    epoch: u64,
    version: String,
    release: Option<String>,
    raw: String,
}

impl PackageVersion {
    pub fn parse(s: &str) -> Result<Self> {
        if !EVR_CHARS.is_match(s) {
            bail!("malformed version string: {:?}", s);
        }
        let (epoch, rest) = match s.split_once(':') {
            Some((e, rest)) => {
                let epoch = e
                    .parse()
                    .map_err(|_| format_err!("malformed epoch in {:?}", s))?;
                (epoch, rest)
            }
            None => (0, s),
        };
        if rest.contains(':') {
            bail!("malformed version string: {:?}", s);
        }
        let (version, release) = match rest.rsplit_once('-') {
            Some((v, r)) => (v.to_string(), Some(r.to_string())),
            None => (rest.to_string(), None),
        };
        if version.is_empty() {
            bail!("empty version segment in {:?}", s);
        }
        if matches!(&release, Some(r) if r.is_empty()) {
            bail!("empty release segment in {:?}", s);
        }
        Ok(PackageVersion {
            epoch,
            version,
            release,
            raw: s.to_string(),
        })
    }
}

impl fmt::Display for PackageVersion {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl PartialEq for PackageVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PackageVersion {}

impl PartialOrd for PackageVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PackageVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.epoch
            .cmp(&other.epoch)
            .then_with(|| rpmvercmp(&self.version, &other.version))
            .then_with(|| {
                let a = self.release.as_deref().unwrap_or("");
                let b = other.release.as_deref().unwrap_or("");
                rpmvercmp(a, b)
            })
    }
}

/// The rpm segment walk: alternating digit and alpha runs, numeric runs
/// compared by magnitude, tilde sorting before everything including the
/// end of the string.
fn rpmvercmp(a: &str, b: &str) -> Ordering {
    let a = a.as_bytes();
    let b = b.as_bytes();
    let (mut i, mut j) = (0, 0);

    while i < a.len() || j < b.len() {
        // Everything that is not alphanumeric or tilde only separates segments
        while i < a.len() && !a[i].is_ascii_alphanumeric() && a[i] != b'~' {
            i += 1;
        }
        while j < b.len() && !b[j].is_ascii_alphanumeric() && b[j] != b'~' {
            j += 1;
        }

        let tilde_a = i < a.len() && a[i] == b'~';
        let tilde_b = j < b.len() && b[j] == b'~';
        match (tilde_a, tilde_b) {
            (true, true) => {
                i += 1;
                j += 1;
                continue;
            }
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            (false, false) => (),
        }

        if i >= a.len() || j >= b.len() {
            break;
        }

        let (start_a, start_b) = (i, j);
        let numeric = a[i].is_ascii_digit();
        if numeric {
            while i < a.len() && a[i].is_ascii_digit() {
                i += 1;
            }
            while j < b.len() && b[j].is_ascii_digit() {
                j += 1;
            }
        } else {
            while i < a.len() && a[i].is_ascii_alphabetic() {
                i += 1;
            }
            while j < b.len() && b[j].is_ascii_alphabetic() {
                j += 1;
            }
        }

        let seg_a = &a[start_a..i];
        let seg_b = &b[start_b..j];
        if seg_b.is_empty() {
            // Segment types differ, a numeric segment outranks an alpha one
            return if numeric {
                Ordering::Greater
            } else {
                Ordering::Less
            };
        }
        let order = if numeric {
            let seg_a = strip_leading_zeros(seg_a);
            let seg_b = strip_leading_zeros(seg_b);
            seg_a.len().cmp(&seg_b.len()).then_with(|| seg_a.cmp(seg_b))
        } else {
            seg_a.cmp(seg_b)
        };
        if order != Ordering::Equal {
            return order;
        }
    }

    // Shared segments are equal, whoever has more left is newer
    match (i < a.len(), j < b.len()) {
        (false, false) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (true, true) => unreachable!("segment walk left both sides unfinished"),
    }
}

fn strip_leading_zeros(s: &[u8]) -> &[u8] {
    let mut k = 0;
    while k < s.len() && s[k] == b'0' {
        k += 1;
    }
    &s[k..]
}

/// A single relation against a package version, as written in dependency
/// fields: `any`, or an operator with a version like `>= 2.31-4`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VersionConstraint {
    Any,
    Less(PackageVersion),
    LessEq(PackageVersion),
    Exact(PackageVersion),
    GreaterEq(PackageVersion),
    Greater(PackageVersion),
}

impl VersionConstraint {
    pub fn parse(s: &str) -> Result<Self> {
        lazy_static! {
            static ref CONSTRAINT: Regex =
                Regex::new(r"^(?P<op>[<>=]{1,2}) ?(?P<ver>[A-Za-z0-9.+~_:-]+)$").unwrap();
        }

        if s == "any" {
            return Ok(VersionConstraint::Any);
        }

        let segments = CONSTRAINT
            .captures(s)
            .ok_or_else(|| format_err!("malformed version constraint: {:?}", s))?;
        let op = segments.name("op").unwrap().as_str();
        let ver = PackageVersion::parse(segments.name("ver").unwrap().as_str())?;
        let constraint = match op {
            "<" => VersionConstraint::Less(ver),
            "<=" => VersionConstraint::LessEq(ver),
            "=" | "==" => VersionConstraint::Exact(ver),
            ">=" => VersionConstraint::GreaterEq(ver),
            ">" => VersionConstraint::Greater(ver),
            _ => bail!("unknown version relation: {:?}", op),
        };
        Ok(constraint)
    }

    pub fn satisfies(&self, ver: &PackageVersion) -> bool {
        match self {
            VersionConstraint::Any => true,
            VersionConstraint::Less(v) => ver < v,
            VersionConstraint::LessEq(v) => ver <= v,
            VersionConstraint::Exact(v) => ver == v,
            VersionConstraint::GreaterEq(v) => ver >= v,
            VersionConstraint::Greater(v) => ver > v,
        }
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            VersionConstraint::Any => write!(f, "any"),
            VersionConstraint::Less(v) => write!(f, "< {v}"),
            VersionConstraint::LessEq(v) => write!(f, "<= {v}"),
            VersionConstraint::Exact(v) => write!(f, "= {v}"),
            VersionConstraint::GreaterEq(v) => write!(f, ">= {v}"),
            VersionConstraint::Greater(v) => write!(f, "> {v}"),
        }
    }
}
