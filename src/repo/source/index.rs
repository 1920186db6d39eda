use crate::solver::types::PackageMeta;
use crate::solver::version::{PackageVersion, VersionConstraint};

use anyhow::{format_err, Context, Result};
use lazy_static::lazy_static;
use regex::Regex;

use std::collections::HashMap;

/// Parse a control style package index into package metadata.
///
/// Every paragraph describes one package. `Package`, `Version` and
/// `Filename` are required, the rest falls back to a default.
/// `Installed-Size` counts bytes.
pub fn parse_index(data: &str) -> Result<Vec<PackageMeta>> {
    let paragraphs = match debcontrol::parse_str(data) {
        Ok(p) => p,
        Err(e) => return Err(format_err!("malformed package index: {}", e)),
    };

    let mut packages = Vec::new();
    for paragraph in paragraphs {
        if paragraph.fields.is_empty() {
            continue;
        }
        let mut fields = HashMap::new();
        for field in paragraph.fields {
            fields.insert(field.name, field.value);
        }
        packages.push(fields_to_meta(fields)?);
    }
    Ok(packages)
}

fn fields_to_meta(mut f: HashMap<&str, String>) -> Result<PackageMeta> {
    let name = f
        .remove("Package")
        .ok_or_else(|| format_err!("package entry without Package field"))?;
    let version = f
        .remove("Version")
        .ok_or_else(|| format_err!("package {} has no Version field", name))?;
    let version = PackageVersion::parse(&version)
        .with_context(|| format!("bad version for package {}", name))?;
    let location = f
        .remove("Filename")
        .ok_or_else(|| format_err!("package {} has no Filename field", name))?;
    let arch = f
        .remove("Architecture")
        .unwrap_or_else(|| "noarch".to_string());
    let install_size = match f.remove("Installed-Size") {
        Some(s) => s
            .trim()
            .parse()
            .with_context(|| format!("bad Installed-Size for package {}", name))?,
        None => 0,
    };
    let depends = match f.remove("Depends") {
        Some(s) => {
            parse_relations(&s).with_context(|| format!("bad Depends for package {}", name))?
        }
        None => Vec::new(),
    };
    let conflicts = match f.remove("Conflicts") {
        Some(s) => {
            parse_relations(&s).with_context(|| format!("bad Conflicts for package {}", name))?
        }
        None => Vec::new(),
    };

    Ok(PackageMeta {
        name,
        version,
        arch,
        install_size,
        depends,
        conflicts,
        location,
    })
}

fn parse_relations(s: &str) -> Result<Vec<(String, VersionConstraint)>> {
    lazy_static! {
        static ref RELATION: Regex = Regex::new(
            r"^(?P<name>[A-Za-z0-9-.+_]+)( \((?P<constraint>[<>=]{1,2} ?[A-Za-z0-9.\-:+~_]+)\))?$"
        )
        .unwrap();
    }

    let mut relations = Vec::new();
    for entry in s.split(", ") {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        let segments = RELATION
            .captures(entry)
            .ok_or_else(|| format_err!("malformed relation {:?}", entry))?;
        // The regex ensures the name group exists
        let name = segments.name("name").unwrap().as_str().to_string();
        let constraint = match segments.name("constraint") {
            Some(c) => VersionConstraint::parse(c.as_str())?,
            None => VersionConstraint::Any,
        };
        relations.push((name, constraint));
    }
    Ok(relations)
}

#[cfg(test)]
mod test {
    use super::*;

    const INDEX: &str = "\
Package: zsh
Version: 5.8-3
Architecture: x86_64
Installed-Size: 7340032
Filename: zsh-5.8.x86_64.rpm
Depends: glibc (>= 2.31), ncurses

Package: ncurses
Version: 6.2-1
Filename: ncurses-6.2.x86_64.rpm
Conflicts: ncurses5
";

    #[test]
    fn parses_every_paragraph() {
        let packages = parse_index(INDEX).unwrap();
        assert_eq!(packages.len(), 2);

        let zsh = &packages[0];
        assert_eq!(zsh.name, "zsh");
        assert_eq!(zsh.version.to_string(), "5.8-3");
        assert_eq!(zsh.arch, "x86_64");
        assert_eq!(zsh.install_size, 7340032);
        assert_eq!(zsh.location, "zsh-5.8.x86_64.rpm");
        assert_eq!(zsh.depends.len(), 2);
        assert_eq!(zsh.depends[0].0, "glibc");
        assert_eq!(zsh.depends[0].1.to_string(), ">= 2.31");
        assert_eq!(zsh.depends[1].0, "ncurses");
        assert_eq!(zsh.depends[1].1, VersionConstraint::Any);

        let ncurses = &packages[1];
        assert_eq!(ncurses.arch, "noarch", "architecture falls back");
        assert_eq!(ncurses.install_size, 0, "size falls back");
        assert_eq!(ncurses.conflicts[0].0, "ncurses5");
    }

    #[test]
    fn missing_required_fields_are_errors() {
        let no_version = "Package: broken\nFilename: broken.rpm\n";
        assert!(parse_index(no_version).is_err());

        let no_name = "Version: 1.0\nFilename: broken.rpm\n";
        assert!(parse_index(no_name).is_err());

        let no_filename = "Package: broken\nVersion: 1.0\n";
        assert!(parse_index(no_filename).is_err());
    }

    #[test]
    fn bad_relation_is_an_error() {
        let index = "\
Package: broken
Version: 1.0
Filename: broken.rpm
Depends: glibc (~> 2.31)
";
        assert!(parse_index(index).is_err());
    }

    #[test]
    fn empty_index_parses_to_nothing() {
        assert!(parse_index("").unwrap().is_empty());
        assert!(parse_index("\n\n").unwrap().is_empty());
    }
}
