use crate::solver::types::ResolvedPackage;

use serde::Serialize;

use std::collections::{BTreeMap, HashSet};

/// How a package ended up in the resolution result.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PackageStatus {
    /// Asked for by name in the image description.
    ListedInDescription,
    /// Pulled in to satisfy a dependency.
    AddedByDependencySolver,
}

impl PackageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PackageStatus::ListedInDescription => "listed_in_description",
            PackageStatus::AddedByDependencySolver => "added_by_dependency_solver",
        }
    }
}

/// One line of the resolution report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PackageReport {
    pub name: String,
    pub source: String,
    pub installsize_bytes: u64,
    pub arch: String,
    pub version: String,
    pub repository: String,
    pub status: PackageStatus,
}

/// Classify a resolution result against the originally requested names.
///
/// Reports come out sorted by package name. The function only looks at
/// its arguments, so calling it twice with the same input yields the
/// same report.
pub fn classify(
    resolved: &BTreeMap<String, ResolvedPackage>,
    requested: &[String],
) -> Vec<PackageReport> {
    let requested: HashSet<&str> = requested.iter().map(|s| s.as_str()).collect();
    resolved
        .values()
        .map(|package| PackageReport {
            name: package.name.clone(),
            source: package.uri.clone(),
            installsize_bytes: package.installsize_bytes,
            arch: package.arch.clone(),
            version: package.version.clone(),
            repository: package.repository.clone(),
            status: if requested.contains(package.name.as_str()) {
                PackageStatus::ListedInDescription
            } else {
                PackageStatus::AddedByDependencySolver
            },
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    fn resolved(name: &str, version: &str) -> ResolvedPackage {
        ResolvedPackage {
            name: name.to_string(),
            uri: format!("http://mirror.example.com/{}-{}.x86_64.rpm", name, version),
            installsize_bytes: 1024,
            arch: "x86_64".to_string(),
            version: version.to_string(),
            repository: "main".to_string(),
        }
    }

    fn result_of(packages: &[(&str, &str)]) -> BTreeMap<String, ResolvedPackage> {
        packages
            .iter()
            .map(|(name, version)| (name.to_string(), resolved(name, version)))
            .collect()
    }

    #[test]
    fn requested_and_pulled_in_packages_are_told_apart() {
        let resolved = result_of(&[("vim", "8.2-1"), ("glibc", "2.35-2")]);
        let requested = vec!["vim".to_string()];

        let reports = classify(&resolved, &requested);
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].name, "glibc");
        assert_eq!(reports[0].status, PackageStatus::AddedByDependencySolver);
        assert_eq!(reports[1].name, "vim");
        assert_eq!(reports[1].status, PackageStatus::ListedInDescription);
    }

    #[test]
    fn reports_come_out_sorted_by_name() {
        let resolved = result_of(&[("zsh", "5.8-3"), ("bash", "5.1-2"), ("mc", "4.8-1")]);
        let requested: Vec<String> = vec!["zsh".into(), "bash".into(), "mc".into()];

        let reports = classify(&resolved, &requested);
        let names: Vec<&str> = reports.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["bash", "mc", "zsh"]);
    }

    #[test]
    fn reports_carry_the_resolved_fields() {
        let resolved = result_of(&[("vim", "8.2-1")]);
        let reports = classify(&resolved, &["vim".to_string()]);

        let report = &reports[0];
        assert_eq!(
            report.source,
            "http://mirror.example.com/vim-8.2-1.x86_64.rpm"
        );
        assert_eq!(report.installsize_bytes, 1024);
        assert_eq!(report.arch, "x86_64");
        assert_eq!(report.version, "8.2-1");
        assert_eq!(report.status.as_str(), "listed_in_description");
    }

    #[test]
    fn status_serializes_snake_case() {
        let reports = classify(&result_of(&[("vim", "8.2-1")]), &[]);
        let json = serde_json::to_string(&reports[0]).unwrap();
        assert!(json.contains("\"status\":\"added_by_dependency_solver\""));
    }
}
