pub mod engine;
pub mod pool;
pub mod types;
pub mod version;

mod diagnose;
mod preference;

use crate::error::{DependencyProblem, Error, Result};
use crate::repo::{source, RepositoryRegistry};
use engine::{SatEngine, Varisat};
use pool::{InMemoryPool, PkgPool, Solvable};
use types::ResolvedPackage;

use tracing::{debug, info, warn};

use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};

/// Dependency solver over the repositories of a registry.
///
/// Every solve call loads metadata afresh and runs on an isolated engine,
/// so identical inputs yield identical results.
pub struct Sat;

impl Sat {
    pub fn new() -> Self {
        Sat
    }

    /// Resolve `requested` against every repository in the registry.
    ///
    /// The result holds the requested packages plus everything needed to
    /// satisfy their dependencies, keyed by package name. Repositories
    /// with a lower priority value win when several offer a package, with
    /// registration order breaking ties.
    pub fn solve(
        &self,
        registry: &RepositoryRegistry,
        requested: &[String],
    ) -> Result<BTreeMap<String, ResolvedPackage>> {
        if registry.is_empty() {
            return Err(Error::NoRepositoriesConfigured);
        }
        if requested.is_empty() {
            return Ok(BTreeMap::new());
        }

        let mut names: Vec<&str> = requested.iter().map(String::as_str).collect();
        names.sort_unstable();
        names.dedup();

        let pool = load_pool(registry)?;

        // Requested names turn into one candidate disjunction each, the
        // engine picks which repository and version satisfies them
        let mut request_clauses = Vec::new();
        let mut missing = Vec::new();
        for name in &names {
            match pool.candidates(name) {
                Some(ids) => {
                    let clause: Vec<isize> = ids.iter().map(|id| *id as isize).collect();
                    request_clauses.push(clause);
                }
                None => missing.push(DependencyProblem::Missing {
                    package: name.to_string(),
                }),
            }
        }
        if !missing.is_empty() {
            return Err(Error::UnresolvableDependency { problems: missing });
        }

        let mut engine = Varisat::new();
        let rules = pool.gen_rules();
        debug!(
            "encoded {} clauses over {} candidates",
            rules.len() + request_clauses.len(),
            pool.len()
        );
        for rule in &rules {
            engine.add_clause(rule);
        }
        for clause in &request_clauses {
            engine.add_clause(clause);
        }

        info!("resolving {} requested packages", names.len());
        if !engine.solve() {
            let problems = diagnose::conflicting_requests(&pool, &names);
            return Err(Error::UnresolvableDependency { problems });
        }
        let mut result = engine.true_ids();

        preference::apply(&pool, &mut engine, &mut result);
        let kept = trim_to_needed(&pool, &names, &result);
        debug!("kept {} of {} model entries", kept.len(), result.len());

        let mut resolved = BTreeMap::new();
        for id in kept {
            let solvable = match pool.get(id) {
                Some(s) => s,
                None => continue,
            };
            if let Some(ids) = pool.candidates(&solvable.meta.name) {
                if ids[0] != id {
                    warn!(
                        "cannot select best candidate of {}, a constraint pins it",
                        solvable.meta.name
                    );
                }
            }
            let descriptor = &registry.descriptors()[solvable.repo];
            let base = descriptor.source.translate()?;
            let uri = format!(
                "{}/{}",
                base.trim_end_matches('/'),
                solvable.meta.location
            );
            resolved.insert(
                solvable.meta.name.clone(),
                ResolvedPackage {
                    name: solvable.meta.name.clone(),
                    uri,
                    installsize_bytes: solvable.meta.install_size,
                    arch: solvable.meta.arch.clone(),
                    version: solvable.meta.version.to_string(),
                    repository: descriptor.alias.clone(),
                },
            );
        }

        info!("resolved {} packages", resolved.len());
        Ok(resolved)
    }
}

/// Load every repository's metadata into one candidate pool.
///
/// Repositories enter in priority order so candidate ids follow the same
/// preference the ranking uses. A failing repository aborts the load, no
/// partial pool is ever solved against.
fn load_pool(registry: &RepositoryRegistry) -> Result<InMemoryPool> {
    let mut pool = InMemoryPool::new();
    let mut order: Vec<usize> = (0..registry.len()).collect();
    order.sort_by_key(|i| (registry.descriptors()[*i].priority, *i));

    for repo in order {
        let descriptor = &registry.descriptors()[repo];
        info!(
            "loading package metadata for repository {:?}",
            descriptor.alias
        );
        let packages = source::load_packages(descriptor)?;
        debug!("{} packages in {:?}", packages.len(), descriptor.alias);
        for meta in packages {
            pool.add(Solvable {
                repo,
                priority: descriptor.priority,
                meta,
            });
        }
    }
    pool.finalize();
    Ok(pool)
}

/// Drop model entries nothing requested actually needs.
///
/// The engine assigns a value to every candidate it has seen, so a model
/// can mark packages true that no dependency chain reaches. Walking the
/// dependency edges from the requested names keeps exactly the closure.
fn trim_to_needed(pool: &dyn PkgPool, requested: &[&str], result: &[usize]) -> Vec<usize> {
    let in_model: HashSet<usize> = result.iter().copied().collect();
    let mut keep: BTreeSet<usize> = BTreeSet::new();
    let mut queue: VecDeque<usize> = VecDeque::new();

    for name in requested {
        if let Some(ids) = pool.candidates(name) {
            for id in ids {
                if in_model.contains(id) {
                    queue.push_back(*id);
                }
            }
        }
    }

    while let Some(id) = queue.pop_front() {
        if !keep.insert(id) {
            continue;
        }
        let solvable = match pool.get(id) {
            Some(s) => s,
            None => continue,
        };
        for (dep_name, constraint) in &solvable.meta.depends {
            if let Some(ids) = pool.candidates(dep_name) {
                for dep_id in ids {
                    if !in_model.contains(dep_id) {
                        continue;
                    }
                    if let Some(dep) = pool.get(*dep_id) {
                        if constraint.satisfies(&dep.meta.version) {
                            queue.push_back(*dep_id);
                        }
                    }
                }
            }
        }
    }

    keep.into_iter().collect()
}
