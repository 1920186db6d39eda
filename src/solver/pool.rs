use super::types::PackageMeta;

use tracing::debug;

use std::collections::BTreeMap;

/// One package candidate loaded from one repository.
#[derive(Clone, Debug)]
pub struct Solvable {
    /// Position of the owning repository in the registry.
    pub repo: usize,
    /// Priority of the owning repository, lower values rank better.
    pub priority: u32,
    pub meta: PackageMeta,
}

/// Candidate store shared by clause generation and result assembly.
///
/// Ids start at 1 so they double as DIMACS literals.
pub trait PkgPool {
    /// Add a candidate to the pool, returning its id.
    fn add(&mut self, solvable: Solvable) -> usize;
    /// Rank every candidate list. Must be called before generating rules.
    fn finalize(&mut self);
    /// Get a candidate from its id.
    fn get(&self, id: usize) -> Option<&Solvable>;
    /// Candidate ids carrying a name, best ranked first after finalize.
    fn candidates(&self, name: &str) -> Option<&[usize]>;
    /// Every known package name in lexical order.
    fn names(&self) -> Box<dyn Iterator<Item = &str> + '_>;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clauses tying one candidate to its dependencies and conflicts.
    fn rules_for(&self, id: usize) -> Vec<Vec<isize>> {
        let solvable = self.get(id).unwrap();
        let mut rules = Vec::new();

        for (dep_name, constraint) in &solvable.meta.depends {
            let mut clause = vec![-(id as isize)];
            if let Some(ids) = self.candidates(dep_name) {
                for dep_id in ids {
                    let dep = self.get(*dep_id).unwrap();
                    if constraint.satisfies(&dep.meta.version) {
                        clause.push(*dep_id as isize);
                    }
                }
            }
            if clause.len() == 1 {
                // No candidate fulfills this dependency, the package
                // itself becomes uninstallable
                debug!(
                    "{} {} requires {} ({}) but nothing provides it",
                    solvable.meta.name, solvable.meta.version, dep_name, constraint
                );
            }
            rules.push(clause);
        }

        for (conflict_name, constraint) in &solvable.meta.conflicts {
            if let Some(ids) = self.candidates(conflict_name) {
                for other_id in ids {
                    if *other_id == id {
                        continue;
                    }
                    let other = self.get(*other_id).unwrap();
                    if constraint.satisfies(&other.meta.version) {
                        rules.push(vec![-(id as isize), -(*other_id as isize)]);
                    }
                }
            }
        }

        rules
    }

    /// The full clause set for the pool: dependency and conflict rules for
    /// every candidate, plus mutual exclusion between same name candidates.
    fn gen_rules(&self) -> Vec<Vec<isize>> {
        let mut rules = Vec::new();
        for id in 1..=self.len() {
            rules.append(&mut self.rules_for(id));
        }

        for name in self.names().collect::<Vec<_>>() {
            if let Some(ids) = self.candidates(name) {
                for (pos, a) in ids.iter().enumerate() {
                    for b in &ids[pos + 1..] {
                        rules.push(vec![-(*a as isize), -(*b as isize)]);
                    }
                }
            }
        }

        rules
    }
}

/// Pool over the candidates of a single resolution run.
pub struct InMemoryPool {
    solvables: Vec<Solvable>,
    by_name: BTreeMap<String, Vec<usize>>,
}

impl InMemoryPool {
    pub fn new() -> Self {
        InMemoryPool {
            solvables: Vec::new(),
            by_name: BTreeMap::new(),
        }
    }
}

impl PkgPool for InMemoryPool {
    fn add(&mut self, solvable: Solvable) -> usize {
        let name = solvable.meta.name.clone();
        self.solvables.push(solvable);
        let id = self.solvables.len();
        self.by_name.entry(name).or_default().push(id);
        id
    }

    fn finalize(&mut self) {
        // Rank: lowest priority value, then registration order, then
        // highest version
        let solvables = &self.solvables;
        for ids in self.by_name.values_mut() {
            ids.sort_by(|a, b| {
                let x = &solvables[*a - 1];
                let y = &solvables[*b - 1];
                x.priority
                    .cmp(&y.priority)
                    .then_with(|| x.repo.cmp(&y.repo))
                    .then_with(|| y.meta.version.cmp(&x.meta.version))
                    .then_with(|| a.cmp(b))
            });
        }
    }

    fn get(&self, id: usize) -> Option<&Solvable> {
        if id == 0 {
            return None;
        }
        self.solvables.get(id - 1)
    }

    fn candidates(&self, name: &str) -> Option<&[usize]> {
        self.by_name.get(name).map(|ids| ids.as_slice())
    }

    fn names(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        Box::new(self.by_name.keys().map(|k| k.as_str()))
    }

    fn len(&self) -> usize {
        self.solvables.len()
    }
}
