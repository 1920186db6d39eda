use super::engine::SatEngine;
use super::pool::PkgPool;

use tracing::debug;

use std::collections::{BTreeSet, HashMap};

/// Steer the model towards the best ranked candidate of every name.
///
/// Bans the currently chosen candidate together with everything ranked
/// below it, keeps the ban when the formula stays satisfiable and backs
/// off otherwise. Accepted bans accumulate as assumptions, so a name can
/// never regress below a level it already reached.
pub fn apply(pool: &dyn PkgPool, engine: &mut dyn SatEngine, result: &mut Vec<usize>) {
    let mut assumes: Vec<isize> = Vec::new();
    let mut stuck: BTreeSet<String> = BTreeSet::new();

    loop {
        let moves: Vec<(String, Vec<isize>)> = preferred_moves(pool, result)
            .into_iter()
            .filter(|(name, _)| !stuck.contains(name))
            .collect();
        if moves.is_empty() {
            break;
        }
        for (name, bans) in moves {
            let mut attempt = assumes.clone();
            attempt.extend_from_slice(&bans);
            engine.assume(&attempt);
            if engine.solve() {
                *result = engine.true_ids();
                assumes = attempt;
            } else {
                debug!("keeping lower ranked candidate of {name}");
                stuck.insert(name);
            }
        }
    }
}

/// Names whose chosen candidate is not the best ranked one, with the
/// literals banning the chosen candidate and everything ranked below it.
fn preferred_moves(pool: &dyn PkgPool, result: &[usize]) -> Vec<(String, Vec<isize>)> {
    let mut chosen: HashMap<&str, usize> = HashMap::new();
    for id in result {
        if let Some(solvable) = pool.get(*id) {
            chosen.insert(solvable.meta.name.as_str(), *id);
        }
    }

    let mut moves = Vec::new();
    for name in pool.names() {
        let id = match chosen.get(name) {
            Some(id) => *id,
            None => continue,
        };
        let ids = pool.candidates(name).unwrap_or(&[]);
        let rank = match ids.iter().position(|i| *i == id) {
            Some(rank) => rank,
            None => continue,
        };
        if rank == 0 {
            continue;
        }
        let bans: Vec<isize> = ids[rank..].iter().map(|i| -(*i as isize)).collect();
        moves.push((name.to_string(), bans));
    }
    moves
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::solver::engine::Varisat;
    use crate::solver::pool::test::solvable;
    use crate::solver::pool::InMemoryPool;

    #[test]
    fn moves_to_the_best_ranked_candidate() {
        let mut pool = InMemoryPool::new();
        let old = pool.add(solvable(0, 1, "kernel", "5.14", &[], &[]));
        let new = pool.add(solvable(0, 1, "kernel", "5.19", &[], &[]));
        pool.finalize();

        let mut engine = Varisat::new();
        for rule in pool.gen_rules() {
            engine.add_clause(&rule);
        }
        engine.add_clause(&[old as isize, new as isize]);
        assert!(engine.solve());

        // Force the walk to start from the lower ranked candidate
        let mut result = vec![old];
        engine.assume(&[-(new as isize)]);
        if engine.solve() {
            result = engine.true_ids();
        }
        engine.assume(&[]);
        assert!(engine.solve());

        apply(&pool, &mut engine, &mut result);
        assert!(result.contains(&new));
        assert!(!result.contains(&old));
    }

    #[test]
    fn pinned_dependency_stays_put() {
        let mut pool = InMemoryPool::new();
        let app = pool.add(solvable(0, 1, "app", "1", &[("lib", "= 1.0")], &[]));
        let lib_old = pool.add(solvable(0, 1, "lib", "1.0", &[], &[]));
        let lib_new = pool.add(solvable(0, 1, "lib", "2.0", &[], &[]));
        pool.finalize();

        let mut engine = Varisat::new();
        for rule in pool.gen_rules() {
            engine.add_clause(&rule);
        }
        engine.add_clause(&[app as isize]);
        assert!(engine.solve());
        let mut result = engine.true_ids();

        apply(&pool, &mut engine, &mut result);
        assert!(result.contains(&lib_old));
        assert!(!result.contains(&lib_new));
    }
}
