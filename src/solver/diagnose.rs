use super::engine::{SatEngine, Varisat};
use super::pool::PkgPool;
use crate::error::DependencyProblem;

/// Name the packages behind an unsatisfiable request.
///
/// Replays the formula on a fresh engine with the best ranked candidate
/// of every requested name posted as an assumption, then reads back the
/// contradictory subset the engine isolated.
pub fn conflicting_requests(pool: &dyn PkgPool, requested: &[&str]) -> Vec<DependencyProblem> {
    let mut engine = Varisat::new();
    for rule in pool.gen_rules() {
        engine.add_clause(&rule);
    }

    let assumed: Vec<isize> = requested
        .iter()
        .filter_map(|name| pool.candidates(name))
        .map(|ids| ids[0] as isize)
        .collect();
    engine.assume(&assumed);
    engine.solve();

    let mut problems: Vec<DependencyProblem> = engine
        .failed_assumptions()
        .into_iter()
        .filter_map(|id| pool.get(id))
        .map(|solvable| DependencyProblem::Conflicting {
            package: solvable.meta.name.clone(),
            version: solvable.meta.version.to_string(),
        })
        .collect();

    if problems.is_empty() {
        // The engine could not isolate a core, report the whole request
        problems = assumed
            .iter()
            .filter_map(|id| pool.get(*id as usize))
            .map(|solvable| DependencyProblem::Conflicting {
                package: solvable.meta.name.clone(),
                version: solvable.meta.version.to_string(),
            })
            .collect();
    }

    problems.sort_by(|a, b| problem_package(a).cmp(problem_package(b)));
    problems
}

fn problem_package(problem: &DependencyProblem) -> &str {
    match problem {
        DependencyProblem::Missing { package } => package,
        DependencyProblem::Conflicting { package, .. } => package,
    }
}
