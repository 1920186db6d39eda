use varisat::{ExtendFormula, Lit};

/// Clause level interface to the satisfiability engine.
///
/// Literals follow the DIMACS convention: candidate ids are positive
/// integers, a negative value negates the candidate. Keeping the interface
/// this narrow lets the resolution logic stay independent of the engine
/// crate.
pub trait SatEngine {
    /// Add a disjunction of literals.
    fn add_clause(&mut self, clause: &[isize]);
    /// Replace the assumption set applied to subsequent solve calls.
    fn assume(&mut self, lits: &[isize]);
    /// Search for a model under the current assumptions.
    fn solve(&mut self) -> bool;
    /// Ids assigned true in the latest model.
    fn true_ids(&self) -> Vec<usize>;
    /// Subset of the assumptions the engine proved contradictory, empty
    /// unless the last solve failed.
    fn failed_assumptions(&self) -> Vec<usize>;
}

/// The varisat backed engine used for resolution.
pub struct Varisat {
    solver: varisat::Solver<'static>,
}

impl Varisat {
    pub fn new() -> Self {
        Varisat {
            solver: varisat::Solver::new(),
        }
    }
}

impl SatEngine for Varisat {
    fn add_clause(&mut self, clause: &[isize]) {
        let lits: Vec<Lit> = clause.iter().map(|l| Lit::from_dimacs(*l)).collect();
        self.solver.add_clause(&lits);
    }

    fn assume(&mut self, lits: &[isize]) {
        let lits: Vec<Lit> = lits.iter().map(|l| Lit::from_dimacs(*l)).collect();
        self.solver.assume(&lits);
    }

    fn solve(&mut self) -> bool {
        // varisat only errors when proof output is configured
        self.solver.solve().unwrap()
    }

    fn true_ids(&self) -> Vec<usize> {
        let mut res = Vec::new();
        if let Some(model) = self.solver.model() {
            for lit in model {
                if lit.is_positive() {
                    res.push(lit.to_dimacs() as usize);
                }
            }
        }
        res
    }

    fn failed_assumptions(&self) -> Vec<usize> {
        match self.solver.failed_core() {
            Some(core) => core
                .iter()
                .map(|lit| lit.to_dimacs().unsigned_abs())
                .collect(),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn chain_is_satisfied() {
        let mut engine = Varisat::new();
        // 1 pulls 2, 2 pulls 3
        engine.add_clause(&[-1, 2]);
        engine.add_clause(&[-2, 3]);
        engine.add_clause(&[1]);
        assert!(engine.solve());
        assert_eq!(engine.true_ids(), vec![1, 2, 3]);
    }

    #[test]
    fn failed_assumptions_name_the_culprits() {
        let mut engine = Varisat::new();
        engine.add_clause(&[-1, -2]);
        engine.assume(&[1, 2]);
        assert!(!engine.solve());
        let mut core = engine.failed_assumptions();
        core.sort_unstable();
        assert_eq!(core, vec![1, 2]);
    }

    #[test]
    fn assumptions_replace_earlier_ones() {
        let mut engine = Varisat::new();
        engine.add_clause(&[-1, -2]);
        engine.assume(&[1, 2]);
        assert!(!engine.solve());
        engine.assume(&[1]);
        assert!(engine.solve());
        assert!(engine.true_ids().contains(&1));
    }
}
