//! The `SmtOracle` seam (`spec.md` §6.2): satisfiability, models, unsat
//! cores and implication, behind a capability trait rather than a
//! concrete solver dependency. `accel-core`'s certificate engine and
//! `accel-qelim`'s bounded-range oracle both only need this trait, not
//! any particular backend, so it lives here rather than alongside the
//! one concrete (Z3-backed) implementation in `accel-smt` — the same
//! separation the Design Notes draw between "tagged variant" data (kept
//! here) and "narrow capability interface" collaborators (also declared
//! here, implemented elsewhere).

use std::collections::HashMap;

use crate::boolexpr::negate;
use crate::{BoolExpr, Var};

/// The three-valued outcome of an SMT check (`spec.md` §6.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SatResult {
    Sat,
    Unsat,
    Unknown,
}

/// A witness model: a concrete integer value for each queried variable.
pub type Model = HashMap<Var, i64>;

pub trait SmtOracle {
    /// Push a new assertion scope.
    fn push(&mut self);

    /// Pop the most recently pushed assertion scope.
    fn pop(&mut self);

    /// Assert `formula` in the current scope.
    fn assert(&mut self, formula: &BoolExpr);

    /// Assert `formula` in the current scope, tracked under `label` so it
    /// can appear in a later [`SmtOracle::unsat_core`].
    fn assert_tracked(&mut self, label: &str, formula: &BoolExpr);

    /// Check satisfiability of everything asserted in the current and
    /// enclosing scopes.
    fn check(&mut self) -> SatResult;

    /// After a `Sat` result, read back a value for each of `vars`.
    /// Returns `None` if no model is available (e.g. the last check
    /// wasn't `Sat`, or a backend doesn't support model extraction).
    fn model(&mut self, vars: &[Var]) -> Option<Model>;

    /// After an `Unsat` result, return the labels (from
    /// [`SmtOracle::assert_tracked`]) of a subset of tracked assertions
    /// that is itself unsatisfiable. Returns an empty vector if the
    /// backend doesn't support cores or nothing was tracked.
    fn unsat_core(&mut self) -> Vec<String>;

}

impl dyn SmtOracle + '_ {
    /// Open a scope that pops itself on drop (`push`/`pop` via RAII,
    /// mirroring `logicaffeine_verify::solver::Verifier::check_valid`'s
    /// manual push/assert-not/check/pop sequence). Declared on `dyn
    /// SmtOracle` rather than as a default trait method: every consumer
    /// of this trait (the certificate engine, the QE oracle) holds its
    /// solver as `&mut dyn SmtOracle`, so this only needs to be callable
    /// through the trait object, not on a concretely-typed solver, and
    /// a default trait method body can't unsize `&mut Self` to `&mut
    /// dyn SmtOracle` without requiring `Self: Sized` (which would drop
    /// it from the vtable).
    pub fn scope(&mut self) -> Scope<'_> {
        self.push();
        Scope { oracle: self }
    }

    /// `true` iff `antecedent` implies `consequent`, i.e. `antecedent ∧
    /// ¬consequent` is unsatisfiable.
    pub fn is_implication(&mut self, antecedent: &BoolExpr, consequent: &BoolExpr) -> bool {
        let mut s = self.scope();
        s.assert(antecedent);
        s.assert(&negate(consequent));
        matches!(s.check(), SatResult::Unsat)
    }
}

/// An open assertion scope. Dropping it pops the solver back to the state
/// it had before the scope was opened.
pub struct Scope<'a> {
    oracle: &'a mut dyn SmtOracle,
}

impl<'a> Scope<'a> {
    pub fn assert(&mut self, formula: &BoolExpr) {
        self.oracle.assert(formula);
    }

    pub fn assert_tracked(&mut self, label: &str, formula: &BoolExpr) {
        self.oracle.assert_tracked(label, formula);
    }

    pub fn check(&mut self) -> SatResult {
        self.oracle.check()
    }

    pub fn model(&mut self, vars: &[Var]) -> Option<Model> {
        self.oracle.model(vars)
    }

    pub fn unsat_core(&mut self) -> Vec<String> {
        self.oracle.unsat_core()
    }
}

impl<'a> Drop for Scope<'a> {
    fn drop(&mut self) {
        self.oracle.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A trivial oracle that reports every formula `Sat` unless it has
    /// literally asserted `False`, used only to exercise `Scope`'s
    /// push/pop bookkeeping without pulling in a real solver.
    struct AlwaysSat {
        depth: u32,
        saw_false: Vec<bool>,
    }

    impl AlwaysSat {
        fn new() -> Self {
            Self {
                depth: 0,
                saw_false: vec![false],
            }
        }
    }

    impl SmtOracle for AlwaysSat {
        fn push(&mut self) {
            self.depth += 1;
            self.saw_false.push(false);
        }

        fn pop(&mut self) {
            self.depth -= 1;
            self.saw_false.pop();
        }

        fn assert(&mut self, formula: &BoolExpr) {
            if matches!(formula.as_ref(), crate::boolexpr::BoolExprNode::False) {
                *self.saw_false.last_mut().unwrap() = true;
            }
        }

        fn assert_tracked(&mut self, _label: &str, formula: &BoolExpr) {
            self.assert(formula);
        }

        fn check(&mut self) -> SatResult {
            if self.saw_false.iter().any(|&b| b) {
                SatResult::Unsat
            } else {
                SatResult::Sat
            }
        }

        fn model(&mut self, _vars: &[Var]) -> Option<Model> {
            None
        }

        fn unsat_core(&mut self) -> Vec<String> {
            Vec::new()
        }
    }

    #[test]
    fn scope_pops_on_drop() {
        let mut oracle = AlwaysSat::new();
        {
            let mut s = (&mut oracle as &mut dyn SmtOracle).scope();
            s.assert(&crate::boolexpr::fls());
            assert_eq!(s.check(), SatResult::Unsat);
        }
        assert_eq!(oracle.depth, 0);
        assert_eq!(oracle.check(), SatResult::Sat);
    }

    #[test]
    fn is_implication_false_implies_anything() {
        let mut oracle = AlwaysSat::new();
        let antecedent = crate::boolexpr::fls();
        let consequent = crate::boolexpr::tru();
        assert!((&mut oracle as &mut dyn SmtOracle).is_implication(&antecedent, &consequent));
    }
}
