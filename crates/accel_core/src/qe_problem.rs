//! The QE accelerator (`spec.md` §4.1 steps 3-4, "QE problem"): builds the
//! two quantified formulas the dispatcher needs and hands them to an
//! injected [`QeOracle`]. The oracle itself (`accel-qelim::BoundedRangeQe`)
//! owns the actual case-enumeration / monotonic-implication machinery
//! (`spec.md` §4.7) — this module is pure formula plumbing.

use accel_base::boolexpr::subst_var;
use accel_base::expr::{int, sub, var};
use accel_base::smt::SmtOracle;
use accel_base::{BoolExpr, Var};
use accel_qelim::{QeOracle, QeOutcome, QuantPrefix};

/// `spec.md` §4.1 step 3: "quantify `∀ n ≥ 0. G(n)` and send to the QE
/// oracle" — non-termination via quantifier elimination.
pub fn nonterm_via_qe(guard_n: &BoolExpr, n: Var, qe: &dyn QeOracle, smt: &mut dyn SmtOracle) -> Option<QeOutcome> {
    let prefix = QuantPrefix {
        bound_var: n,
        lo: int(0),
        hi: None,
    };
    qe.qe(&prefix, guard_n, smt)
}

/// `spec.md` §4.1 step 4: "introduce a fresh `m`, build `∀ m ∈ [v,
/// n−1]. G(m)`" — acceleration via quantifier elimination. `m` must
/// already be a fresh variable owned by the caller's acceleration
/// problem.
pub fn accel_via_qe(
    guard_n: &BoolExpr,
    n: Var,
    m: Var,
    validity_bound: u32,
    qe: &dyn QeOracle,
    smt: &mut dyn SmtOracle,
) -> Option<QeOutcome> {
    let matrix = subst_var(guard_n, n, &var(m));
    let prefix = QuantPrefix {
        bound_var: m,
        lo: int(validity_bound as i64),
        hi: Some(sub(var(n), int(1))),
    };
    qe.qe(&prefix, &matrix, smt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use accel_base::boolexpr::lit;
    use accel_base::smt::SatResult;
    use accel_base::{RelOp, Relation, VarManager};

    struct AlwaysValidOracle;
    impl SmtOracle for AlwaysValidOracle {
        fn push(&mut self) {}
        fn pop(&mut self) {}
        fn assert(&mut self, _formula: &BoolExpr) {}
        fn assert_tracked(&mut self, _label: &str, _formula: &BoolExpr) {}
        fn check(&mut self) -> SatResult {
            SatResult::Unsat
        }
        fn model(&mut self, _vars: &[Var]) -> Option<accel_base::smt::Model> {
            None
        }
        fn unsat_core(&mut self) -> Vec<String> {
            Vec::new()
        }
    }

    #[test]
    fn accel_via_qe_substitutes_n_for_m_before_quantifying() {
        let mut vm = VarManager::new();
        let i0 = vm.declare("i0");
        let big_n = vm.declare("N");
        let n = vm.add_fresh_temporary("n");
        let m = vm.add_fresh_temporary("m");
        let guard_n = lit(Relation::new(
            accel_base::expr::add(var(i0), var(n)),
            RelOp::Lt,
            var(big_n),
        ));
        let qe = accel_qelim::BoundedRangeQe::new();
        let outcome = accel_via_qe(&guard_n, n, m, 0, &qe, &mut AlwaysValidOracle).unwrap();
        assert!(outcome.exact);
    }
}
