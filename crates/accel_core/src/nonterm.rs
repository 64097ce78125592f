//! The non-termination calculus (`spec.md` §4.5) and the cheap unrolled
//! direct check (`spec.md` §4.6), grounded in
//! `original_source/src/nonterm/nontermproblem.cpp`.

use accel_base::boolexpr::and;
use accel_base::smt::{SatResult, SmtOracle};
use accel_base::{BoolExpr, Update};
use log::debug;

use crate::certificate::saturate;
use crate::replacement::build_replacement_map;
use crate::rewrite::rewrite_guard;

/// The outcome of a successful non-termination proof: `invariant` holds
/// that `guard ∧ invariant ⇒ guard[x ↦ U(x)] ∧ invariant` (`spec.md`'s
/// "Non-termination soundness" testable property), `exact` whether the
/// invariant is equivalent to the original guard.
pub struct NontermResult {
    pub invariant: BoolExpr,
    pub exact: bool,
}

/// `spec.md` §4.5: runs the certificate engine (rules R, E, F only — no
/// M) over `guard`, builds a replacement map, and rewrites `guard` with
/// it to get a candidate inductive invariant.
pub fn nonterm_via_calculus(
    guard: &BoolExpr,
    update: &Update,
    smt: &mut dyn SmtOracle,
    cancel: &dyn Fn() -> bool,
) -> Option<NontermResult> {
    let store = saturate(guard, update, smt, cancel);
    let todo = guard.lits();
    let map = build_replacement_map(&store, &todo, guard.is_conjunction())?;
    let invariant = rewrite_guard(guard, &map, smt)?;
    debug!("nonterm: calculus produced invariant (exact={})", map.exact);
    Some(NontermResult {
        invariant,
        exact: map.exact,
    })
}

/// `spec.md` §4.6: a cheap check tried before the full calculus.
/// Specialized to a rule with a single update (the multi-right-hand-side
/// case belongs to the ITS rule graph, an out-of-scope external
/// collaborator per `spec.md` §1): checks whether firing the loop once
/// more is already implied by the current guard, or — failing that —
/// whether it becomes so after one concrete unrolling.
pub fn unrolled_direct_check(guard: &BoolExpr, update: &Update, smt: &mut dyn SmtOracle) -> Option<BoolExpr> {
    let guard_next = update.apply_bool(guard);
    if smt.is_implication(guard, &guard_next) {
        debug!("nonterm: direct check fired without unrolling");
        return Some(guard.clone());
    }

    let once = and(vec![guard.clone(), guard_next]);
    {
        let mut scope = smt.scope();
        scope.assert(&once);
        if scope.check() != SatResult::Sat {
            return None;
        }
    }
    let once_next = update.apply_bool(&once);
    if smt.is_implication(&once, &once_next) {
        debug!("nonterm: direct check fired after one unrolling");
        return Some(once);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use accel_base::boolexpr::lit;
    use accel_base::expr::{int, var};
    use accel_base::smt::Model;
    use accel_base::{RelOp, Relation, Subst, Var, VarManager};

    /// Reports every check unsatisfiable, so `SmtOracle::is_implication`
    /// (built on `check`) reports every implication valid — exercising
    /// the control flow of the direct check without a real arithmetic
    /// backend (covered by `accel-smt`'s `Z3Oracle` tests and the
    /// `accel-core/tests/scenarios.rs` integration tests).
    struct AlwaysValidOracle;
    impl SmtOracle for AlwaysValidOracle {
        fn push(&mut self) {}
        fn pop(&mut self) {}
        fn assert(&mut self, _formula: &BoolExpr) {}
        fn assert_tracked(&mut self, _label: &str, _formula: &BoolExpr) {}
        fn check(&mut self) -> SatResult {
            SatResult::Unsat
        }
        fn model(&mut self, _vars: &[Var]) -> Option<Model> {
            None
        }
        fn unsat_core(&mut self) -> Vec<String> {
            Vec::new()
        }
    }

    #[test]
    fn direct_check_fires_without_unrolling_when_guard_is_self_preserving() {
        let mut vm = VarManager::new();
        let x = vm.declare("x");
        let guard = lit(Relation::new(var(x), RelOp::Eq, int(0)));
        let mut update = Subst::new();
        update.insert(x, var(x));
        let result = unrolled_direct_check(&guard, &update, &mut AlwaysValidOracle);
        assert_eq!(result, Some(guard));
    }

    #[test]
    fn calculus_falls_back_to_none_when_nothing_is_certified() {
        struct AlwaysUnknown;
        impl SmtOracle for AlwaysUnknown {
            fn push(&mut self) {}
            fn pop(&mut self) {}
            fn assert(&mut self, _formula: &BoolExpr) {}
            fn assert_tracked(&mut self, _label: &str, _formula: &BoolExpr) {}
            fn check(&mut self) -> SatResult {
                SatResult::Unknown
            }
            fn model(&mut self, _vars: &[Var]) -> Option<Model> {
                None
            }
            fn unsat_core(&mut self) -> Vec<String> {
                Vec::new()
            }
        }
        let mut vm = VarManager::new();
        let x = vm.declare("x");
        let guard = lit(Relation::new(var(x), RelOp::Gt, int(0)));
        let update = Subst::new();
        let result = nonterm_via_calculus(&guard, &update, &mut AlwaysUnknown, &|| false);
        assert!(result.is_none());
    }
}
