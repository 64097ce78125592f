//! The guard rewriter (`spec.md` §4.4): apply a [`ReplacementMap`]
//! pointwise over the original guard's literals, preserving the boolean
//! skeleton, then SMT-check the result.

use accel_base::boolexpr::replace_rels;
use accel_base::smt::{SatResult, SmtOracle};
use accel_base::BoolExpr;

use crate::replacement::ReplacementMap;

/// Rewrites `guard` with `map`, returning `None` if the rewritten formula
/// is UNSAT (the acceleration attempt fails, per `spec.md` §4.4).
pub fn rewrite_guard(guard: &BoolExpr, map: &ReplacementMap, smt: &mut dyn SmtOracle) -> Option<BoolExpr> {
    let rewritten = replace_rels(guard, &map.map);
    let mut scope = smt.scope();
    scope.assert(&rewritten);
    if scope.check() == SatResult::Unsat {
        return None;
    }
    drop(scope);
    Some(rewritten)
}

#[cfg(test)]
mod tests {
    use super::*;
    use accel_base::boolexpr::{fls, lit, tru};
    use accel_base::expr::{int, var};
    use accel_base::smt::Model;
    use accel_base::{RelOp, Relation, Var, VarManager};
    use std::collections::HashMap;

    struct AlwaysSat;
    impl SmtOracle for AlwaysSat {
        fn push(&mut self) {}
        fn pop(&mut self) {}
        fn assert(&mut self, _formula: &BoolExpr) {}
        fn assert_tracked(&mut self, _label: &str, _formula: &BoolExpr) {}
        fn check(&mut self) -> SatResult {
            SatResult::Sat
        }
        fn model(&mut self, _vars: &[Var]) -> Option<Model> {
            None
        }
        fn unsat_core(&mut self) -> Vec<String> {
            Vec::new()
        }
    }

    struct AlwaysUnsat;
    impl SmtOracle for AlwaysUnsat {
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
    fn rewrite_applies_the_map_pointwise() {
        let mut vm = VarManager::new();
        let x = vm.declare("x");
        let r1 = Relation::new(var(x), RelOp::Gt, int(0));
        let guard = lit(r1.clone());
        let map = ReplacementMap {
            map: HashMap::from([(r1, tru())]),
            exact: true,
        };
        let rewritten = rewrite_guard(&guard, &map, &mut AlwaysSat).unwrap();
        assert_eq!(rewritten, tru());
    }

    #[test]
    fn unsat_rewrite_fails() {
        let mut vm = VarManager::new();
        let x = vm.declare("x");
        let r1 = Relation::new(var(x), RelOp::Gt, int(0));
        let guard = lit(r1.clone());
        let map = ReplacementMap {
            map: HashMap::from([(r1, fls())]),
            exact: false,
        };
        assert!(rewrite_guard(&guard, &map, &mut AlwaysUnsat).is_none());
    }
}
