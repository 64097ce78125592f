//! Substitutions, updates and closed forms (`spec.md` §3).

use crate::boolexpr::BoolExpr;
use crate::expr::{self, Expr};
use crate::var::Var;
use std::collections::HashMap;

/// A mapping `Variable → Expression`, with composition and restriction.
#[derive(Clone, Default, PartialEq, Eq, Debug)]
pub struct Subst {
    map: HashMap<Var, Expr>,
}

impl Subst {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    pub fn from_map(map: HashMap<Var, Expr>) -> Self {
        Self { map }
    }

    pub fn insert(&mut self, x: Var, e: Expr) {
        self.map.insert(x, e);
    }

    pub fn get(&self, x: Var) -> Option<&Expr> {
        self.map.get(&x)
    }

    pub fn domain(&self) -> impl Iterator<Item = Var> + '_ {
        self.map.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Var, &Expr)> {
        self.map.iter().map(|(v, e)| (*v, e))
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Restricts the substitution to the given set of variables.
    pub fn restrict(&self, vars: &std::collections::HashSet<Var>) -> Subst {
        Subst::from_map(
            self.map
                .iter()
                .filter(|(v, _)| vars.contains(v))
                .map(|(v, e)| (*v, e.clone()))
                .collect(),
        )
    }

    /// Composes `self` after `other`: applies `other` then `self`, i.e.
    /// `(self ∘ other)(x) = self(other(x))`.
    pub fn compose(&self, other: &Subst) -> Subst {
        let mut result = HashMap::new();
        for (v, e) in &other.map {
            result.insert(*v, self.apply_expr(e));
        }
        for (v, e) in &self.map {
            result.entry(*v).or_insert_with(|| e.clone());
        }
        Subst::from_map(result)
    }

    /// Applies this substitution to an expression, replacing every mapped
    /// variable simultaneously.
    pub fn apply_expr(&self, e: &Expr) -> Expr {
        expr::subst_map(e, &self.map)
    }

    /// Applies this substitution to a guard, replacing every mapped variable
    /// simultaneously.
    pub fn apply_bool(&self, b: &BoolExpr) -> BoolExpr {
        crate::boolexpr::subst_map(b, &self.map)
    }
}

/// A substitution restricted to program variables, representing one step of
/// the loop.
pub type Update = Subst;

/// A substitution where each entry maps `x` to an expression in the initial
/// variables and a distinguished iteration counter `n`, paired with the
/// smallest `v ≥ 0` such that the closed form is exact for all `n ≥ v`
/// (`spec.md` §3 `ClosedForm`/"Validity bound").
#[derive(Clone, Debug)]
pub struct ClosedForm {
    pub subst: Subst,
    pub validity_bound: u32,
}

impl ClosedForm {
    pub fn new(subst: Subst, validity_bound: u32) -> Self {
        Self {
            subst,
            validity_bound,
        }
    }

    /// `true` iff every right-hand side of the closed form is a polynomial
    /// expression in the initial variables and `n` (`spec.md` §4.1 step 1).
    pub fn is_polynomial(&self) -> bool {
        self.subst.iter().all(|(_, e)| e.is_polynomial())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{add, int, var};
    use crate::var::VarManager;

    #[test]
    fn apply_expr_substitutes_simultaneously() {
        let mut vm = VarManager::new();
        let x = vm.add_fresh("x");
        let y = vm.add_fresh("y");
        let mut s = Subst::new();
        s.insert(x, var(y));
        s.insert(y, var(x));
        // swap: x+y should be unchanged structurally after swap+swap render
        let e = add(var(x), int(1));
        let result = s.apply_expr(&e);
        assert_eq!(result, add(var(y), int(1)));
    }

    #[test]
    fn restrict_drops_unlisted_vars() {
        let mut vm = VarManager::new();
        let x = vm.add_fresh("x");
        let y = vm.add_fresh("y");
        let mut s = Subst::new();
        s.insert(x, int(1));
        s.insert(y, int(2));
        let restricted = s.restrict(&[x].into_iter().collect());
        assert_eq!(restricted.get(x), Some(&int(1)));
        assert_eq!(restricted.get(y), None);
    }
}
