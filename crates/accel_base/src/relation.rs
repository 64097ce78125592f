//! Relations: atomic literals of a guard (`spec.md` §3).
//!
//! A [`Relation`] is an ordered triple `(lhs, op, rhs)`. Two normal forms are
//! used throughout the calculus, exactly as `spec.md` §3 specifies:
//!
//! - *strict normal form* `e > 0`, produced by [`Relation::to_strict_form`]
//!   and consumed by the acceleration calculus;
//! - equality/dis-equality, which are never rewritten, only ever preserved.
//!
//! The integer-tightening conversions (`<` to `≤`, `≥`/`>` to a single
//! strict form) mirror `original_source/src/expr/relation.cpp`'s
//! `toGreater`/`toLessEq` free functions one-for-one.

use crate::expr::{self, sub, Expr, ExprNode};
use crate::var::{Var, VarManager};
use std::fmt;

/// A comparison operator.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum RelOp {
    Lt,
    Le,
    Eq,
    Neq,
    Ge,
    Gt,
}

impl RelOp {
    /// The operator obtained by swapping the two sides (`a R b` becomes
    /// `b R' a`).
    pub fn flip(self) -> RelOp {
        match self {
            RelOp::Lt => RelOp::Gt,
            RelOp::Le => RelOp::Ge,
            RelOp::Eq => RelOp::Eq,
            RelOp::Neq => RelOp::Neq,
            RelOp::Ge => RelOp::Le,
            RelOp::Gt => RelOp::Lt,
        }
    }

    /// The operator obtained by logical negation (`¬(a R b)`).
    pub fn negate(self) -> RelOp {
        match self {
            RelOp::Lt => RelOp::Ge,
            RelOp::Le => RelOp::Gt,
            RelOp::Eq => RelOp::Neq,
            RelOp::Neq => RelOp::Eq,
            RelOp::Ge => RelOp::Lt,
            RelOp::Gt => RelOp::Le,
        }
    }
}

impl fmt::Display for RelOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RelOp::Lt => "<",
            RelOp::Le => "<=",
            RelOp::Eq => "=",
            RelOp::Neq => "!=",
            RelOp::Ge => ">=",
            RelOp::Gt => ">",
        };
        write!(f, "{s}")
    }
}

/// An atomic relation `lhs op rhs`.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Relation {
    pub lhs: Expr,
    pub op: RelOp,
    pub rhs: Expr,
}

impl Relation {
    pub fn new(lhs: Expr, op: RelOp, rhs: Expr) -> Self {
        Self { lhs, op, rhs }
    }

    /// `lhs > 0`.
    pub fn gt_zero(lhs: Expr) -> Self {
        Self::new(lhs, RelOp::Gt, expr::int(0))
    }

    /// `lhs = rhs`.
    pub fn eq(lhs: Expr, rhs: Expr) -> Self {
        Self::new(lhs, RelOp::Eq, rhs)
    }

    /// Negates the relation (`¬R`).
    pub fn negate(&self) -> Relation {
        Relation::new(self.lhs.clone(), self.op.negate(), self.rhs.clone())
    }

    /// Converts any inequality to the calculus's strict normal form `e > 0`,
    /// using the integer tightenings of
    /// `original_source/src/expr/relation.cpp`'s `toGreater`:
    ///
    /// - `a > b`  → `(a - b) > 0`
    /// - `a >= b` → `(a - b + 1) > 0`
    /// - `a < b`  → `(b - a) > 0`
    /// - `a <= b` → `(b - a + 1) > 0`
    ///
    /// Equalities and dis-equalities are returned unchanged, per `spec.md`
    /// §3: "equality / dis-equality are preserved verbatim".
    pub fn to_strict_form(&self) -> Relation {
        match self.op {
            RelOp::Gt => Relation::gt_zero(sub(self.lhs.clone(), self.rhs.clone())),
            RelOp::Ge => Relation::gt_zero(expr::add(
                sub(self.lhs.clone(), self.rhs.clone()),
                expr::int(1),
            )),
            RelOp::Lt => Relation::gt_zero(sub(self.rhs.clone(), self.lhs.clone())),
            RelOp::Le => Relation::gt_zero(expr::add(
                sub(self.rhs.clone(), self.lhs.clone()),
                expr::int(1),
            )),
            RelOp::Eq | RelOp::Neq => self.clone(),
        }
    }

    /// `true` iff this relation is `e > 0` for some `e`.
    pub fn is_strict_form(&self) -> bool {
        self.op == RelOp::Gt && matches!(self.rhs.as_ref(), ExprNode::Int(0))
    }

    /// `spec.md` §3: a relation is polynomial iff both sides are.
    pub fn is_polynomial(&self) -> bool {
        self.lhs.is_polynomial() && self.rhs.is_polynomial()
    }

    /// Substitutes `x ↦ e` on both sides.
    pub fn subst_var(&self, x: Var, e: &Expr) -> Relation {
        Relation::new(
            expr::subst_var(&self.lhs, x, e),
            self.op,
            expr::subst_var(&self.rhs, x, e),
        )
    }

    /// Substitutes every variable in `map` simultaneously on both sides.
    pub fn subst_map(&self, map: &std::collections::HashMap<Var, Expr>) -> Relation {
        Relation::new(
            expr::subst_map(&self.lhs, map),
            self.op,
            expr::subst_map(&self.rhs, map),
        )
    }

    /// Applies a [`crate::subst::Subst`] (e.g. a rule's update) to both
    /// sides — `R[x ↦ U(x)]`, the "after one step" relation the R and E
    /// proof rules compare `R` against.
    pub fn apply_subst(&self, subst: &crate::subst::Subst) -> Relation {
        Relation::new(subst.apply_expr(&self.lhs), self.op, subst.apply_expr(&self.rhs))
    }

    /// Every variable occurring in this relation.
    pub fn vars(&self) -> std::collections::HashSet<Var> {
        let mut out = self.lhs.vars();
        out.extend(self.rhs.vars());
        out
    }

    /// `true` iff this relation is trivially true by inspection: both sides
    /// are the same integer literal, or are structurally identical. Used by
    /// the saturation loop to interpret a solver model without invoking the
    /// solver a second time (`original_source` `isTriviallyTrue`).
    pub fn is_trivially_true(&self) -> bool {
        if let (ExprNode::Int(a), ExprNode::Int(b)) = (self.lhs.as_ref(), self.rhs.as_ref()) {
            return match self.op {
                RelOp::Lt => a < b,
                RelOp::Le => a <= b,
                RelOp::Eq => a == b,
                RelOp::Neq => a != b,
                RelOp::Ge => a >= b,
                RelOp::Gt => a > b,
            };
        }
        self.op == RelOp::Eq && self.lhs == self.rhs
    }

    pub fn display<'a>(&'a self, vars: &'a VarManager) -> DisplayRelation<'a> {
        DisplayRelation { rel: self, vars }
    }
}

pub struct DisplayRelation<'a> {
    rel: &'a Relation,
    vars: &'a VarManager,
}

impl fmt::Display for DisplayRelation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            expr::DisplayExpr {
                expr: &self.rel.lhs,
                vars: self.vars
            },
            self.rel.op,
            expr::DisplayExpr {
                expr: &self.rel.rhs,
                vars: self.vars
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{int, var};
    use crate::var::VarManager;

    #[test]
    fn gt_converts_to_subtraction() {
        let mut vm = VarManager::new();
        let x = vm.add_fresh("x");
        let rel = Relation::new(var(x), RelOp::Gt, int(0));
        let strict = rel.to_strict_form();
        assert!(strict.is_strict_form());
    }

    #[test]
    fn ge_tightens_by_one() {
        let mut vm = VarManager::new();
        let x = vm.add_fresh("x");
        // x >= 5  ->  (x - 5 + 1) > 0  ==  (x - 4) > 0
        let rel = Relation::new(var(x), RelOp::Ge, int(5));
        let strict = rel.to_strict_form();
        assert!(strict.is_strict_form());
        assert_eq!(strict.lhs, crate::expr::sub(var(x), int(4)));
    }

    #[test]
    fn equality_is_left_verbatim() {
        let mut vm = VarManager::new();
        let x = vm.add_fresh("x");
        let rel = Relation::new(var(x), RelOp::Eq, int(0));
        assert_eq!(rel.to_strict_form(), rel);
    }

    #[test]
    fn negate_flips_operator_only() {
        let mut vm = VarManager::new();
        let x = vm.add_fresh("x");
        let rel = Relation::new(var(x), RelOp::Gt, int(0));
        assert_eq!(rel.negate().op, RelOp::Le);
    }
}
