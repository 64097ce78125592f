//! Boolean formulas over relations (`spec.md` §3).
//!
//! `BoolExpr` is the closed-universe tagged variant the Design Notes call
//! for in place of the original's class hierarchy: `And`/`Or`/`Lit`/`True`/
//! `False`. Smart constructors absorb `True`/`False` and flatten nested
//! `And`/`Or` the same way [`crate::expr`]'s smart constructors fold
//! constants, giving cheap `Rc` sharing of repeated sub-formulas.

use crate::relation::Relation;
use crate::var::{Var, VarManager};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// A boolean formula node.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum BoolExprNode {
    And(Vec<BoolExpr>),
    Or(Vec<BoolExpr>),
    Lit(Relation),
    True,
    False,
}

/// A reference-counted, structurally-shared boolean formula.
pub type BoolExpr = Rc<BoolExprNode>;

pub fn tru() -> BoolExpr {
    Rc::new(BoolExprNode::True)
}

pub fn fls() -> BoolExpr {
    Rc::new(BoolExprNode::False)
}

pub fn lit(rel: Relation) -> BoolExpr {
    Rc::new(BoolExprNode::Lit(rel))
}

/// Builds the conjunction of `parts`, flattening nested conjunctions and
/// short-circuiting on any `False` part.
pub fn and(parts: Vec<BoolExpr>) -> BoolExpr {
    let mut flat = Vec::with_capacity(parts.len());
    for p in parts {
        match p.as_ref() {
            BoolExprNode::True => {}
            BoolExprNode::And(inner) => flat.extend(inner.iter().cloned()),
            _ => flat.push(p),
        }
    }
    if flat.iter().any(|p| matches!(p.as_ref(), BoolExprNode::False)) {
        return fls();
    }
    dedup_stable(&mut flat);
    match flat.len() {
        0 => tru(),
        1 => flat.into_iter().next().unwrap(),
        _ => Rc::new(BoolExprNode::And(flat)),
    }
}

/// Builds the disjunction of `parts`, flattening nested disjunctions and
/// short-circuiting on any `True` part.
pub fn or(parts: Vec<BoolExpr>) -> BoolExpr {
    let mut flat = Vec::with_capacity(parts.len());
    for p in parts {
        match p.as_ref() {
            BoolExprNode::False => {}
            BoolExprNode::Or(inner) => flat.extend(inner.iter().cloned()),
            _ => flat.push(p),
        }
    }
    if flat.iter().any(|p| matches!(p.as_ref(), BoolExprNode::True)) {
        return tru();
    }
    dedup_stable(&mut flat);
    match flat.len() {
        0 => fls(),
        1 => flat.into_iter().next().unwrap(),
        _ => Rc::new(BoolExprNode::Or(flat)),
    }
}

fn dedup_stable(items: &mut Vec<BoolExpr>) {
    let mut seen: Vec<BoolExpr> = Vec::new();
    items.retain(|item| {
        if seen.contains(item) {
            false
        } else {
            seen.push(item.clone());
            true
        }
    });
}

impl BoolExprNode {
    /// `true` iff this formula is a single conjunction (or a single literal,
    /// or `True`/`False`) — `spec.md` §3(b) and the `isConjunction` flag used
    /// throughout §4.3's replacement-map builder.
    pub fn is_conjunction(&self) -> bool {
        !matches!(self, BoolExprNode::Or(_))
    }

    /// Enumerates the literals of this formula as a set, in a stable
    /// (lexicographic-by-debug-form) order, per `spec.md` §5's ordering
    /// guarantee: "an implementation may choose any stable order".
    pub fn lits(&self) -> Vec<Relation> {
        let mut out: Vec<Relation> = Vec::new();
        collect_lits(self, &mut out);
        out.sort_by_key(|r| format!("{r:?}"));
        out.dedup();
        out
    }

}

/// Substitutes every occurrence of relation `from` with the formula `to`
/// (`φ[R ↦ ψ]`, `spec.md` §3(c)).
pub fn replace_rel(formula: &BoolExpr, from: &Relation, to: &BoolExpr) -> BoolExpr {
    replace_rels(formula, &HashMap::from([(from.clone(), to.clone())]))
}

/// Substitutes `x ↦ e` throughout every literal (`φ[x ↦ e]`, `spec.md` §3(d)).
pub fn subst_var(formula: &BoolExpr, x: Var, e: &crate::expr::Expr) -> BoolExpr {
    subst_map(
        formula,
        &HashMap::from([(x, e.clone())]),
    )
}

/// Substitutes every variable in `map` simultaneously throughout every
/// literal of `formula`.
pub fn subst_map(
    formula: &BoolExpr,
    map: &HashMap<Var, crate::expr::Expr>,
) -> BoolExpr {
    match formula.as_ref() {
        BoolExprNode::True => tru(),
        BoolExprNode::False => fls(),
        BoolExprNode::Lit(r) => lit(r.subst_map(map)),
        BoolExprNode::And(ps) => and(ps.iter().map(|p| subst_map(p, map)).collect()),
        BoolExprNode::Or(ps) => or(ps.iter().map(|p| subst_map(p, map)).collect()),
    }
}

/// Applies a replacement map `R ↦ φ_R` pointwise over the literals of
/// `formula`, preserving the boolean skeleton (`spec.md` §4.4 guard
/// rewriter).
pub fn replace_rels(formula: &BoolExpr, map: &HashMap<Relation, BoolExpr>) -> BoolExpr {
    match formula.as_ref() {
        BoolExprNode::True => tru(),
        BoolExprNode::False => fls(),
        BoolExprNode::Lit(r) => map.get(r).cloned().unwrap_or_else(|| formula.clone()),
        BoolExprNode::And(ps) => and(ps.iter().map(|p| replace_rels(p, map)).collect()),
        BoolExprNode::Or(ps) => or(ps.iter().map(|p| replace_rels(p, map)).collect()),
    }
}

/// Pushes negation to the literals (De Morgan), keeping the result in the
/// same `And`/`Or`/`Lit` shape rather than wrapping it in a `Not` node —
/// this crate's `BoolExprNode` has no `Not` variant, so every consumer
/// (the SMT encoder included) only ever sees formulas already in this
/// normal form.
pub fn negate(formula: &BoolExpr) -> BoolExpr {
    match formula.as_ref() {
        BoolExprNode::True => fls(),
        BoolExprNode::False => tru(),
        BoolExprNode::Lit(r) => lit(r.negate()),
        BoolExprNode::And(ps) => or(ps.iter().map(negate).collect()),
        BoolExprNode::Or(ps) => and(ps.iter().map(negate).collect()),
    }
}

fn collect_lits(e: &BoolExprNode, out: &mut Vec<Relation>) {
    match e {
        BoolExprNode::True | BoolExprNode::False => {}
        BoolExprNode::Lit(r) => out.push(r.clone()),
        BoolExprNode::And(ps) | BoolExprNode::Or(ps) => {
            for p in ps {
                collect_lits(p, out);
            }
        }
    }
}

pub struct DisplayBoolExpr<'a> {
    pub expr: &'a BoolExpr,
    pub vars: &'a VarManager,
}

impl fmt::Display for DisplayBoolExpr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_bool(self.expr, self.vars, f)
    }
}

fn fmt_bool(e: &BoolExpr, vars: &VarManager, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match e.as_ref() {
        BoolExprNode::True => write!(f, "true"),
        BoolExprNode::False => write!(f, "false"),
        BoolExprNode::Lit(r) => write!(f, "{}", r.display(vars)),
        BoolExprNode::And(ps) => {
            write!(f, "(")?;
            for (i, p) in ps.iter().enumerate() {
                if i > 0 {
                    write!(f, " /\\ ")?;
                }
                fmt_bool(p, vars, f)?;
            }
            write!(f, ")")
        }
        BoolExprNode::Or(ps) => {
            write!(f, "(")?;
            for (i, p) in ps.iter().enumerate() {
                if i > 0 {
                    write!(f, " \\/ ")?;
                }
                fmt_bool(p, vars, f)?;
            }
            write!(f, ")")
        }
    }
}
