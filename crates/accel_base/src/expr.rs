//! Arithmetic expressions (`spec.md` §3).
//!
//! An [`Expr`] is a reference-counted, structurally-shared arithmetic term:
//! integer literal, variable, negation, n-ary sum, n-ary product, or integer
//! power. Smart constructors fold constants and flatten nested sums/products
//! on the way in, which gives the "sharing by hash-consing is recommended"
//! property of `spec.md` §3 cheaply: building `a + b` twice from the same
//! `a`/`b` clones two `Rc` pointers rather than re-allocating a tree.
//!
//! The Design Notes call for a closed-universe tagged variant here rather
//! than the original's `GiNaC`/class-hierarchy expression type — this
//! follows that guidance directly, the same way `logicaffeine_verify::ir`
//! chose a tagged `VerifyExpr` enum over a class hierarchy for the same
//! reason (a closed set of node shapes is best matched by `match`).

use crate::var::Var;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

/// An arithmetic expression node.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum ExprNode {
    /// An integer literal.
    Int(i64),
    /// A variable reference.
    Var(Var),
    /// Unary negation.
    Neg(Expr),
    /// An n-ary sum, flattened and sorted for canonical comparison.
    Add(Vec<Expr>),
    /// An n-ary product, flattened and sorted for canonical comparison.
    Mul(Vec<Expr>),
    /// `base ^ exponent`. The exponent is itself an [`Expr`] rather than a
    /// bare `u32` so that non-polynomial closed forms (e.g. `2^n` for a
    /// variable `n`) are representable and rejected by [`Expr::is_polynomial`]
    /// rather than being inexpressible.
    Pow(Expr, Expr),
}

/// A reference-counted, structurally-shared arithmetic expression.
pub type Expr = Rc<ExprNode>;

/// Builds an integer literal.
pub fn int(n: i64) -> Expr {
    Rc::new(ExprNode::Int(n))
}

/// Builds a variable reference.
pub fn var(v: Var) -> Expr {
    Rc::new(ExprNode::Var(v))
}

/// Builds `-e`, folding double negation and constants.
pub fn neg(e: Expr) -> Expr {
    match e.as_ref() {
        ExprNode::Int(n) => int(-n),
        ExprNode::Neg(inner) => inner.clone(),
        _ => Rc::new(ExprNode::Neg(e)),
    }
}

/// Builds `a + b`, flattening nested sums and folding constants.
pub fn add(a: Expr, b: Expr) -> Expr {
    sum(vec![a, b])
}

/// Builds the n-ary sum of `terms`, flattening nested sums, dropping zeros,
/// and folding constant terms into a single literal.
pub fn sum(terms: Vec<Expr>) -> Expr {
    let mut flat = Vec::with_capacity(terms.len());
    for t in terms {
        match t.as_ref() {
            ExprNode::Add(inner) => flat.extend(inner.iter().cloned()),
            _ => flat.push(t),
        }
    }
    let mut constant: i64 = 0;
    let mut rest: Vec<Expr> = Vec::new();
    for t in flat {
        match t.as_ref() {
            ExprNode::Int(n) => constant += n,
            _ => rest.push(t),
        }
    }
    rest.sort_by(cmp_expr);
    if constant != 0 || rest.is_empty() {
        rest.push(int(constant));
    }
    if rest.len() == 1 {
        rest.into_iter().next().unwrap()
    } else {
        Rc::new(ExprNode::Add(rest))
    }
}

/// Builds `a - b`.
pub fn sub(a: Expr, b: Expr) -> Expr {
    add(a, neg(b))
}

/// Builds `a * b`, flattening nested products and folding constants.
pub fn mul(a: Expr, b: Expr) -> Expr {
    product(vec![a, b])
}

/// Builds the n-ary product of `factors`, flattening nested products,
/// short-circuiting on a zero factor, and folding constant factors.
pub fn product(factors: Vec<Expr>) -> Expr {
    let mut flat = Vec::with_capacity(factors.len());
    for f in factors {
        match f.as_ref() {
            ExprNode::Mul(inner) => flat.extend(inner.iter().cloned()),
            _ => flat.push(f),
        }
    }
    let mut constant: i64 = 1;
    let mut rest: Vec<Expr> = Vec::new();
    for f in flat {
        match f.as_ref() {
            ExprNode::Int(n) => constant *= n,
            _ => rest.push(f),
        }
    }
    if constant == 0 {
        return int(0);
    }
    rest.sort_by(cmp_expr);
    if constant != 1 || rest.is_empty() {
        rest.push(int(constant));
    }
    if rest.len() == 1 {
        rest.into_iter().next().unwrap()
    } else {
        Rc::new(ExprNode::Mul(rest))
    }
}

/// Builds `base ^ exponent`, folding a literal non-negative exponent into a
/// repeated product when small enough to stay cheap.
pub fn pow(base: Expr, exponent: Expr) -> Expr {
    match (base.as_ref(), exponent.as_ref()) {
        (_, ExprNode::Int(0)) => int(1),
        (_, ExprNode::Int(1)) => base,
        (ExprNode::Int(b), ExprNode::Int(e)) if *e >= 0 && *e <= 32 => {
            int(b.pow(*e as u32))
        }
        _ => Rc::new(ExprNode::Pow(base, exponent)),
    }
}

/// Total order over expressions used to canonicalize sums/products so that
/// structurally equal terms (after reordering) hash-cons to the same `Expr`.
fn cmp_expr(a: &Expr, b: &Expr) -> Ordering {
    fn rank(e: &ExprNode) -> u8 {
        match e {
            ExprNode::Int(_) => 0,
            ExprNode::Var(_) => 1,
            ExprNode::Neg(_) => 2,
            ExprNode::Add(_) => 3,
            ExprNode::Mul(_) => 4,
            ExprNode::Pow(_, _) => 5,
        }
    }
    match rank(a).cmp(&rank(b)) {
        Ordering::Equal => format!("{a:?}").cmp(&format!("{b:?}")),
        other => other,
    }
}

impl ExprNode {
    /// Collects every [`Var`] occurring in this expression.
    pub fn vars(&self) -> HashSet<Var> {
        let mut out = HashSet::new();
        collect_vars(self, &mut out);
        out
    }

    /// `spec.md` §3: "An expression is polynomial iff every occurrence of a
    /// variable is under a product tower with a non-negative integer
    /// exponent only."
    ///
    /// A [`ExprNode::Pow`] whose exponent is not a non-negative integer
    /// literal is non-polynomial regardless of what its base contains (this
    /// is how an exponential closed form such as `x0 * 2^n` is detected and
    /// routed away from the quantifier-elimination path per `spec.md` §4.1
    /// step 1 and scenario 4).
    pub fn is_polynomial(&self) -> bool {
        match self {
            ExprNode::Int(_) | ExprNode::Var(_) => true,
            ExprNode::Neg(e) => e.is_polynomial(),
            ExprNode::Add(ts) | ExprNode::Mul(ts) => ts.iter().all(|t| t.is_polynomial()),
            ExprNode::Pow(base, exp) => matches!(exp.as_ref(), ExprNode::Int(n) if *n >= 0)
                && base.is_polynomial(),
        }
    }

}

/// Substitutes `x ↦ replacement` for every free occurrence of `x` in `e`.
pub fn subst_var(e: &Expr, x: Var, replacement: &Expr) -> Expr {
    subst_map(e, &std::collections::HashMap::from([(x, replacement.clone())]))
}

/// Substitutes every variable in `map` simultaneously (a single recursive
/// pass, so `x ↦ y, y ↦ x` swaps rather than cascading).
pub fn subst_map(e: &Expr, map: &std::collections::HashMap<Var, Expr>) -> Expr {
    match e.as_ref() {
        ExprNode::Int(_) => e.clone(),
        ExprNode::Var(v) => map.get(v).cloned().unwrap_or_else(|| e.clone()),
        ExprNode::Neg(inner) => neg(subst_map(inner, map)),
        ExprNode::Add(ts) => sum(ts.iter().map(|t| subst_map(t, map)).collect()),
        ExprNode::Mul(ts) => product(ts.iter().map(|t| subst_map(t, map)).collect()),
        ExprNode::Pow(base, exp) => pow(subst_map(base, map), subst_map(exp, map)),
    }
}

fn collect_vars(e: &ExprNode, out: &mut HashSet<Var>) {
    match e {
        ExprNode::Int(_) => {}
        ExprNode::Var(v) => {
            out.insert(*v);
        }
        ExprNode::Neg(inner) => collect_vars(inner, out),
        ExprNode::Add(ts) | ExprNode::Mul(ts) => {
            for t in ts {
                collect_vars(t, out);
            }
        }
        ExprNode::Pow(base, exp) => {
            collect_vars(base, out);
            collect_vars(exp, out);
        }
    }
}

/// Pretty-prints an expression using a [`crate::var::VarManager`] to resolve
/// variable names.
pub struct DisplayExpr<'a> {
    pub expr: &'a Expr,
    pub vars: &'a crate::var::VarManager,
}

impl fmt::Display for DisplayExpr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_expr(self.expr, self.vars, f)
    }
}

fn fmt_expr(e: &Expr, vars: &crate::var::VarManager, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match e.as_ref() {
        ExprNode::Int(n) => write!(f, "{n}"),
        ExprNode::Var(v) => write!(f, "{}", vars.name(*v)),
        ExprNode::Neg(inner) => {
            write!(f, "-(")?;
            fmt_expr(inner, vars, f)?;
            write!(f, ")")
        }
        ExprNode::Add(ts) => {
            write!(f, "(")?;
            for (i, t) in ts.iter().enumerate() {
                if i > 0 {
                    write!(f, " + ")?;
                }
                fmt_expr(t, vars, f)?;
            }
            write!(f, ")")
        }
        ExprNode::Mul(ts) => {
            write!(f, "(")?;
            for (i, t) in ts.iter().enumerate() {
                if i > 0 {
                    write!(f, " * ")?;
                }
                fmt_expr(t, vars, f)?;
            }
            write!(f, ")")
        }
        ExprNode::Pow(base, exp) => {
            fmt_expr(base, vars, f)?;
            write!(f, "^")?;
            fmt_expr(exp, vars, f)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::var::VarManager;

    #[test]
    fn constant_folding_in_sum() {
        let e = sum(vec![int(2), int(3), int(-1)]);
        assert_eq!(*e, ExprNode::Int(4));
    }

    #[test]
    fn constant_folding_in_product() {
        let e = product(vec![int(2), int(3)]);
        assert_eq!(*e, ExprNode::Int(6));
    }

    #[test]
    fn product_with_zero_factor_is_zero() {
        let mut vm = VarManager::new();
        let x = vm.add_fresh("x");
        let e = product(vec![var(x), int(0)]);
        assert_eq!(*e, ExprNode::Int(0));
    }

    #[test]
    fn pow_with_variable_exponent_is_not_polynomial() {
        // x0 * 2^n (scenario 4 of spec.md §8)
        let mut vm = VarManager::new();
        let x0 = vm.add_fresh("x0");
        let n = vm.add_fresh_temporary("n");
        let e = mul(var(x0), pow(int(2), var(n)));
        assert!(!e.is_polynomial());
    }

    #[test]
    fn constant_power_is_polynomial() {
        let mut vm = VarManager::new();
        let x = vm.add_fresh("x");
        let e = pow(var(x), int(3));
        assert!(e.is_polynomial());
    }

    #[test]
    fn subst_var_replaces_free_occurrences() {
        let mut vm = VarManager::new();
        let x = vm.add_fresh("x");
        let y = vm.add_fresh("y");
        let e = add(var(x), int(1));
        let substituted = subst_var(&e, x, &var(y));
        assert_eq!(substituted.vars(), [y].into_iter().collect());
    }
}
