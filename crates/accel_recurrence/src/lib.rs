//! # accel-recurrence
//!
//! The recurrence-solver external collaborator (`spec.md` §6.1): given a
//! rule's update, produce a closed form `Ū(n)` in the initial variables
//! and a fresh iteration counter, a validity bound, and an iterated cost.
//!
//! `original_source`'s own recurrence solver (`src/accelerate/recurrence/
//! recurrence.hpp`) wasn't present in the files this crate was built
//! from — `DESIGN.md` records this as an open-question resolution. What's
//! implemented here is a from-scratch solver for the two update shapes
//! the calculus's own test scenarios actually exercise: `x ↦ x + b`
//! (affine, coefficient 1) and `x ↦ a·x` (pure geometric). Anything
//! outside that shape returns `None`, which the caller treats exactly
//! like "no recurrence solver available" (`spec.md` §6.1): the
//! acceleration problem falls back to the non-termination calculus.

use std::collections::HashMap;

use accel_base::expr::{self, ExprNode};
use accel_base::{ClosedForm, Expr, Rule, Subst, Var, VarManager};
use log::debug;

/// The triple `spec.md` §6.1's `iterate` returns.
pub struct Recurrence {
    pub closed_form: ClosedForm,
    pub cost: Expr,
    pub validity_bound: u32,
}

pub trait RecurrenceSolver {
    /// Attempts to solve `rule`'s update in terms of a fresh iteration
    /// counter `n`. `None` means "no closed form found"; the core falls
    /// back to the non-termination calculus only.
    fn iterate(&self, rule: &Rule, n: Var) -> Option<Recurrence>;
}

/// Solves per-variable affine recurrences `x ↦ a·x + b` where `b` may
/// mention other variables, provided every variable `b` mentions is
/// itself left unmodified by the update (so it behaves as a constant
/// across iterations). Couples of mutually-recursive updates (`x ↦ y, y
/// ↦ x`) and any update where a variable occurs more than linearly are
/// rejected.
#[derive(Default)]
pub struct AffineRecurrenceSolver;

impl AffineRecurrenceSolver {
    pub fn new() -> Self {
        Self
    }
}

impl RecurrenceSolver for AffineRecurrenceSolver {
    fn iterate(&self, rule: &Rule, n: Var) -> Option<Recurrence> {
        let mut closed: HashMap<Var, Expr> = HashMap::new();
        for v in rule.update.domain() {
            let updated = rule.update.get(v).cloned().unwrap_or_else(|| expr::var(v));
            let (coeff, rest) = linear_coeff(&updated, v)?;
            for dep in rest.vars() {
                if is_modified(rule, dep) {
                    debug!("recurrence: {updated:?} depends on modified variable, giving up");
                    return None;
                }
            }
            let solved = if coeff == 1 {
                // v_{k+1} = v_k + rest  =>  v(n) = v_0 + n * rest
                expr::add(expr::var(v), expr::mul(rest, expr::var(n)))
            } else if rest.as_ref() == &ExprNode::Int(0) {
                // v_{k+1} = coeff * v_k  =>  v(n) = v_0 * coeff^n
                expr::mul(expr::var(v), expr::pow(expr::int(coeff), expr::var(n)))
            } else {
                debug!("recurrence: mixed affine shape a*x+b with a != 1, b != 0 unsupported");
                return None;
            };
            closed.insert(v, solved);
        }

        let touches_modified = rule
            .cost
            .vars()
            .into_iter()
            .any(|v| is_modified(rule, v));
        if touches_modified {
            debug!("recurrence: cost depends on a modified variable, giving up");
            return None;
        }
        let iterated_cost = expr::mul(rule.cost.clone(), expr::var(n));

        Some(Recurrence {
            closed_form: ClosedForm::new(Subst::from_map(closed), 0),
            cost: iterated_cost,
            validity_bound: 0,
        })
    }
}

fn is_modified(rule: &Rule, v: Var) -> bool {
    match rule.update.get(v) {
        Some(e) => e.as_ref() != &ExprNode::Var(v),
        None => false,
    }
}

/// Decomposes `e` as `coeff * v + rest` where `rest` does not mention
/// `v`. Returns `None` if `v` occurs non-linearly (under `Mul` with
/// another non-constant factor, under `Pow`, or more than once inside a
/// single product).
fn linear_coeff(e: &Expr, v: Var) -> Option<(i64, Expr)> {
    match e.as_ref() {
        ExprNode::Int(_) => Some((0, e.clone())),
        ExprNode::Var(w) if *w == v => Some((1, expr::int(0))),
        ExprNode::Var(_) => Some((0, e.clone())),
        ExprNode::Neg(inner) => {
            let (c, r) = linear_coeff(inner, v)?;
            Some((-c, expr::neg(r)))
        }
        ExprNode::Add(terms) => {
            let mut coeff = 0i64;
            let mut rest_terms = Vec::with_capacity(terms.len());
            for t in terms {
                let (c, r) = linear_coeff(t, v)?;
                coeff += c;
                rest_terms.push(r);
            }
            Some((coeff, expr::sum(rest_terms)))
        }
        ExprNode::Mul(factors) => {
            if !e.vars().contains(&v) {
                return Some((0, e.clone()));
            }
            let mut coeff = 1i64;
            let mut v_count = 0;
            for f in factors {
                match f.as_ref() {
                    ExprNode::Int(k) => coeff *= k,
                    ExprNode::Var(w) if *w == v => v_count += 1,
                    _ => return None,
                }
            }
            if v_count == 1 {
                Some((coeff, expr::int(0)))
            } else {
                None
            }
        }
        ExprNode::Pow(..) => {
            if e.vars().contains(&v) {
                None
            } else {
                Some((0, e.clone()))
            }
        }
    }
}
