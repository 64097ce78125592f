//! The `Rule` data type (`spec.md` §3).
//!
//! The full ITS data type (the rule graph, multi-location rules, input
//! parsers) is an external collaborator per `spec.md` §1's Out-of-scope
//! list. What the calculus itself needs is the shape of a single linear
//! rule — in scope because every operation in this crate takes one as
//! input.

use crate::boolexpr::BoolExpr;
use crate::expr::Expr;
use crate::subst::Update;

/// An opaque location identifier in the caller's rule graph.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Location(pub String);

/// A linear rule: `spec.md` §3's 5-tuple `(source, guard, update, cost,
/// target)`. The acceleration and non-termination calculus only accepts
/// self-loops, i.e. `source == target`; see [`Rule::is_self_loop`].
#[derive(Clone, Debug)]
pub struct Rule {
    pub source: Location,
    pub guard: BoolExpr,
    pub update: Update,
    pub cost: Expr,
    pub target: Location,
}

impl Rule {
    pub fn new(source: Location, guard: BoolExpr, update: Update, cost: Expr, target: Location) -> Self {
        Self {
            source,
            guard,
            update,
            cost,
            target,
        }
    }

    /// `true` iff `source == target`, the only shape the core accelerates
    /// (`spec.md` glossary: "Self-loop / simple loop").
    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}
