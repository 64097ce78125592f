//! # accel-qelim
//!
//! The quantifier-elimination external collaborator (`spec.md` §6.3 /
//! §4.7): `qe(prefix, matrix) → option<{qf, exact}>` for a single `∀ x ∈
//! [lo, hi]` prefix. [`BoundedRangeQe`] is the one concrete backend,
//! handling the two shapes `original_source`'s `QeProblem::qe` and
//! `QeProblem::monotonicity` actually cover for this calculus's own
//! quantifiers: a literal range small enough to case-enumerate, or a
//! symbolic bound discharged by the same monotonic-implication check
//! `qecalculus.cpp`'s rule M performs (`R[n+1] → R` valid ⇒ `R` at the
//! upper bound is sound for every smaller value).

use accel_base::boolexpr::and;
use accel_base::expr::ExprNode;
use accel_base::smt::SmtOracle;
use accel_base::{BoolExpr, Expr, Var};
use log::debug;

/// A single `∀ bound_var ∈ [lo, hi]` prefix — the only shape `spec.md`
/// §6.3 requires a backend to support. `hi = None` models an unbounded
/// upper end (`∀ n ≥ lo`, used by the non-termination QE path of
/// `spec.md` §4.1 step 3, which has no upper bound on the iteration
/// counter at all).
pub struct QuantPrefix {
    pub bound_var: Var,
    pub lo: Expr,
    pub hi: Option<Expr>,
}

/// The result of a successful elimination.
pub struct QeOutcome {
    pub qf: BoolExpr,
    pub exact: bool,
}

pub trait QeOracle {
    /// Eliminates `prefix.bound_var` from `matrix`. `None` means
    /// "unsupported prefix or matrix shape" (`spec.md` §6.3); the caller
    /// never retries.
    fn qe(
        &self,
        prefix: &QuantPrefix,
        matrix: &BoolExpr,
        smt: &mut dyn SmtOracle,
    ) -> Option<QeOutcome>;
}

/// Concrete ranges wider than this are not unrolled; the caller should
/// prefer the monotonic-implication path for those, which doesn't depend
/// on range width at all.
const MAX_CONCRETE_RANGE: i64 = 64;

#[derive(Default)]
pub struct BoundedRangeQe;

impl BoundedRangeQe {
    pub fn new() -> Self {
        Self
    }

    fn concrete_range(prefix: &QuantPrefix) -> Option<(i64, i64)> {
        let hi = prefix.hi.as_ref()?;
        if let (ExprNode::Int(lo), ExprNode::Int(hi)) = (prefix.lo.as_ref(), hi.as_ref()) {
            if hi - lo <= MAX_CONCRETE_RANGE {
                return Some((*lo, *hi));
            }
        }
        None
    }

    /// Enumerates `matrix[bound_var ↦ i]` for every `i` in the concrete
    /// range and conjoins the instances — exact by construction, since
    /// `∀ x ∈ [lo,hi]. φ(x)` over integers is literally the finite
    /// conjunction `⋀_{i=lo}^{hi} φ(i)`.
    fn eliminate_concrete(matrix: &BoolExpr, bound_var: Var, lo: i64, hi: i64) -> BoolExpr {
        let mut instances = Vec::with_capacity((hi - lo + 1).max(0) as usize);
        let mut i = lo;
        while i <= hi {
            instances.push(accel_base::boolexpr::subst_var(
                matrix,
                bound_var,
                &accel_base::expr::int(i),
            ));
            i += 1;
        }
        and(instances)
    }

    /// The monotonic-implication path (`qecalculus.cpp`'s rule M,
    /// simplified: the dependency-bearing unsat-core extraction is left
    /// to the caller's own certificate engine when it re-derives the
    /// same literal; this oracle only needs the direct validity check).
    ///
    /// Checks the whole matrix's monotonicity at once rather than
    /// literal-by-literal: a per-literal check would have no way to use
    /// the matrix's *other* conjuncts as hypotheses (e.g. `y >= 0` is
    /// needed to justify that `x + n*y > 0` only grows in `n`), so an
    /// otherwise-provable monotonicity would come back `Unknown`/invalid
    /// for lack of context.
    ///
    /// Tries both directions (`spec.md` §4.2's mention of Rule M's dual,
    /// "an eventual weak decrease rule mirroring Rule E"):
    /// - non-increasing (`matrix[x ↦ x+1] → matrix`): the matrix only
    ///   gets weaker as `x` grows, so truth at `hi` (when known) implies
    ///   truth at every smaller `x`; substitute `x ↦ hi`.
    /// - non-decreasing (`matrix → matrix[x ↦ x+1]`): the matrix only
    ///   gets stronger as `x` grows, so truth at `lo` implies truth at
    ///   every larger `x`; substitute `x ↦ lo`. This is the only
    ///   direction available when `hi` is unbounded (`∀ x ≥ lo`).
    fn eliminate_monotonic(
        matrix: &BoolExpr,
        prefix: &QuantPrefix,
        smt: &mut dyn SmtOracle,
    ) -> Option<BoolExpr> {
        if !matrix.is_conjunction() {
            debug!("qelim: monotonic path only supports conjunctive matrices");
            return None;
        }
        let next = accel_base::boolexpr::subst_var(matrix, prefix.bound_var, &bump(&prefix.bound_var, 1));
        if let Some(hi) = &prefix.hi {
            if smt.is_implication(&next, matrix) {
                return Some(accel_base::boolexpr::subst_var(matrix, prefix.bound_var, hi));
            }
        }
        if smt.is_implication(matrix, &next) {
            return Some(accel_base::boolexpr::subst_var(matrix, prefix.bound_var, &prefix.lo));
        }
        debug!("qelim: matrix is not monotonic in the bound variable");
        None
    }
}

/// `var + delta` as an `Expr`; a tiny helper so `eliminate_monotonic`
/// doesn't need to special-case `delta == 0`.
fn bump(v: &Var, delta: i64) -> Expr {
    accel_base::expr::add(accel_base::expr::var(*v), accel_base::expr::int(delta))
}

impl QeOracle for BoundedRangeQe {
    fn qe(
        &self,
        prefix: &QuantPrefix,
        matrix: &BoolExpr,
        smt: &mut dyn SmtOracle,
    ) -> Option<QeOutcome> {
        if let Some((lo, hi)) = Self::concrete_range(prefix) {
            let qf = Self::eliminate_concrete(matrix, prefix.bound_var, lo, hi);
            return Some(QeOutcome { qf, exact: true });
        }
        let qf = Self::eliminate_monotonic(matrix, prefix, smt)?;
        Some(QeOutcome { qf, exact: true })
    }
}
