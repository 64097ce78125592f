#![cfg_attr(docsrs, feature(doc_cfg))]

//! # accel-base
//!
//! Pure structural atoms for the loop acceleration and non-termination
//! calculus: interned variables, hash-consed arithmetic expressions,
//! relations, boolean formulas, substitutions and the `Rule` data type.
//!
//! This crate has no knowledge of SMT solving, quantifier elimination or
//! recurrence solving — it provides only the data model that `accel-core`,
//! `accel-smt`, `accel-qelim` and `accel-recurrence` build on, mirroring
//! the separation `logicaffeine-base` draws between structural atoms and
//! the crates that reason over them.
//!
//! ## Modules
//!
//! - [`var`] — variables and the append-only variable manager
//! - [`expr`] — arithmetic expressions
//! - [`relation`] — atomic relations (`e > 0`, `e = 0`, ...)
//! - [`boolexpr`] — boolean formulas over relations
//! - [`subst`] — substitutions, updates, closed forms
//! - [`rule`] — the linear `Rule` data type
//! - [`smt`] — the `SmtOracle` capability trait (`accel-smt` implements it)

pub mod boolexpr;
pub mod expr;
pub mod intern;
pub mod relation;
pub mod rule;
pub mod smt;
pub mod subst;
pub mod var;

pub use boolexpr::{BoolExpr, BoolExprNode};
pub use expr::{Expr, ExprNode};
pub use relation::{RelOp, Relation};
pub use rule::{Location, Rule};
pub use smt::{Model, SatResult, Scope, SmtOracle};
pub use subst::{ClosedForm, Subst, Update};
pub use var::{Var, VarKind, VarManager};
