//! # accel-smt
//!
//! The Z3-backed [`oracle::SmtOracle`] implementation the certificate
//! engine checks its candidate certificates against. Split from
//! `accel-core` the same way `logicaffeine_verify` is split from the rest
//! of `logicaffeine`: the calculus names only the trait, never `z3`
//! directly, so a different backend (or a test double) can stand in for
//! it.
//!
//! ## Modules
//!
//! - [`encoder`] — `accel_base::Expr`/`BoolExpr` → Z3 AST translation
//! - [`z3_oracle`] — [`z3_oracle::Z3Oracle`], the concrete
//!   `accel_base::smt::SmtOracle` backend
//! - [`error`] — encoding errors

pub mod encoder;
pub mod error;
pub mod z3_oracle;

pub use accel_base::smt::{Model, SatResult, Scope, SmtOracle};
pub use encoder::Encoder;
pub use error::{Result, SmtError};
pub use z3_oracle::Z3Oracle;
