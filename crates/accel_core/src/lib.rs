#![cfg_attr(docsrs, feature(doc_cfg))]

//! # accel-core
//!
//! The loop acceleration and non-termination calculus (`spec.md` §§4.1-4.8):
//! a certificate engine, a replacement-map builder, a guard rewriter, the
//! two non-termination checks, the quantifier-elimination accelerator, and
//! the top-level dispatcher that ties them together.
//!
//! Depends only on [`accel_base`], [`accel_qelim`] and [`accel_recurrence`]
//! — never directly on a concrete SMT backend, so callers can plug in
//! whichever [`accel_base::smt::SmtOracle`] implementation they like
//! (`accel-smt`'s `Z3Oracle` among them, pulled in here only as a
//! dev-dependency for this crate's own integration tests).
//!
//! ## Modules
//!
//! - [`certificate`] — the four proof rules R/E/F/M (§4.2) and the
//!   append-only `CertificateStore` they populate
//! - [`replacement`] — the replacement-map builder (§4.3)
//! - [`rewrite`] — the guard rewriter (§4.4)
//! - [`nonterm`] — the non-termination calculus (§4.5) and the unrolled
//!   direct check (§4.6)
//! - [`qe_problem`] — the QE accelerator's formula plumbing (§4.1 steps 3-4)
//! - [`problem`] — `AccelerationProblem`, the top-level dispatcher (§4.1)
//! - [`proof`] — the proof trace (§6.4)
//! - [`config`] — `AccelerationConfig`

pub mod certificate;
pub mod config;
pub mod nonterm;
pub mod problem;
pub mod proof;
pub mod qe_problem;
pub mod replacement;
pub mod rewrite;

pub use certificate::{CertificateStore, Entry};
pub use config::AccelerationConfig;
pub use nonterm::NontermResult;
pub use problem::{AccelerationProblem, AccelerationResult, Cost};
pub use proof::{Proof, ProofStep};
pub use replacement::ReplacementMap;
