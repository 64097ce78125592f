//! [`Z3Oracle`]: the concrete [`SmtOracle`] backend.
//!
//! Grounded in `logicaffeine_verify::solver::Verifier`'s `Config`/`Context`/
//! `Solver` setup (including the default timeout set via
//! `cfg.set_param_value("timeout", ...)`), extended with push/pop scoping,
//! tracked assertions and model extraction that `Verifier` doesn't need
//! because it only ever asks one validity question per call before
//! discarding its `Context`.
//!
//! `Z3Oracle` borrows its `Context` rather than owning it, the same way
//! `logicaffeine_verify::solver::VerificationContext` wraps a `&'ctx
//! Context` instead of storing one alongside a `Solver` that borrows it —
//! a `Solver<'ctx>` and its `Context` can't live in the same struct
//! without the struct borrowing from itself. [`Z3Oracle::run`] owns the
//! `Config`/`Context`/`Solver` set-up for one acceleration problem and
//! hands out a scoped `&mut Z3Oracle` instead.

use std::collections::HashMap;

use accel_base::smt::{Model, SatResult, SmtOracle};
use accel_base::{BoolExpr, Var, VarManager};
use log::{debug, trace};
use z3::ast::{Ast, Bool};
use z3::{Config, Context, SatResult as Z3SatResult, Solver};

use crate::encoder::Encoder;

pub struct Z3Oracle<'ctx> {
    ctx: &'ctx Context,
    solver: Solver<'ctx>,
    var_manager: &'ctx VarManager,
    /// Tracked assertions per currently-open scope, popped in lock-step
    /// with the underlying solver so labels from a retracted scope never
    /// leak into a later `unsat_core`.
    tracked: Vec<Vec<(String, Bool<'ctx>)>>,
}

impl<'ctx> Z3Oracle<'ctx> {
    fn new(ctx: &'ctx Context, var_manager: &'ctx VarManager) -> Self {
        Self {
            ctx,
            solver: Solver::new(ctx),
            var_manager,
            tracked: vec![Vec::new()],
        }
    }

    /// Sets up a `Config`/`Context`/`Solver` with `timeout_ms` (the
    /// `logicaffeine_verify::solver::Verifier::new` pattern) and runs `f`
    /// against a fresh oracle backed by them.
    pub fn run<R>(
        var_manager: &VarManager,
        timeout_ms: u32,
        f: impl FnOnce(&mut Z3Oracle) -> R,
    ) -> R {
        let mut cfg = Config::new();
        cfg.set_param_value("timeout", &timeout_ms.to_string());
        let ctx = Context::new(&cfg);
        let mut oracle = Z3Oracle::new(&ctx, var_manager);
        f(&mut oracle)
    }

    fn encoder(&self) -> Encoder<'ctx, 'ctx> {
        Encoder::new(self.ctx, self.var_manager)
    }
}

impl<'ctx> SmtOracle for Z3Oracle<'ctx> {
    fn push(&mut self) {
        trace!("smt: push");
        self.solver.push();
        self.tracked.push(Vec::new());
    }

    fn pop(&mut self) {
        trace!("smt: pop");
        self.solver.pop(1);
        self.tracked.pop();
        if self.tracked.is_empty() {
            self.tracked.push(Vec::new());
        }
    }

    fn assert(&mut self, formula: &BoolExpr) {
        let encoded = match self.encoder().encode_bool(formula) {
            Ok(b) => b,
            Err(e) => {
                debug!("smt: formula failed to encode, asserting false: {e}");
                Bool::from_bool(self.ctx, false)
            }
        };
        self.solver.assert(&encoded);
    }

    fn assert_tracked(&mut self, label: &str, formula: &BoolExpr) {
        let encoded = match self.encoder().encode_bool(formula) {
            Ok(b) => b,
            Err(e) => {
                debug!("smt: formula failed to encode, tracking false: {e}");
                Bool::from_bool(self.ctx, false)
            }
        };
        let tracker = Bool::new_const(self.ctx, label);
        self.solver.assert_and_track(&encoded, &tracker);
        self.tracked
            .last_mut()
            .expect("a scope is always open")
            .push((label.to_string(), tracker));
    }

    fn check(&mut self) -> SatResult {
        let result = match self.solver.check() {
            Z3SatResult::Sat => SatResult::Sat,
            Z3SatResult::Unsat => SatResult::Unsat,
            Z3SatResult::Unknown => SatResult::Unknown,
        };
        trace!("smt: check -> {result:?}");
        result
    }

    fn model(&mut self, vars: &[Var]) -> Option<Model> {
        let model = self.solver.get_model()?;
        let mut out: Model = HashMap::with_capacity(vars.len());
        for &v in vars {
            let const_ast = self.encoder().encode_expr(&accel_base::expr::var(v)).ok()?;
            let value = model.eval(&const_ast, true)?.as_i64()?;
            out.insert(v, value);
        }
        Some(out)
    }

    fn unsat_core(&mut self) -> Vec<String> {
        let open_labels: HashMap<String, ()> = self
            .tracked
            .iter()
            .flatten()
            .map(|(label, _)| (label.clone(), ()))
            .collect();
        self.solver
            .get_unsat_core()
            .iter()
            .map(|ast| ast.to_string())
            .filter(|name| open_labels.contains_key(name))
            .collect()
    }
}
