//! Variables and the variable manager (`spec.md` §3, §6.5).
//!
//! A [`Var`] is an opaque identifier with an associated symbolic name and a
//! [`VarKind`]. Temporaries model fresh symbolic constants introduced during
//! a proof; they are universally quantified in the resulting accelerated
//! rule. The [`VarManager`] is the sole owner of the name table: it is
//! append-only, mirroring `spec.md` §5's invariant that "no variable is ever
//! removed".

use crate::intern::{Interner, Symbol};
use crate::expr::Expr;
use std::collections::HashMap;

/// Whether a variable is a program variable or a fresh proof-local temporary.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum VarKind {
    /// A variable of the original ITS rule (appears in the caller's guard/update).
    Program,
    /// A fresh symbolic constant introduced by the calculus (e.g. the
    /// iteration counter `n`, or an untracked symbol used by the QE path).
    Temporary,
}

/// An opaque variable identifier.
///
/// `Var` is `Copy` and compares by interned symbol, not by name, so renaming
/// never invalidates an already-built [`crate::expr::Expr`] or
/// [`crate::boolexpr::BoolExpr`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct Var(pub(crate) Symbol);

/// Owns the append-only table of variable names and kinds.
///
/// Grounded in `logicaffeine_base::intern::Interner`'s map+vec technique,
/// extended with a per-symbol [`VarKind`] tag (`spec.md` §6.5).
pub struct VarManager {
    interner: Interner,
    kinds: HashMap<Symbol, VarKind>,
    fresh_counter: u32,
}

impl Default for VarManager {
    fn default() -> Self {
        Self::new()
    }
}

impl VarManager {
    /// Creates an empty variable manager.
    pub fn new() -> Self {
        Self {
            interner: Interner::new(),
            kinds: HashMap::new(),
            fresh_counter: 0,
        }
    }

    /// Registers an existing program variable by name (idempotent).
    pub fn declare(&mut self, name: &str) -> Var {
        let sym = self.interner.intern(name);
        self.kinds.entry(sym).or_insert(VarKind::Program);
        Var(sym)
    }

    /// Adds a fresh, uniquely-named program variable (`spec.md` §6.5
    /// `addFreshVariable`).
    pub fn add_fresh(&mut self, base_name: &str) -> Var {
        self.fresh(base_name, VarKind::Program)
    }

    /// Adds a fresh temporary variable owned by the current acceleration
    /// problem (`spec.md` §6.5 `addFreshTemporaryVariable`). Used for the
    /// iteration counter `n` and QE-internal symbols such as `m`.
    pub fn add_fresh_temporary(&mut self, base_name: &str) -> Var {
        self.fresh(base_name, VarKind::Temporary)
    }

    fn fresh(&mut self, base_name: &str, kind: VarKind) -> Var {
        loop {
            let candidate = format!("{base_name}_{}", self.fresh_counter);
            self.fresh_counter += 1;
            if !self.interner.contains(&candidate) {
                let sym = self.interner.intern_owned(candidate);
                self.kinds.insert(sym, kind);
                return Var(sym);
            }
        }
    }

    /// Returns the variable's name.
    pub fn name(&self, v: Var) -> &str {
        self.interner.resolve(v.0)
    }

    /// Returns the variable's symbolic expression form (`spec.md` §6.5
    /// `getVarSymbol`).
    pub fn var_symbol(&self, v: Var) -> Expr {
        crate::expr::var(v)
    }

    /// Returns `true` if `v` is a temporary (`spec.md` §6.5 `isTempVar`).
    pub fn is_temp_var(&self, v: Var) -> bool {
        matches!(self.kinds.get(&v.0), Some(VarKind::Temporary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_variables_are_distinct() {
        let mut vm = VarManager::new();
        let a = vm.add_fresh_temporary("n");
        let b = vm.add_fresh_temporary("n");
        assert_ne!(a, b);
        assert!(vm.is_temp_var(a));
        assert!(vm.is_temp_var(b));
    }

    #[test]
    fn declared_variables_are_program_kind() {
        let mut vm = VarManager::new();
        let x = vm.declare("x");
        assert!(!vm.is_temp_var(x));
        assert_eq!(vm.name(x), "x");
    }

    #[test]
    fn declare_is_idempotent() {
        let mut vm = VarManager::new();
        let x1 = vm.declare("x");
        let x2 = vm.declare("x");
        assert_eq!(x1, x2);
    }
}
