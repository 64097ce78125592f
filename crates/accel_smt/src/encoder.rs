//! Translates [`accel_base::Expr`]/[`accel_base::BoolExpr`] into Z3 ASTs.
//!
//! Modeled on `logicaffeine_verify::solver::Encoder`, which walks a single
//! dynamically-typed `VerifyExpr` tree and falls back to `false`/identity
//! when a branch doesn't type-check. This domain has only two sorts (every
//! [`accel_base::Expr`] is `Int`, every [`accel_base::BoolExpr`] is `Bool`)
//! so the encoder is typed rather than `Dynamic`-based, and a mismatch is a
//! bug in the calculus rather than a malformed user formula — it is
//! reported as a [`SmtError`] instead of silently coerced.

use std::collections::HashMap;

use accel_base::expr::ExprNode;
use accel_base::relation::RelOp;
use accel_base::{BoolExpr, BoolExprNode, Expr, Relation, Var, VarManager};
use z3::ast::{Ast, Bool, Int};
use z3::Context;

use crate::error::{Result, SmtError};

/// Caches one Z3 integer constant per [`Var`] so repeated occurrences of the
/// same variable encode to the same AST node within a context.
pub struct Encoder<'ctx, 'a> {
    ctx: &'ctx Context,
    var_manager: &'a VarManager,
    consts: HashMap<Var, Int<'ctx>>,
}

impl<'ctx, 'a> Encoder<'ctx, 'a> {
    pub fn new(ctx: &'ctx Context, var_manager: &'a VarManager) -> Self {
        Self {
            ctx,
            var_manager,
            consts: HashMap::new(),
        }
    }

    fn var_const(&mut self, v: Var) -> Int<'ctx> {
        if let Some(existing) = self.consts.get(&v) {
            return existing.clone();
        }
        let name = self.var_manager.name(v);
        let fresh = Int::new_const(self.ctx, name);
        self.consts.insert(v, fresh.clone());
        fresh
    }

    pub fn encode_expr(&mut self, e: &Expr) -> Result<Int<'ctx>> {
        match e.as_ref() {
            ExprNode::Int(n) => Ok(Int::from_i64(self.ctx, *n)),
            ExprNode::Var(v) => Ok(self.var_const(*v)),
            ExprNode::Neg(inner) => Ok(-self.encode_expr(inner)?),
            ExprNode::Add(parts) => {
                let mut acc = Int::from_i64(self.ctx, 0);
                for p in parts {
                    acc = acc + self.encode_expr(p)?;
                }
                Ok(acc)
            }
            ExprNode::Mul(parts) => {
                let mut acc = Int::from_i64(self.ctx, 1);
                for p in parts {
                    acc = acc * self.encode_expr(p)?;
                }
                Ok(acc)
            }
            ExprNode::Pow(base, exp) => match exp.as_ref() {
                ExprNode::Int(n) if *n >= 0 && *n <= 64 => {
                    let base_z3 = self.encode_expr(base)?;
                    let mut acc = Int::from_i64(self.ctx, 1);
                    for _ in 0..*n {
                        acc = acc * base_z3.clone();
                    }
                    Ok(acc)
                }
                _ => Err(SmtError::new(
                    "cannot encode a non-polynomial power into a quantifier-free integer formula",
                )),
            },
        }
    }

    pub fn encode_relation(&mut self, rel: &Relation) -> Result<Bool<'ctx>> {
        let lhs = self.encode_expr(&rel.lhs)?;
        let rhs = self.encode_expr(&rel.rhs)?;
        Ok(match rel.op {
            RelOp::Lt => lhs.lt(&rhs),
            RelOp::Le => lhs.le(&rhs),
            RelOp::Gt => lhs.gt(&rhs),
            RelOp::Ge => lhs.ge(&rhs),
            RelOp::Eq => lhs._eq(&rhs),
            RelOp::Neq => lhs._eq(&rhs).not(),
        })
    }

    pub fn encode_bool(&mut self, formula: &BoolExpr) -> Result<Bool<'ctx>> {
        match formula.as_ref() {
            BoolExprNode::True => Ok(Bool::from_bool(self.ctx, true)),
            BoolExprNode::False => Ok(Bool::from_bool(self.ctx, false)),
            BoolExprNode::Lit(rel) => self.encode_relation(rel),
            BoolExprNode::And(parts) => {
                let mut encoded = Vec::with_capacity(parts.len());
                for p in parts {
                    encoded.push(self.encode_bool(p)?);
                }
                let refs: Vec<&Bool> = encoded.iter().collect();
                Ok(Bool::and(self.ctx, &refs))
            }
            BoolExprNode::Or(parts) => {
                let mut encoded = Vec::with_capacity(parts.len());
                for p in parts {
                    encoded.push(self.encode_bool(p)?);
                }
                let refs: Vec<&Bool> = encoded.iter().collect();
                Ok(Bool::or(self.ctx, &refs))
            }
        }
    }
}
