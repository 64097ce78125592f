//! The proof trace (`spec.md` §6.4), rendered as a `Vec<ProofStep>` with a
//! `Display` impl — the Rust shape of the original's `Proof::append`/
//! `Proof::newline()` calls scattered through `nontermproblem.cpp` and
//! `qecalculus.cpp` (`proof.newline(); proof.append(ss);`).

use std::fmt;

use accel_base::{BoolExpr, Relation, VarManager};

/// One record of a proof trace: either a structured certificate step or a
/// narrative line, per `spec.md` §6.4.
#[derive(Clone, Debug)]
pub enum ProofStep {
    /// A proof rule fired for `literal`, producing `formula` under
    /// `dependencies`.
    Certificate {
        rule: &'static str,
        literal: Relation,
        formula: BoolExpr,
        dependencies: Vec<Relation>,
    },
    /// A narrative line, e.g. "proved non-termination via quantifier
    /// elimination" — the original interleaves these between structured
    /// steps throughout `nontermproblem.cpp`.
    FreeForm(String),
}

/// A proof trace: an ordered sequence of [`ProofStep`]s.
#[derive(Clone, Debug, Default)]
pub struct Proof(Vec<ProofStep>);

impl Proof {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, step: ProofStep) {
        self.0.push(step);
    }

    pub fn note(&mut self, line: impl Into<String>) {
        self.0.push(ProofStep::FreeForm(line.into()));
    }

    pub fn steps(&self) -> &[ProofStep] {
        &self.0
    }

    pub fn display<'a>(&'a self, vars: &'a VarManager) -> DisplayProof<'a> {
        DisplayProof { proof: self, vars }
    }
}

pub struct DisplayProof<'a> {
    proof: &'a Proof,
    vars: &'a VarManager,
}

impl fmt::Display for DisplayProof<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.proof.0 {
            match step {
                ProofStep::FreeForm(line) => writeln!(f, "{line}")?,
                ProofStep::Certificate {
                    rule,
                    literal,
                    formula,
                    dependencies,
                } => {
                    write!(
                        f,
                        "[{rule}] {} ~> {}",
                        literal.display(self.vars),
                        accel_base::boolexpr::DisplayBoolExpr {
                            expr: formula,
                            vars: self.vars
                        }
                    )?;
                    if !dependencies.is_empty() {
                        write!(f, " (depends on")?;
                        for dep in dependencies {
                            write!(f, " {}", dep.display(self.vars))?;
                        }
                        write!(f, ")")?;
                    }
                    writeln!(f)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use accel_base::boolexpr::lit;
    use accel_base::expr::{int, var};
    use accel_base::{RelOp, VarManager};

    #[test]
    fn display_renders_one_line_per_step() {
        let mut vm = VarManager::new();
        let x = vm.declare("x");
        let rel = Relation::new(var(x), RelOp::Gt, int(0));
        let mut proof = Proof::new();
        proof.note("starting saturation");
        proof.push(ProofStep::Certificate {
            rule: "R",
            literal: rel.clone(),
            formula: lit(rel),
            dependencies: vec![],
        });
        let rendered = proof.display(&vm).to_string();
        assert_eq!(rendered.lines().count(), 2);
        assert!(rendered.contains("starting saturation"));
        assert!(rendered.contains("[R]"));
    }

    #[test]
    fn empty_proof_renders_nothing() {
        let vm = VarManager::new();
        let proof = Proof::new();
        assert_eq!(proof.display(&vm).to_string(), "");
    }
}
