//! `AccelerationConfig` — the ambient configuration struct `spec.md`
//! leaves implicit. A plain struct rather than a file-based config system:
//! this crate is a library with no CLI in scope (a confirmed Non-goal).

/// Tunables for one [`crate::problem::AccelerationProblem::compute`] call.
#[derive(Clone, Debug)]
pub struct AccelerationConfig {
    /// Timeout passed to the SMT oracle for each `check`/`is_implication`
    /// call. `spec.md` §6.2: "No timing contract is fixed by the core;
    /// implementations commonly use 1s per call."
    pub smt_timeout_ms: u32,
    /// Timeout passed to the QE oracle.
    pub qe_timeout_ms: u32,
    /// Whether `compute` attempts the non-termination-via-QE path (§4.1
    /// step 3) before falling back to the certificate-engine based
    /// non-termination calculus (§4.5).
    pub try_qe_nontermination: bool,
    /// Whether the caller is in complexity-analysis mode, which gates
    /// §4.5's non-termination result on `cost > 0` being SMT-implied by
    /// the guard.
    pub complexity_mode: bool,
}

impl Default for AccelerationConfig {
    fn default() -> Self {
        Self {
            smt_timeout_ms: 1_000,
            qe_timeout_ms: 1_000,
            try_qe_nontermination: true,
            complexity_mode: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_uses_a_one_second_oracle_budget() {
        let cfg = AccelerationConfig::default();
        assert_eq!(cfg.smt_timeout_ms, 1_000);
        assert_eq!(cfg.qe_timeout_ms, 1_000);
    }
}
