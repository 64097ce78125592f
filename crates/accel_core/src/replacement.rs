//! The replacement-map builder (`spec.md` §4.3): turns a [`CertificateStore`]
//! into a `Map<Relation, BoolExpr>` by well-founded selection, completeness
//! checking and (for disjunctive guards) dependency closure.

use std::collections::{HashMap, HashSet};

use accel_base::boolexpr::{and, fls};
use accel_base::{BoolExpr, Relation};

use crate::certificate::{CertificateStore, Entry};

/// `{R ↦ φ_R}` plus the conjoined `exact` flag of the entries used to
/// build it.
pub struct ReplacementMap {
    pub map: HashMap<Relation, BoolExpr>,
    pub exact: bool,
}

/// Step 1 — depth-first well-founded selection. Tries each of `rel`'s
/// stored entries in insertion order; an entry is accepted only if every
/// one of its dependencies can themselves be (recursively) selected
/// without revisiting a literal already on the current DFS stack
/// (`seen`), which is exactly `spec.md`'s cycle rejection.
fn select(
    store: &CertificateStore,
    rel: &Relation,
    seen: &mut HashSet<Relation>,
    chosen: &mut HashMap<Relation, Entry>,
) -> bool {
    if chosen.contains_key(rel) {
        return true;
    }
    if seen.contains(rel) {
        return false;
    }
    seen.insert(rel.clone());
    for entry in store.entries_for(rel) {
        let all_deps_ok = entry
            .dependencies
            .iter()
            .all(|dep| select(store, dep, seen, chosen));
        if all_deps_ok {
            chosen.insert(rel.clone(), entry.clone());
            seen.remove(rel);
            return true;
        }
    }
    seen.remove(rel);
    false
}

/// Step 3 — closure under dependencies for disjunctive guards: each
/// selected literal's formula is conjoined with its (recursively closed)
/// dependencies' formulas.
fn close(rel: &Relation, chosen: &HashMap<Relation, Entry>, memo: &mut HashMap<Relation, BoolExpr>) -> BoolExpr {
    if let Some(f) = memo.get(rel) {
        return f.clone();
    }
    let Some(entry) = chosen.get(rel) else {
        return fls();
    };
    let mut parts = vec![entry.formula.clone()];
    for dep in &entry.dependencies {
        parts.push(close(dep, chosen, memo));
    }
    let closed = and(parts);
    memo.insert(rel.clone(), closed.clone());
    closed
}

/// Builds a [`ReplacementMap`] for `todo` (typically `guard.lits()`) from
/// `store`. Returns `None` if `is_conjunction` and some literal has no
/// well-founded entry (step 2's "whole acceleration fails").
pub fn build_replacement_map(
    store: &CertificateStore,
    todo: &[Relation],
    is_conjunction: bool,
) -> Option<ReplacementMap> {
    let mut chosen: HashMap<Relation, Entry> = HashMap::new();
    let mut uncovered: Vec<Relation> = Vec::new();
    for rel in todo {
        let mut seen = HashSet::new();
        if !select(store, rel, &mut seen, &mut chosen) {
            uncovered.push(rel.clone());
        }
    }

    if is_conjunction && !uncovered.is_empty() {
        return None;
    }

    let mut exact = true;
    let mut map = HashMap::new();
    let mut memo = HashMap::new();
    for rel in todo {
        match chosen.get(rel) {
            Some(entry) => {
                exact = exact && entry.exact;
                let formula = if is_conjunction {
                    entry.formula.clone()
                } else {
                    close(rel, &chosen, &mut memo)
                };
                map.insert(rel.clone(), formula);
            }
            None => {
                // disjunctive guard, literal uncovered: maps to False.
                map.insert(rel.clone(), fls());
                exact = false;
            }
        }
    }

    Some(ReplacementMap { map, exact })
}

#[cfg(test)]
mod tests {
    use super::*;
    use accel_base::boolexpr::{lit, tru};
    use accel_base::expr::{int, var};
    use accel_base::{RelOp, VarManager};

    fn rel(vm: &mut VarManager, name: &str) -> Relation {
        let v = vm.declare(name);
        Relation::new(var(v), RelOp::Gt, int(0))
    }

    #[test]
    fn conjunctive_guard_fails_whole_when_a_literal_is_uncovered() {
        let mut vm = VarManager::new();
        let r1 = rel(&mut vm, "x");
        let r2 = rel(&mut vm, "y");
        let mut store = CertificateStore::new();
        store.store(
            r1.clone(),
            Entry {
                rule: "R",
                dependencies: vec![],
                formula: lit(r1.clone()),
                exact: true,
            },
        );
        // r2 has no entry at all.
        let result = build_replacement_map(&store, &[r1, r2], true);
        assert!(result.is_none());
    }

    #[test]
    fn disjunctive_guard_maps_uncovered_literal_to_false() {
        let mut vm = VarManager::new();
        let r1 = rel(&mut vm, "x");
        let r2 = rel(&mut vm, "y");
        let mut store = CertificateStore::new();
        store.store(
            r1.clone(),
            Entry {
                rule: "R",
                dependencies: vec![],
                formula: lit(r1.clone()),
                exact: true,
            },
        );
        let result = build_replacement_map(&store, &[r1.clone(), r2.clone()], false).unwrap();
        assert!(!result.exact);
        assert_eq!(result.map.get(&r1), Some(&lit(r1)));
        assert_eq!(result.map.get(&r2), Some(&fls()));
    }

    #[test]
    fn cyclic_dependency_is_rejected() {
        let mut vm = VarManager::new();
        let r1 = rel(&mut vm, "x");
        let r2 = rel(&mut vm, "y");
        let mut store = CertificateStore::new();
        store.store(
            r1.clone(),
            Entry {
                rule: "R",
                dependencies: vec![r2.clone()],
                formula: lit(r1.clone()),
                exact: true,
            },
        );
        store.store(
            r2.clone(),
            Entry {
                rule: "R",
                dependencies: vec![r1.clone()],
                formula: lit(r2.clone()),
                exact: true,
            },
        );
        let result = build_replacement_map(&store, &[r1, r2], true);
        assert!(result.is_none());
    }

    #[test]
    fn disjunctive_closure_conjoins_dependency_formulas() {
        let mut vm = VarManager::new();
        let r1 = rel(&mut vm, "x");
        let r2 = rel(&mut vm, "y");
        let mut store = CertificateStore::new();
        store.store(
            r2.clone(),
            Entry {
                rule: "R",
                dependencies: vec![],
                formula: lit(r2.clone()),
                exact: true,
            },
        );
        store.store(
            r1.clone(),
            Entry {
                rule: "E",
                dependencies: vec![r2.clone()],
                formula: tru(),
                exact: false,
            },
        );
        let result = build_replacement_map(&store, &[r1.clone(), r2.clone()], false).unwrap();
        // r1's formula is closed with r2's: true /\ (y > 0) == y > 0.
        assert_eq!(result.map.get(&r1), Some(&lit(r2)));
    }
}
