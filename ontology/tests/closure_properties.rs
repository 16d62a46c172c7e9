//! Property-based tests for the subclass closure and parser line tracking.
//!
//! Uses proptest over random class hierarchies (cycles included) and random
//! document layouts.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use antigone_ontology::{parse_document, OntologyClass, OntologyModel, PrefixTable};
use proptest::prelude::*;

fn class_name(i: usize) -> String {
    format!("http://example.org/antigone#C{i}")
}

/// Random hierarchy over `n` classes as a list of (child, parent) edges.
fn hierarchy() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
    (1usize..12).prop_flat_map(|n| (Just(n), prop::collection::vec((0..n, 0..n), 0..30)))
}

fn build(n: usize, edges: &[(usize, usize)]) -> OntologyModel {
    let mut classes: BTreeMap<String, OntologyClass> = (0..n)
        .map(|i| {
            (
                class_name(i),
                OntologyClass {
                    iri: class_name(i),
                    superclasses: BTreeSet::new(),
                },
            )
        })
        .collect();
    for (child, parent) in edges {
        if let Some(class) = classes.get_mut(&class_name(*child)) {
            class.superclasses.insert(class_name(*parent));
        }
    }
    OntologyModel::new(classes, BTreeMap::new(), BTreeSet::new(), PrefixTable::new())
}

/// Reference answer: breadth-first reachability.
fn reachable(start: usize, edges: &[(usize, usize)]) -> BTreeSet<String> {
    let mut seen = BTreeSet::from([start]);
    let mut queue = VecDeque::from([start]);
    while let Some(c) = queue.pop_front() {
        for (child, parent) in edges {
            if *child == c && seen.insert(*parent) {
                queue.push_back(*parent);
            }
        }
    }
    seen.into_iter().map(class_name).collect()
}

// =============================================================================
// Closure Properties
// =============================================================================

proptest! {
    /// The closure equals graph reachability, cycles included.
    #[test]
    fn prop_closure_matches_reachability((n, edges) in hierarchy()) {
        let model = build(n, &edges);
        for i in 0..n {
            let name = class_name(i);
            let closure: BTreeSet<String> = model
                .subclass_closure(&name)
                .into_iter()
                .map(str::to_owned)
                .collect();
            prop_assert_eq!(closure, reachable(i, &edges));
        }
    }

    /// Every class is in its own closure, and closures are transitively closed.
    #[test]
    fn prop_closure_is_reflexive_and_transitive((n, edges) in hierarchy()) {
        let model = build(n, &edges);
        for i in 0..n {
            let name = class_name(i);
            let closure = model.subclass_closure(&name);
            prop_assert!(closure.contains(name.as_str()));
            for member in &closure {
                prop_assert!(model.subclass_closure(member).is_subset(&closure));
            }
        }
    }

    /// Declaration order never changes the result.
    #[test]
    fn prop_closure_ignores_edge_order((n, edges) in hierarchy()) {
        let forward = build(n, &edges);
        let reversed: Vec<(usize, usize)> = edges.iter().rev().copied().collect();
        let backward = build(n, &reversed);
        for i in 0..n {
            let name = class_name(i);
            prop_assert_eq!(forward.subclass_closure(&name), backward.subclass_closure(&name));
        }
    }
}

// =============================================================================
// Line Tracking
// =============================================================================

proptest! {
    /// Statements report the line they were written on, whatever blank lines,
    /// comments or multi-line literals precede them.
    #[test]
    fn prop_statement_lines_survive_layout(gaps in prop::collection::vec((0usize..3, any::<bool>()), 1..20)) {
        let mut text = String::from("@prefix : <http://example.org/antigone#> .\n");
        let mut line = 2;
        let mut expected = Vec::new();
        for (i, (blank, long_literal)) in gaps.iter().enumerate() {
            for _ in 0..*blank {
                text.push_str("# comment\n");
                line += 1;
            }
            if *long_literal {
                text.push_str(&format!(":S{i} :description \"\"\"first\nsecond\"\"\" .\n"));
                expected.push(line);
                line += 2;
            } else {
                text.push_str(&format!(":S{i} a :Character .\n"));
                expected.push(line);
                line += 1;
            }
        }
        let doc = parse_document(&text);
        prop_assert!(doc.is_ok());
        let lines: Vec<usize> = doc
            .map(|d| d.statements.iter().map(|s| s.line).collect())
            .unwrap_or_default();
        prop_assert_eq!(lines, expected);
    }
}
